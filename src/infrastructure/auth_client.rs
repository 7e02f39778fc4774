use crate::infrastructure::error::StoreError;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

#[derive(Debug, Clone)]
pub struct SignInRequest {
    pub base_url: String,
    pub anon_key: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct RefreshRequest {
    pub base_url: String,
    pub anon_key: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone)]
pub struct SessionPayload {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub account_id: String,
}

#[async_trait]
pub trait AuthHttpClient: Send + Sync {
    async fn sign_in_with_password(
        &self,
        request: SignInRequest,
    ) -> Result<SessionPayload, StoreError>;

    async fn refresh_session(&self, request: RefreshRequest) -> Result<SessionPayload, StoreError>;
}

/// Talks to the Supabase GoTrue token endpoint.
#[derive(Debug, Clone, Default)]
pub struct ReqwestAuthClient {
    client: Client,
}

#[derive(Debug, serde::Deserialize)]
struct TokenResponsePayload {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    user: Option<TokenUserPayload>,
    error: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct TokenUserPayload {
    id: String,
}

fn token_endpoint(base_url: &str, grant_type: &str) -> Result<Url, StoreError> {
    let mut url = Url::parse(base_url)
        .map_err(|error| StoreError::Auth(format!("invalid auth base URL: {error}")))?;
    url.path_segments_mut()
        .map_err(|_| StoreError::Auth("auth base URL cannot carry path segments".to_string()))?
        .pop_if_empty()
        .push("auth")
        .push("v1")
        .push("token");
    url.query_pairs_mut().append_pair("grant_type", grant_type);
    Ok(url)
}

impl ReqwestAuthClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    async fn post_token_request(
        &self,
        endpoint: Url,
        anon_key: &str,
        body: serde_json::Value,
    ) -> Result<SessionPayload, StoreError> {
        let response = self
            .client
            .post(endpoint)
            .header("apikey", anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|error| StoreError::Auth(format!("request failed: {error}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| StoreError::Auth(format!("failed reading token response: {error}")))?;

        let parsed = serde_json::from_str::<TokenResponsePayload>(&body).map_err(|error| {
            StoreError::Auth(format!("invalid token response payload: {error}; body={body}"))
        })?;

        if !status.is_success() || parsed.error.is_some() {
            let code = parsed
                .error
                .unwrap_or_else(|| format!("http_{}", status.as_u16()));
            let detail = parsed
                .error_description
                .or(parsed.msg)
                .unwrap_or_else(|| body.clone());
            return Err(StoreError::Auth(format!(
                "token endpoint error: {code}; {detail}"
            )));
        }

        let access_token = parsed
            .access_token
            .ok_or_else(|| StoreError::Auth("token response missing access_token".to_string()))?;
        let refresh_token = parsed
            .refresh_token
            .ok_or_else(|| StoreError::Auth("token response missing refresh_token".to_string()))?;
        let account_id = parsed
            .user
            .map(|user| user.id)
            .ok_or_else(|| StoreError::Auth("token response missing user".to_string()))?;

        Ok(SessionPayload {
            access_token,
            refresh_token,
            expires_in: parsed.expires_in.unwrap_or(0).max(0),
            account_id,
        })
    }
}

#[async_trait]
impl AuthHttpClient for ReqwestAuthClient {
    async fn sign_in_with_password(
        &self,
        request: SignInRequest,
    ) -> Result<SessionPayload, StoreError> {
        let endpoint = token_endpoint(&request.base_url, "password")?;
        self.post_token_request(
            endpoint,
            &request.anon_key,
            serde_json::json!({
                "email": request.email,
                "password": request.password,
            }),
        )
        .await
    }

    async fn refresh_session(&self, request: RefreshRequest) -> Result<SessionPayload, StoreError> {
        let endpoint = token_endpoint(&request.base_url, "refresh_token")?;
        self.post_token_request(
            endpoint,
            &request.anon_key,
            serde_json::json!({
                "refresh_token": request.refresh_token,
            }),
        )
        .await
    }
}
