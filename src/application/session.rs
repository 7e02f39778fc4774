use crate::domain::identity::Identity;
use crate::domain::models::AuthSession;
use crate::infrastructure::auth_client::{
    AuthHttpClient, RefreshRequest, SessionPayload, SignInRequest,
};
use crate::infrastructure::error::StoreError;
use crate::infrastructure::session_store::SessionStore;
use crate::infrastructure::supabase_client::SupabaseConfig;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

const EXPIRY_LEEWAY_SECONDS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureSessionResult {
    Active(AuthSession),
    Refreshed(AuthSession),
    SignInRequired,
}

type NowProvider = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct SessionManager<S, C>
where
    S: SessionStore,
    C: AuthHttpClient,
{
    config: SupabaseConfig,
    session_store: Arc<S>,
    auth_client: Arc<C>,
    now_provider: NowProvider,
}

impl<S, C> SessionManager<S, C>
where
    S: SessionStore,
    C: AuthHttpClient,
{
    pub fn new(config: SupabaseConfig, session_store: Arc<S>, auth_client: Arc<C>) -> Self {
        Self {
            config,
            session_store,
            auth_client,
            now_provider: Arc::new(Utc::now),
        }
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.now_provider = now_provider;
        self
    }

    pub fn is_session_valid(&self, session: &AuthSession) -> bool {
        session.is_valid_at((self.now_provider)(), EXPIRY_LEEWAY_SECONDS)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, StoreError> {
        if email.trim().is_empty() {
            return Err(StoreError::InvalidInput("email must not be empty".to_string()));
        }
        if password.is_empty() {
            return Err(StoreError::InvalidInput(
                "password must not be empty".to_string(),
            ));
        }

        let payload = self
            .auth_client
            .sign_in_with_password(SignInRequest {
                base_url: self.config.base_url.clone(),
                anon_key: self.config.anon_key.clone(),
                email: email.trim().to_string(),
                password: password.to_string(),
            })
            .await?;

        let session = self.session_from_payload(payload, None);
        self.session_store.save_session(&session)?;
        Ok(session)
    }

    /// Loads the stored session and refreshes it when expired. A missing
    /// session, or a refresh rejected by the auth backend, resolves to
    /// `SignInRequired` rather than an error.
    pub async fn ensure_session(&self) -> Result<EnsureSessionResult, StoreError> {
        let Some(stored) = self.session_store.load_session()? else {
            return Ok(EnsureSessionResult::SignInRequired);
        };

        if self.is_session_valid(&stored) {
            return Ok(EnsureSessionResult::Active(stored));
        }

        if let Some(refresh_token) = stored.refresh_token.clone() {
            let refreshed = self
                .auth_client
                .refresh_session(RefreshRequest {
                    base_url: self.config.base_url.clone(),
                    anon_key: self.config.anon_key.clone(),
                    refresh_token,
                })
                .await;

            match refreshed {
                Ok(payload) => {
                    let session = self.session_from_payload(payload, stored.refresh_token.clone());
                    self.session_store.save_session(&session)?;
                    Ok(EnsureSessionResult::Refreshed(session))
                }
                Err(StoreError::Auth(_)) => Ok(EnsureSessionResult::SignInRequired),
                Err(error) => Err(error),
            }
        } else {
            Ok(EnsureSessionResult::SignInRequired)
        }
    }

    pub fn sign_out(&self) -> Result<(), StoreError> {
        self.session_store.clear_session()
    }

    /// Resolves who the app is acting as. Any failure to produce a usable
    /// session lands on the guest identity.
    pub async fn resolve_identity(&self) -> Identity {
        match self.ensure_session().await {
            Ok(EnsureSessionResult::Active(session))
            | Ok(EnsureSessionResult::Refreshed(session)) => {
                Identity::from_account(Some(session.account_id))
            }
            Ok(EnsureSessionResult::SignInRequired) | Err(_) => Identity::Guest,
        }
    }

    pub async fn current_access_token(&self) -> Option<String> {
        match self.ensure_session().await {
            Ok(EnsureSessionResult::Active(session))
            | Ok(EnsureSessionResult::Refreshed(session)) => Some(session.access_token),
            _ => None,
        }
    }

    fn session_from_payload(
        &self,
        payload: SessionPayload,
        fallback_refresh_token: Option<String>,
    ) -> AuthSession {
        let expires_at = (self.now_provider)() + Duration::seconds(payload.expires_in.max(0));
        AuthSession {
            access_token: payload.access_token,
            refresh_token: Some(payload.refresh_token).filter(|token| !token.is_empty()).or(fallback_refresh_token),
            expires_at,
            account_id: payload.account_id,
        }
    }
}
