use crate::domain::models::AuthSession;
use crate::infrastructure::error::StoreError;
use std::sync::Mutex;

pub trait SessionStore: Send + Sync {
    fn save_session(&self, session: &AuthSession) -> Result<(), StoreError>;
    fn load_session(&self) -> Result<Option<AuthSession>, StoreError>;
    fn clear_session(&self) -> Result<(), StoreError>;
}

/// Persists the Supabase session in the operating system credential vault.
#[derive(Debug, Clone)]
pub struct KeyringSessionStore {
    service_name: String,
    account_name: String,
}

impl KeyringSessionStore {
    pub fn new(service_name: impl Into<String>, account_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            account_name: account_name.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, StoreError> {
        keyring::Entry::new(&self.service_name, &self.account_name)
            .map_err(|error| StoreError::Credential(error.to_string()))
    }
}

impl Default for KeyringSessionStore {
    fn default() -> Self {
        Self::new("ezgrades.supabase.session", "default")
    }
}

impl SessionStore for KeyringSessionStore {
    fn save_session(&self, session: &AuthSession) -> Result<(), StoreError> {
        let payload = serde_json::to_string(session)
            .map_err(|error| StoreError::Credential(error.to_string()))?;
        self.entry()?
            .set_password(&payload)
            .map_err(|error| StoreError::Credential(error.to_string()))
    }

    fn load_session(&self) -> Result<Option<AuthSession>, StoreError> {
        let payload = match self.entry()?.get_password() {
            Ok(value) => value,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(error) => return Err(StoreError::Credential(error.to_string())),
        };

        let session = serde_json::from_str::<AuthSession>(&payload)
            .map_err(|error| StoreError::Credential(error.to_string()))?;
        Ok(Some(session))
    }

    fn clear_session(&self) -> Result<(), StoreError> {
        match self.entry()?.delete_credential() {
            Ok(_) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(StoreError::Credential(error.to_string())),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    session: Mutex<Option<AuthSession>>,
}

impl SessionStore for InMemorySessionStore {
    fn save_session(&self, session: &AuthSession) -> Result<(), StoreError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|error| StoreError::Credential(format!("in-memory lock poisoned: {error}")))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn load_session(&self) -> Result<Option<AuthSession>, StoreError> {
        let guard = self
            .session
            .lock()
            .map_err(|error| StoreError::Credential(format!("in-memory lock poisoned: {error}")))?;
        Ok(guard.clone())
    }

    fn clear_session(&self) -> Result<(), StoreError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|error| StoreError::Credential(format!("in-memory lock poisoned: {error}")))?;
        *guard = None;
        Ok(())
    }
}
