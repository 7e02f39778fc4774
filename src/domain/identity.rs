pub const GUEST_PARTITION: &str = "guest";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Authenticated(String),
    Guest,
}

impl Identity {
    pub fn from_account(account_id: Option<String>) -> Self {
        match account_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            Some(account_id) => Self::Authenticated(account_id.to_string()),
            None => Self::Guest,
        }
    }

    pub fn partition_key(&self) -> &str {
        match self {
            Self::Authenticated(account_id) => account_id,
            Self::Guest => GUEST_PARTITION,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}
