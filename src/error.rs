/// Unified error type for the account connection store.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    // ── Connection Errors ───────────────────────────────────────────────
    #[error("No account is connected to provider account id '{0}'")]
    NoSuchAccountConnection(String),

    #[error("Account {account_id} is already connected to {provider}")]
    DuplicateConnection { account_id: i64, provider: String },

    #[error("Account {account_id} is not connected to {provider}")]
    NotConnected { account_id: i64, provider: String },

    // ── Provider Errors ─────────────────────────────────────────────────
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Provider API error: {0}")]
    Provider(String),

    // ── Crypto Errors ───────────────────────────────────────────────────
    #[error("Crypto error: {0}")]
    Crypto(String),

    // ── Internal ────────────────────────────────────────────────────────
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

pub type ConnectResult<T> = Result<T, ConnectError>;

impl From<sqlx::Error> for ConnectError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!("Database error: {e}");
        ConnectError::Database(e)
    }
}

impl From<reqwest::Error> for ConnectError {
    fn from(e: reqwest::Error) -> Self {
        ConnectError::Provider(e.to_string())
    }
}
