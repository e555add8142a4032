//! Error types for the OIDC provider adapter

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Missing required OIDC settings: {}", .fields.join(", "))]
    MissingConfig { fields: Vec<&'static str> },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("OIDC discovery failed: {0}")]
    Discovery(String),

    #[error("Invalid redirect URI: {0}")]
    InvalidRedirectUri(String),

    #[error("Code exchange failed: {0}")]
    Exchange(String),

    #[error("Token response is missing id_token")]
    MissingIdToken,

    #[error("ID token verification failed: {0}")]
    Verification(String),

    #[error("Invalid ID token claims: {0}")]
    Claims(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl ProviderError {
    /// Whether the error should surface to the end user as a denied login.
    ///
    /// Covers every per-request failure of the login itself. Setup failures
    /// are excluded: they keep the provider from being constructed at all.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ProviderError::Exchange(_)
                | ProviderError::MissingIdToken
                | ProviderError::Verification(_)
                | ProviderError::Claims(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
