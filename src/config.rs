//! Configuration parsing and validation

use crate::error::{ProviderError, Result};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scopes requested on every authorization request.
pub const DEFAULT_SCOPES: [&str; 3] = ["openid", "profile", "email"];

/// Issuer and client credentials for the OIDC provider.
///
/// The client secret is never serialized and is redacted from `Debug`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub issuer_url: String,
    pub client_id: String,
    #[serde(skip_serializing, default)]
    pub client_secret: String,
}

impl ProviderConfig {
    pub fn new(
        issuer_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            issuer_url: issuer_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Validate the configuration
    ///
    /// All missing settings are reported together, in declaration order.
    pub fn validate(&self) -> Result<()> {
        let fields: Vec<&'static str> = [
            ("issuer-url", &self.issuer_url),
            ("client-id", &self.client_id),
            ("client-secret", &self.client_secret),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !fields.is_empty() {
            return Err(ProviderError::MissingConfig { fields });
        }

        url::Url::parse(&self.issuer_url)
            .map_err(|e| ProviderError::Config(format!("Invalid OIDC issuer URL: {}", e)))?;

        Ok(())
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("issuer_url", &self.issuer_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .finish()
    }
}

/// OIDC settings sourced from flags or the environment
#[derive(Args, Debug, Clone, Default)]
pub struct OidcArgs {
    /// OIDC issuer URL (e.g., https://auth.example.com/realms/main)
    #[arg(long, env = "OIDC_ISSUER_URL")]
    pub oidc_issuer_url: Option<String>,

    /// OAuth client ID
    #[arg(long, env = "OIDC_CLIENT_ID")]
    pub oidc_client_id: Option<String>,

    /// OAuth client secret
    #[arg(long, env = "OIDC_CLIENT_SECRET", hide_env_values = true)]
    pub oidc_client_secret: Option<String>,
}

impl From<OidcArgs> for ProviderConfig {
    fn from(args: OidcArgs) -> Self {
        ProviderConfig {
            issuer_url: args.oidc_issuer_url.unwrap_or_default(),
            client_id: args.oidc_client_id.unwrap_or_default(),
            client_secret: args.oidc_client_secret.unwrap_or_default(),
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "oidc-provider",
    version,
    about = "OpenID Connect login provider",
    long_about = "Drives the OIDC login flow of an authentication gateway: builds login URLs, exchanges authorization codes and verifies ID tokens into users"
)]
pub struct Config {
    #[command(flatten)]
    pub oidc: OidcArgs,

    /// Show only error messages
    #[arg(long, global = true, conflicts_with = "debug")]
    pub silent: bool,

    /// Enable debug logging
    #[arg(long, global = true, env = "OIDC_PROVIDER_DEBUG")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the authorization URL to redirect a user to
    LoginUrl {
        #[arg(long)]
        redirect_uri: String,
        /// Opaque CSRF state echoed back by the provider
        #[arg(long)]
        state: String,
    },
    /// Exchange an authorization code and print the raw ID token
    Exchange {
        #[arg(long)]
        redirect_uri: String,
        #[arg(long)]
        code: String,
    },
    /// Verify an ID token and print the user as JSON
    User {
        #[arg(long)]
        token: String,
    },
    /// Exchange an authorization code and print the resulting user as JSON
    Login {
        #[arg(long)]
        redirect_uri: String,
        #[arg(long)]
        code: String,
    },
}

impl Config {
    /// Parse configuration from CLI arguments and environment variables
    pub fn parse_args() -> Self {
        Config::parse()
    }

    pub fn provider_config(&self) -> ProviderConfig {
        self.oidc.clone().into()
    }

    /// Get log level based on flags
    pub fn log_level(&self) -> tracing::Level {
        if self.silent {
            tracing::Level::ERROR
        } else if self.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
