//! OIDC Provider Library
//!
//! Login provider that delegates an authentication gateway's user login to
//! an OpenID Connect issuer and maps ID token claims to gateway users.

pub mod config;
pub mod error;
pub mod oidc;
pub mod provider;

pub use error::{ProviderError, Result};
pub use oidc::OidcProvider;
pub use provider::{Provider, User};
