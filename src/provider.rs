//! Provider interface shared by the gateway's login backends

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Authenticated user as seen by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable identifier, the user's email address
    pub user: String,
    /// Flat group names; membership is what matters, not order
    pub groups: BTreeSet<String>,
}

/// A login backend the gateway can delegate authentication to.
///
/// Implementations are constructed ready to serve and must tolerate
/// concurrent calls from many request handlers.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Identifier used by the gateway to route to this provider
    fn name(&self) -> &'static str;

    /// Build the URL the user is redirected to for login.
    ///
    /// `state` is opaque here; the caller generates and checks it.
    fn login_url(&self, redirect_uri: &str, state: &str) -> Result<Url>;

    /// Exchange an authorization code for the provider's token.
    async fn exchange_code(
        &self,
        ctx: &CancellationToken,
        redirect_uri: &str,
        code: &str,
    ) -> Result<String>;

    /// Resolve the user behind a token returned by [`Provider::exchange_code`].
    ///
    /// The last argument is reserved for providers that need a second
    /// credential.
    async fn get_user(&self, ctx: &CancellationToken, token: &str, _reserved: &str) -> Result<User>;
}
