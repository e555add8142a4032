//! OIDC provider implementation
//!
//! Delegates login to an OpenID Connect issuer: authorization URL, code
//! exchange, ID token verification and claim mapping.

use super::{DiscoveredIssuer, GroupIdToken, IdentityClaims, TokenResponse};
use crate::config::{ProviderConfig, DEFAULT_SCOPES};
use crate::error::{ProviderError, Result};
use crate::provider::{Provider, User};
use async_trait::async_trait;
use oauth2::basic::{BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse};
use oauth2::{
    AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    RedirectUrl, Scope, StandardRevocableToken,
};
use openidconnect::core::CoreIdTokenVerifier;
use openidconnect::Nonce;
use std::borrow::Cow;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

type OAuthClient = oauth2::Client<
    BasicErrorResponse,
    TokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// OIDC login provider, ready to serve once [`OidcProvider::setup`] returns
pub struct OidcProvider {
    config: ProviderConfig,
    issuer: DiscoveredIssuer,
    oauth_client: OAuthClient,
    verifier: CoreIdTokenVerifier<'static>,
    http_client: reqwest::Client,
}

impl OidcProvider {
    /// Validate the configuration and discover the issuer
    pub async fn setup(config: ProviderConfig) -> Result<Self> {
        config.validate()?;

        // Discovery and token requests must not follow redirects
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ProviderError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let issuer = DiscoveredIssuer::discover(&config.issuer_url, &http_client).await?;
        info!(
            issuer = %issuer.issuer.as_str(),
            keys = issuer.jwks.keys().len(),
            "OIDC issuer discovered"
        );

        let client_id = ClientId::new(config.client_id.clone());
        let client_secret = ClientSecret::new(config.client_secret.clone());

        let oauth_client: OAuthClient = oauth2::Client::new(client_id.clone())
            .set_client_secret(client_secret.clone())
            .set_auth_uri(issuer.authorization_endpoint.clone())
            .set_token_uri(issuer.token_endpoint.clone());

        let verifier = CoreIdTokenVerifier::new_confidential_client(
            client_id,
            client_secret,
            issuer.issuer.clone(),
            issuer.jwks.clone(),
        )
        .set_allowed_algs(issuer.signing_algs.clone());

        Ok(OidcProvider {
            config,
            issuer,
            oauth_client,
            verifier,
            http_client,
        })
    }

    /// Settings the provider was set up with
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn issuer(&self) -> &DiscoveredIssuer {
        &self.issuer
    }

    /// Check the token's signature, issuer, audience and expiry, then map
    /// its claims.
    ///
    /// Standard claims are typed by the parser, so a token whose `email` is
    /// not a string cannot be parsed and is rejected before its signature is
    /// known to be good.
    fn verify(&self, raw: &str) -> Result<IdentityClaims> {
        let id_token = GroupIdToken::from_str(raw)
            .map_err(|e| ProviderError::Verification(format!("Malformed ID token: {}", e)))?;

        // No nonce is issued with the login URL, so none is expected back
        let claims = id_token
            .claims(&self.verifier, |_: Option<&Nonce>| -> std::result::Result<(), String> {
                Ok(())
            })
            .map_err(|e| ProviderError::Verification(e.to_string()))?;

        IdentityClaims::from_verified(claims)
    }
}

fn redirect_url(redirect_uri: &str) -> Result<RedirectUrl> {
    RedirectUrl::new(redirect_uri.to_string())
        .map_err(|e| ProviderError::InvalidRedirectUri(format!("{}: {}", redirect_uri, e)))
}

#[async_trait]
impl Provider for OidcProvider {
    fn name(&self) -> &'static str {
        "oidc"
    }

    fn login_url(&self, redirect_uri: &str, state: &str) -> Result<Url> {
        let redirect = redirect_url(redirect_uri)?;

        let (url, _) = self
            .oauth_client
            .authorize_url(|| CsrfToken::new(state.to_string()))
            .add_scopes(DEFAULT_SCOPES.iter().map(|scope| Scope::new(scope.to_string())))
            .set_redirect_uri(Cow::Owned(redirect))
            .url();

        Ok(url)
    }

    async fn exchange_code(
        &self,
        ctx: &CancellationToken,
        redirect_uri: &str,
        code: &str,
    ) -> Result<String> {
        let redirect = redirect_url(redirect_uri)?;

        let request = self
            .oauth_client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_redirect_uri(Cow::Owned(redirect))
            .request_async(&self.http_client);

        let response = tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err(ProviderError::Cancelled),
            response = request => response
                .map_err(|e| ProviderError::Exchange(format!("Token request failed: {}", e)))?,
        };

        let id_token = response.extra_fields().id_token()?;
        debug!("Authorization code exchanged for ID token");

        Ok(id_token.to_string())
    }

    async fn get_user(&self, ctx: &CancellationToken, token: &str, _reserved: &str) -> Result<User> {
        if ctx.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        let claims = self.verify(token)?;
        let groups = claims.groups();
        debug!(
            email = %claims.email,
            raw_groups = claims.raw_groups().len(),
            groups = groups.len(),
            "ID token verified"
        );

        Ok(User {
            user: claims.email,
            groups,
        })
    }
}
