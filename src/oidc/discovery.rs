//! OIDC provider discovery
//!
//! Resolves the issuer's /.well-known/openid-configuration and its JWKS once,
//! at setup. Keys are not refreshed afterwards.

use crate::error::{ProviderError, Result};
use openidconnect::core::{CoreJsonWebKeySet, CoreJwsSigningAlgorithm, CoreProviderMetadata};
use openidconnect::{AuthUrl, IssuerUrl, TokenUrl};

/// Endpoints and signing keys of a discovered issuer
#[derive(Debug, Clone)]
pub struct DiscoveredIssuer {
    pub issuer: IssuerUrl,
    pub authorization_endpoint: AuthUrl,
    pub token_endpoint: TokenUrl,
    pub jwks: CoreJsonWebKeySet,
    pub signing_algs: Vec<CoreJwsSigningAlgorithm>,
}

impl DiscoveredIssuer {
    /// Discover issuer metadata from the issuer URL
    pub async fn discover(issuer_url: &str, http_client: &reqwest::Client) -> Result<Self> {
        let issuer_url = IssuerUrl::new(issuer_url.to_string())
            .map_err(|e| ProviderError::Config(format!("Invalid OIDC issuer URL: {}", e)))?;

        let metadata = CoreProviderMetadata::discover_async(issuer_url, http_client)
            .await
            .map_err(|e| {
                ProviderError::Discovery(format!("Failed to fetch OIDC configuration: {}", e))
            })?;

        Self::from_metadata(&metadata)
    }

    fn from_metadata(metadata: &CoreProviderMetadata) -> Result<Self> {
        let token_endpoint = metadata.token_endpoint().cloned().ok_or_else(|| {
            ProviderError::Discovery("OIDC configuration missing token_endpoint".to_string())
        })?;

        let signing_algs: Vec<CoreJwsSigningAlgorithm> = metadata
            .id_token_signing_alg_values_supported()
            .iter()
            .filter(|alg| **alg != CoreJwsSigningAlgorithm::None)
            .cloned()
            .collect();

        if signing_algs.is_empty() {
            return Err(ProviderError::Discovery(
                "OIDC configuration advertises no usable ID token signing algorithm".to_string(),
            ));
        }

        Ok(DiscoveredIssuer {
            issuer: metadata.issuer().clone(),
            authorization_endpoint: metadata.authorization_endpoint().clone(),
            token_endpoint,
            jwks: metadata.jwks().clone(),
            signing_algs,
        })
    }
}
