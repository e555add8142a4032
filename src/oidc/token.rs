//! Token endpoint response handling
//!
//! The authorization-code grant response is kept with all non-standard
//! members so the ID token can be looked up as a named extension.

use crate::error::{ProviderError, Result};
use oauth2::basic::BasicTokenType;
use oauth2::{ExtraTokenFields, StandardTokenResponse};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const ID_TOKEN_FIELD: &str = "id_token";

/// Members of a token response beyond those defined by OAuth 2.0
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtensionFields {
    #[serde(flatten)]
    fields: HashMap<String, serde_json::Value>,
}

impl ExtraTokenFields for ExtensionFields {}

impl ExtensionFields {
    /// Look up an extension member by name
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }

    /// The raw ID token, if the provider returned one as a string
    pub fn id_token(&self) -> Result<&str> {
        self.get(ID_TOKEN_FIELD)
            .and_then(|value| value.as_str())
            .ok_or(ProviderError::MissingIdToken)
    }
}

/// Token response with extension members preserved
pub type TokenResponse = StandardTokenResponse<ExtensionFields, BasicTokenType>;

#[cfg(test)]
mod tests {
    use super::*;
    use oauth2::TokenResponse as _;

    fn parse(body: serde_json::Value) -> TokenResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_id_token_extension_is_extracted() {
        let response = parse(serde_json::json!({
            "access_token": "access",
            "token_type": "Bearer",
            "expires_in": 300,
            "id_token": "header.payload.signature",
            "session_state": "abc"
        }));

        assert_eq!(response.access_token().secret(), "access");
        assert_eq!(response.extra_fields().id_token().unwrap(), "header.payload.signature");
        assert_eq!(
            response.extra_fields().get("session_state"),
            Some(&serde_json::json!("abc"))
        );
    }

    #[test]
    fn test_missing_id_token() {
        let response = parse(serde_json::json!({
            "access_token": "access",
            "token_type": "bearer"
        }));

        assert!(matches!(
            response.extra_fields().id_token(),
            Err(ProviderError::MissingIdToken)
        ));
    }

    #[test]
    fn test_non_string_id_token() {
        for id_token in [serde_json::json!(42), serde_json::json!(null), serde_json::json!({"raw": "x"})] {
            let response = parse(serde_json::json!({
                "access_token": "access",
                "token_type": "Bearer",
                "id_token": id_token
            }));

            assert!(matches!(
                response.extra_fields().id_token(),
                Err(ProviderError::MissingIdToken)
            ));
        }
    }
}
