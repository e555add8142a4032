//! ID token claim extraction
//!
//! Maps the claims of an already verified ID token to what the gateway needs,
//! and flattens hierarchical group paths.

use crate::error::{ProviderError, Result};
use openidconnect::core::{CoreGenderClaim, CoreJweContentEncryptionAlgorithm, CoreJwsSigningAlgorithm};
use openidconnect::{AdditionalClaims, IdToken, IdTokenClaims};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Non-standard claims read from the ID token.
///
/// `groups` stays untyped so a malformed value surfaces after signature
/// verification, as a claims error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    groups: Option<serde_json::Value>,
}

impl AdditionalClaims for GroupClaims {}

/// ID token carrying [`GroupClaims`]
pub type GroupIdToken = IdToken<
    GroupClaims,
    CoreGenderClaim,
    CoreJweContentEncryptionAlgorithm,
    CoreJwsSigningAlgorithm,
>;

/// Claims the gateway reads from an ID token
#[derive(Debug, Clone)]
pub struct IdentityClaims {
    pub email: String,
    groups: Vec<String>,
}

impl IdentityClaims {
    /// Extract email and groups from verified ID token claims
    pub fn from_verified(claims: &IdTokenClaims<GroupClaims, CoreGenderClaim>) -> Result<Self> {
        let email = claims
            .email()
            .map(|email| email.as_str().trim())
            .filter(|email| !email.is_empty())
            .ok_or_else(|| ProviderError::Claims("ID token has no email claim".to_string()))?
            .to_string();

        let groups = match &claims.additional_claims().groups {
            None | Some(serde_json::Value::Null) => Vec::new(),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| ProviderError::Claims(format!("Invalid groups claim: {}", e)))?,
        };

        Ok(IdentityClaims { email, groups })
    }

    /// Raw group values as the provider sent them
    pub fn raw_groups(&self) -> &[String] {
        &self.groups
    }

    /// Group names with the path hierarchy discarded
    pub fn groups(&self) -> BTreeSet<String> {
        flatten_groups(&self.groups)
    }
}

/// Split every group path on `/` and union the non-empty segments.
///
/// `["/teamA/sub", "teamA"]` becomes `{teamA, sub}`.
pub fn flatten_groups<S: AsRef<str>>(groups: &[S]) -> BTreeSet<String> {
    groups
        .iter()
        .flat_map(|group| group.as_ref().split('/'))
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn claims(extra: serde_json::Value) -> IdTokenClaims<GroupClaims, CoreGenderClaim> {
        let mut payload = serde_json::json!({
            "iss": "https://auth.example.com",
            "aud": ["gateway"],
            "exp": 4_102_444_800u64,
            "iat": 1_700_000_000u64,
            "sub": "user-1"
        });
        for (key, value) in extra.as_object().unwrap() {
            payload[key] = value.clone();
        }
        serde_json::from_value(payload).unwrap()
    }

    #[test]
    fn test_flatten_mixed_paths() {
        assert_eq!(flatten_groups(&["/teamA/sub", "teamA"]), set(&["teamA", "sub"]));
    }

    #[test]
    fn test_flatten_duplicates() {
        assert_eq!(flatten_groups(&["/a/b", "/a/b"]), set(&["a", "b"]));
    }

    #[test]
    fn test_flatten_drops_empty_segments() {
        assert_eq!(flatten_groups(&["a//b/"]), set(&["a", "b"]));
        assert_eq!(flatten_groups(&["/", "//", ""]), BTreeSet::new());
    }

    #[test]
    fn test_flatten_unions_across_values() {
        assert_eq!(flatten_groups(&["/a", "a/b"]), set(&["a", "b"]));
        assert_eq!(flatten_groups(&["a/b", "/a"]), flatten_groups(&["/a", "a/b"]));
    }

    #[test]
    fn test_flatten_is_idempotent() {
        let once = flatten_groups(&["/org/teamA", "org/teamB/"]);
        let twice = flatten_groups(&once.iter().collect::<Vec<_>>());
        assert_eq!(once, twice);
        assert_eq!(once, set(&["org", "teamA", "teamB"]));
    }

    #[test]
    fn test_from_verified_reads_email_and_groups() {
        let claims = IdentityClaims::from_verified(&claims(serde_json::json!({
            "email": "u@x.com",
            "groups": ["/org/teamA", "org/teamB/"]
        })))
        .unwrap();

        assert_eq!(claims.email, "u@x.com");
        assert_eq!(claims.raw_groups(), ["/org/teamA", "org/teamB/"]);
        assert_eq!(claims.groups(), set(&["org", "teamA", "teamB"]));
    }

    #[test]
    fn test_from_verified_without_groups() {
        for extra in [
            serde_json::json!({"email": "u@x.com"}),
            serde_json::json!({"email": "u@x.com", "groups": null}),
        ] {
            let claims = IdentityClaims::from_verified(&claims(extra)).unwrap();
            assert!(claims.groups().is_empty());
        }
    }

    #[test]
    fn test_from_verified_rejects_bad_claims() {
        for extra in [
            serde_json::json!({}),
            serde_json::json!({"email": ""}),
            serde_json::json!({"email": "   "}),
            serde_json::json!({"email": "u@x.com", "groups": "admins"}),
            serde_json::json!({"email": "u@x.com", "groups": [1, 2]}),
        ] {
            let err = IdentityClaims::from_verified(&claims(extra)).unwrap_err();
            assert!(matches!(err, ProviderError::Claims(_)));
        }
    }

    #[test]
    fn test_non_string_email_fails_to_parse() {
        // Standard claims are typed, so this can never reach `from_verified`
        let payload = serde_json::json!({
            "iss": "https://auth.example.com",
            "aud": ["gateway"],
            "exp": 4_102_444_800u64,
            "iat": 1_700_000_000u64,
            "sub": "user-1",
            "email": 7
        });
        assert!(serde_json::from_value::<IdTokenClaims<GroupClaims, CoreGenderClaim>>(payload).is_err());
    }
}
