//! OpenID Connect provider

pub mod claims;
pub mod client;
pub mod discovery;
pub mod token;

pub use claims::{flatten_groups, GroupClaims, GroupIdToken, IdentityClaims};
pub use client::OidcProvider;
pub use discovery::DiscoveredIssuer;
pub use token::{ExtensionFields, TokenResponse};
