//! Credential sourcing for calls to the sales service.
//!
//! The identity provider is consumed only as a token source: the resolver and
//! the gateway depend on `CredentialProvider`, never on a concrete client.

pub mod credentials;

pub use credentials::{AuthContext, BearerToken, CredentialProvider, SharedCredentials, StaticCredentials};
