//! Component B — Authenticator.
//!
//! Produces `(storage-url, token)` pairs. The actual network exchange
//! (Keystone password auth, hubiC's OAuth2 refresh dance) is out of scope
//! per the specification — "the hubiC OAuth2 token exchange (a pluggable
//! authenticator)" — so each non-trivial variant here is itself a thin
//! pluggable boundary (a `KeystoneExchange`/`HubicExchange` trait) rather
//! than a bundled HTTP implementation, mirroring how Component A's
//! `StorageClient` is external.

pub mod hubic;
pub mod password;
pub mod static_token;

use async_trait::async_trait;

use crate::error::Result;

pub use hubic::{HubicAuthenticator, HubicExchange};
pub use password::{KeystoneExchange, PasswordAuthenticator};
pub use static_token::StaticTokenAuthenticator;

#[derive(Debug, Clone)]
pub struct Credentials {
    pub storage_url: String,
    pub token: String,
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self) -> Result<Credentials>;
}

/// `os-auth-version == 0`: probe Keystone v3, then v2, then fall back to
/// a preset static token, matching the original CLI's auto-version
/// handling (`examples/original_source/cmd/root.go`).
pub struct AutoAuthenticator {
    candidates: Vec<Box<dyn Authenticator>>,
}

impl AutoAuthenticator {
    pub fn new(candidates: Vec<Box<dyn Authenticator>>) -> Self {
        AutoAuthenticator { candidates }
    }
}

#[async_trait]
impl Authenticator for AutoAuthenticator {
    async fn authenticate(&self) -> Result<Credentials> {
        let mut last_err = None;
        for candidate in &self.candidates {
            match candidate.authenticate().await {
                Ok(creds) => return Ok(creds),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            crate::error::SwiftFsError::InvalidConfig("no authenticator candidates configured".to_string())
        }))
    }
}
