use async_trait::async_trait;

use super::{Authenticator, Credentials};
use crate::error::Result;

/// `os-auth-token` / `os-storage-url` supplied directly; no network round
/// trip needed.
pub struct StaticTokenAuthenticator {
    pub storage_url: String,
    pub token: String,
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn authenticate(&self) -> Result<Credentials> {
        Ok(Credentials {
            storage_url: self.storage_url.clone(),
            token: self.token.clone(),
        })
    }
}
