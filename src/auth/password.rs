use std::sync::Arc;

use async_trait::async_trait;

use super::{Authenticator, Credentials};
use crate::error::Result;

/// The actual Keystone handshake (v1/v2/v3) is external per the
/// specification; this is the pluggable boundary a real identity client
/// implements.
#[async_trait]
pub trait KeystoneExchange: Send + Sync {
    async fn exchange(
        &self,
        auth_version: u8,
        auth_url: &str,
        username: &str,
        password: &str,
        tenant_name: Option<&str>,
        region_name: Option<&str>,
    ) -> Result<Credentials>;
}

pub struct PasswordAuthenticator {
    pub auth_version: u8,
    pub auth_url: String,
    pub username: String,
    pub password: String,
    pub tenant_name: Option<String>,
    pub region_name: Option<String>,
    pub exchange: Arc<dyn KeystoneExchange>,
}

#[async_trait]
impl Authenticator for PasswordAuthenticator {
    async fn authenticate(&self) -> Result<Credentials> {
        self.exchange
            .exchange(
                self.auth_version,
                &self.auth_url,
                &self.username,
                &self.password,
                self.tenant_name.as_deref(),
                self.region_name.as_deref(),
            )
            .await
    }
}
