use std::sync::Arc;

use async_trait::async_trait;

use super::{Authenticator, Credentials};
use crate::error::Result;

/// hubiC's two-step OAuth2 dance (refresh token → API token → account
/// credentials, `examples/original_source/svfs/hubic.go`) is external per
/// the specification; this is the pluggable boundary a real hubiC client
/// implements.
#[async_trait]
pub trait HubicExchange: Send + Sync {
    async fn exchange(&self, authorization: &str, refresh_token: &str) -> Result<Credentials>;
}

pub struct HubicAuthenticator {
    pub authorization: String,
    pub refresh_token: String,
    pub exchange: Arc<dyn HubicExchange>,
}

#[async_trait]
impl Authenticator for HubicAuthenticator {
    async fn authenticate(&self) -> Result<Credentials> {
        self.exchange.exchange(&self.authorization, &self.refresh_token).await
    }
}
