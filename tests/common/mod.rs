use std::sync::Arc;

use swiftfuse::auth::StaticTokenAuthenticator;
use swiftfuse::config::{Config, MountArgs};
use swiftfuse::fs::{self, FsContext};
use swiftfuse::node::NodeRef;
use swiftfuse::pool::ConnectionPool;
use swiftfuse::storage::memory::MemoryStorageClient;
use swiftfuse::storage::StorageClient;

pub fn mount_args() -> MountArgs {
    MountArgs {
        device: "swift".to_string(),
        mountpoint: std::path::PathBuf::from("/mnt"),
        os_auth_url: None,
        os_username: None,
        os_password: None,
        os_tenant_name: None,
        os_region_name: None,
        os_auth_token: Some("tok".to_string()),
        os_storage_url: Some("http://storage.example".to_string()),
        os_auth_version: None,
        os_container_name: None,
        os_segment_size: Some(1),
        os_connect_timeout: None,
        os_request_timeout: None,
        hubic_authorization: None,
        hubic_refresh_token: None,
        hubic_times: false,
        default_uid: None,
        default_gid: None,
        default_mode: None,
        allow_root: false,
        allow_other: false,
        default_permissions: false,
        read_only: false,
        readdir_concurrency: None,
        readdir_extra_attributes: false,
        block_size: None,
        readahead_size: None,
        transfer_mode: None,
        cache_ttl: None,
        cache_max_entries: None,
        cache_max_access: None,
    }
}

/// Wraps an `FsContext` wired to a fresh `MemoryStorageClient` and exposes
/// the storage client directly so tests can assert on what actually landed
/// in the backing store, not just what the cache reports.
pub struct Fixture {
    pub ctx: FsContext,
    pub client: Arc<dyn StorageClient>,
}

impl Fixture {
    /// A fixture with no container pinned: the mount root is the
    /// synthetic multi-container `Root`.
    pub async fn new() -> Self {
        let client: Arc<dyn StorageClient> = Arc::new(MemoryStorageClient::new());
        let pool = Arc::new(ConnectionPool::new(vec![client.clone()]));
        let auth = StaticTokenAuthenticator {
            storage_url: "http://storage.example".to_string(),
            token: "tok".to_string(),
        };
        let ctx = fs::init(Config::load(&mount_args(), None).unwrap(), &auth, pool).await.unwrap();
        Fixture { ctx, client }
    }

    /// A fixture pinned to a single container, created up front.
    pub async fn with_container(name: &str) -> Self {
        Self::with_container_configured(name, |_| {}).await
    }

    /// Like [`Fixture::with_container`], but lets the caller tweak
    /// `MountArgs` before the config is resolved (e.g. to enable
    /// `readdir_extra_attributes`, `hubic_times`, or a `transfer_mode`
    /// bit that isn't exercised by the default fixture).
    pub async fn with_container_configured(name: &str, configure: impl FnOnce(&mut MountArgs)) -> Self {
        let client: Arc<dyn StorageClient> = Arc::new(MemoryStorageClient::new());
        client.ensure_container(name, None).await.unwrap();
        let pool = Arc::new(ConnectionPool::new(vec![client.clone()]));
        let auth = StaticTokenAuthenticator {
            storage_url: "http://storage.example".to_string(),
            token: "tok".to_string(),
        };
        let mut args = mount_args();
        args.os_container_name = Some(name.to_string());
        configure(&mut args);
        let ctx = fs::init(Config::load(&args, None).unwrap(), &auth, pool).await.unwrap();
        Fixture { ctx, client }
    }

    pub fn root(&self) -> NodeRef {
        fs::root(&self.ctx)
    }

    /// Resolves `path` (slash-separated, relative to the mount root) to
    /// its container name and node.
    pub async fn resolve(&self, path: &str) -> swiftfuse::Result<(String, NodeRef)> {
        fs::resolve(&self.ctx, path).await
    }
}
