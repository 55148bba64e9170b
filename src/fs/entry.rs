//! Component L — Filesystem Entry Point (`Init` / `Root` / `Statfs`).

use std::sync::Arc;
use std::time::Duration;

use crate::auth::Authenticator;
use crate::cache::{ChangeCache, DirectoryCache};
use crate::config::Config;
use crate::error::Result;
use crate::handle::HandleTable;
use crate::lister::MetadataLister;
use crate::naming;
use crate::node::{AttrDefaults, Node, NodeKind, NodeRef};
use crate::pool::ConnectionPool;

/// Process-wide context passed explicitly to every operation rather than
/// read from ambient global state (§9 Design Notes).
pub struct FsContext {
    pub config: Config,
    pub pool: Arc<ConnectionPool>,
    pub directory_cache: DirectoryCache,
    pub change_cache: ChangeCache,
    pub lister: Arc<MetadataLister>,
    pub handles: HandleTable,
    pub mount_time: f64,
    /// Resolved once at `init` time: either a synthetic `Root` (multiple
    /// containers browsable) or the pinned `Container` node. Cheap to
    /// clone (`Arc`); `fs::resolve` reads it instead of re-probing
    /// storage on every path lookup.
    pub root: NodeRef,
}

impl FsContext {
    pub fn attr_defaults(&self) -> AttrDefaults {
        AttrDefaults {
            default_uid: self.config.default_uid,
            default_gid: self.config.default_gid,
            default_mode: self.config.default_mode,
            block_size: self.config.block_size,
            hubic_times: self.config.hubic_times,
            mount_time: self.mount_time,
        }
    }

    pub fn now_unix_seconds(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// `Init`: authenticates if no token is preset, starts the Metadata
/// Lister workers, and records configuration. The real storage client
/// construction from the resulting credentials happens outside this
/// crate (Component A is external); `pool` already wraps whatever
/// storage clients the caller wired up.
pub async fn init(config: Config, authenticator: &dyn Authenticator, pool: Arc<ConnectionPool>) -> Result<FsContext> {
    if config.os_auth_token.is_none() {
        authenticator.authenticate().await?;
    }

    let lister = Arc::new(MetadataLister::start(config.readdir_concurrency, pool.clone()));
    let mount_time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);

    let ttl = Duration::from_secs(config.cache_ttl_secs);
    let directory_cache = DirectoryCache::new(ttl, config.cache_max_entries, config.cache_max_access);

    let root = resolve_root(&config, &pool).await?;

    Ok(FsContext {
        config,
        pool,
        directory_cache,
        change_cache: ChangeCache::new(),
        lister,
        handles: HandleTable::new(),
        mount_time,
        root,
    })
}

/// `Root`: if a target container is configured, resolves and pins it
/// (creating the segment companion if missing); otherwise a synthetic
/// Root node whose children are discovered lazily by readdir.
async fn resolve_root(config: &Config, pool: &ConnectionPool) -> Result<NodeRef> {
    if let Some(name) = config.os_container_name.clone() {
        let segment_container = naming::segment_container_name(&name);
        let client = pool.borrow().await;
        client.ensure_container(&name, None).await?;
        let info = client.container_info(&name).await?;
        client.ensure_container(&segment_container, info.storage_policy.as_deref()).await?;
        return Ok(Node::new(
            "",
            "",
            name,
            NodeKind::Container {
                storage_policy: info.storage_policy,
            },
        ));
    }
    Ok(Node::root())
}

/// Cheap accessor for the mount's root node, resolved once at `init`.
pub fn root(ctx: &FsContext) -> NodeRef {
    ctx.root.clone()
}

#[derive(Debug, Clone, Copy)]
pub struct FsStat {
    pub bsize: u64,
    pub files: u64,
    pub blocks: u64,
    pub bfree: u64,
    pub bavail: u64,
}

/// `Statfs`: block-size from config; files-count from the account, or
/// from the pinned container alone when `os-container-name` is set (§6);
/// blocks and free-blocks derived from quota-vs-used math (§3 invariant
/// 7). A missing or non-positive quota yields "unlimited" (max
/// representable block count).
pub async fn statfs(ctx: &FsContext) -> Result<FsStat> {
    let account = {
        let client = ctx.pool.borrow().await;
        client.account_info().await?
    };
    let files = match ctx.root.kind() {
        NodeKind::Container { .. } => {
            let client = ctx.pool.borrow().await;
            client.container_info(&ctx.root.name).await?.object_count
        }
        _ => account.object_count,
    };
    let bsize = ctx.config.block_size as u64;
    let (blocks, bfree) = match account.quota_bytes {
        Some(q) if q > 0 => {
            let blocks = q as u64 / bsize;
            let used_blocks = account.bytes_used / bsize;
            (blocks, blocks.saturating_sub(used_blocks))
        }
        _ => (u64::MAX, u64::MAX),
    };
    Ok(FsStat {
        bsize,
        files,
        blocks,
        bfree,
        bavail: bfree,
    })
}
