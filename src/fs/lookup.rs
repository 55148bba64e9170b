//! `Lookup`: a cache-first single-name resolution. Runs `readdir` first
//! only when the parent's own cache entry is absent or expired —
//! `DirectoryCache::peek` already returns `None` for both cases.

use crate::error::{Result, SwiftFsError};
use crate::fs::entry::FsContext;
use crate::fs::readdir::readdir;
use crate::node::NodeRef;

pub async fn lookup(ctx: &FsContext, container: &str, dir: &NodeRef, name: &str) -> Result<NodeRef> {
    if ctx.directory_cache.peek(container, &dir.path).is_none() {
        readdir(ctx, container, dir).await?;
    }
    ctx.directory_cache
        .get(container, &dir.path, name)
        .ok_or_else(|| SwiftFsError::not_found(name))
}
