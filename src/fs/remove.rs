//! `Unlink`: for a plain object, a single delete. For a manifest, the
//! segment set must validate against this container's segment container
//! before anything is deleted — a malformed or foreign manifest header
//! fails closed with `ENOTSUP`, leaving storage untouched (§8 boundary
//! behaviour), rather than silently deleting just the zero-byte manifest
//! object.

use crate::error::Result;
use crate::fs::entry::FsContext;
use crate::fs::lookup::lookup;
use crate::node::NodeRef;
use crate::truncate;

pub async fn unlink(ctx: &FsContext, container: &str, dir: &NodeRef, name: &str) -> Result<()> {
    let node = lookup(ctx, container, dir, name).await?;

    if let Some(manifest_header) = node.manifest_header() {
        truncate::delete_segment_set(&ctx.pool, container, &manifest_header).await?;
    }

    {
        let client = ctx.pool.borrow().await;
        client.delete_object(container, &node.path).await?;
    }

    ctx.directory_cache.delete(container, &dir.path, name);
    Ok(())
}
