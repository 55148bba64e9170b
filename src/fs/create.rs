//! `Create`: a zero-byte object PUT followed by a Directory Cache insert,
//! unless `SKIP_CREATE` asks us to skip the PUT (the cache entry is still
//! created, so the file appears to exist for the remainder of the
//! session even though storage never saw it).

use bytes::Bytes;

use crate::config::transfer_mode;
use crate::error::Result;
use crate::fs::entry::FsContext;
use crate::node::{Node, NodeKind, NodeRef};
use crate::storage::Headers;

pub async fn create(ctx: &FsContext, container: &str, dir: &NodeRef, name: &str) -> Result<NodeRef> {
    let path = format!("{}{}", dir.path, name);

    if ctx.config.transfer_mode & transfer_mode::SKIP_CREATE == 0 {
        let client = ctx.pool.borrow().await;
        client
            .put_object(container, &path, Bytes::new(), "application/octet-stream", Headers::new())
            .await?;
    }

    let node = Node::new(container, path, name, NodeKind::Object { manifest_header: None });
    ctx.directory_cache.set(container, &dir.path, name, node.clone());
    Ok(node)
}
