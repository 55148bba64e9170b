//! `Mkdir`: a zero-byte `application/directory` object PUT, unless
//! `SKIP_MKDIR` is set.

use bytes::Bytes;

use crate::config::transfer_mode;
use crate::error::Result;
use crate::fs::entry::FsContext;
use crate::node::{Node, NodeKind, NodeRef};
use crate::storage::{Headers, DIRECTORY_CONTENT_TYPE};

pub async fn mkdir(ctx: &FsContext, container: &str, dir: &NodeRef, name: &str) -> Result<NodeRef> {
    let path = format!("{}{}/", dir.path, name);

    if ctx.config.transfer_mode & transfer_mode::SKIP_MKDIR == 0 {
        let client = ctx.pool.borrow().await;
        client
            .put_object(container, &path, Bytes::new(), DIRECTORY_CONTENT_TYPE, Headers::new())
            .await?;
    }

    let node = Node::new(container, path, name, NodeKind::Directory);
    ctx.directory_cache.set(container, &dir.path, name, node.clone());
    Ok(node)
}
