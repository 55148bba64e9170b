//! `Symlink`: a zero-byte `application/link` object carrying the target
//! in a meta header, same shape as a real object but never opened for
//! read/write through the normal data path.

use bytes::Bytes;

use crate::error::Result;
use crate::fs::entry::FsContext;
use crate::node::{Node, NodeKind, NodeRef};
use crate::storage::{Headers, LINK_CONTENT_TYPE, SYMLINK_TARGET_HEADER};

pub async fn symlink(ctx: &FsContext, container: &str, dir: &NodeRef, name: &str, target: &str) -> Result<NodeRef> {
    let path = format!("{}{}", dir.path, name);
    let mut headers = Headers::new();
    headers.insert(SYMLINK_TARGET_HEADER.to_string(), target.to_string());

    {
        let client = ctx.pool.borrow().await;
        client.put_object(container, &path, Bytes::new(), LINK_CONTENT_TYPE, headers.clone()).await?;
    }

    let node = Node::new(
        container,
        path,
        name,
        NodeKind::Symlink {
            target: target.to_string(),
        },
    );
    node.set_headers(headers);
    ctx.directory_cache.set(container, &dir.path, name, node.clone());
    Ok(node)
}
