//! `Rename`: regular objects use the storage facade's atomic
//! `move_object`; manifests use server-side copy then delete the source
//! instead, since a move would not carry the manifest semantics (the
//! segment objects stay addressed by the old manifest path otherwise).
//! Cross-container rename is not supported (the destination would need
//! its own segment container and no storage-policy reconciliation is
//! defined for that case).
//!
//! A renamed node is represented by a freshly constructed `NodeRef`
//! rather than an in-place path/name mutation: `Node::path`/`Node::name`
//! are plain immutable fields, so any handle a caller already holds on
//! the old node keeps working against the old path until released,
//! while the Directory Cache is updated to point callers making new
//! lookups at the new one.

use crate::error::{Result, SwiftFsError};
use crate::fs::entry::FsContext;
use crate::fs::lookup::lookup;
use crate::node::{Node, NodeRef};
use crate::storage::MANIFEST_HEADER;

pub async fn rename(
    ctx: &FsContext,
    container: &str,
    src_dir: &NodeRef,
    src_name: &str,
    dst_container: &str,
    dst_dir: &NodeRef,
    dst_name: &str,
) -> Result<()> {
    if container != dst_container {
        return Err(SwiftFsError::NotSupported("rename across containers"));
    }

    let node = lookup(ctx, container, src_dir, src_name).await?;
    let is_dir = node.is_directory_like();
    let new_path = if is_dir {
        format!("{}{}/", dst_dir.path, dst_name)
    } else {
        format!("{}{}", dst_dir.path, dst_name)
    };

    let manifest_header = node.manifest_header();
    let mut extra_headers = node.headers();

    {
        let client = ctx.pool.borrow().await;
        match &manifest_header {
            Some(manifest_header) => {
                extra_headers.insert(MANIFEST_HEADER.to_string(), manifest_header.clone());
                client
                    .copy_object(container, &node.path, dst_container, &new_path, extra_headers.clone())
                    .await?;
                client.delete_object(container, &node.path).await?;
            }
            None => {
                client.move_object(container, &node.path, &new_path).await?;
            }
        }
    }

    let new_node = Node::new(dst_container, new_path, dst_name, node.kind());
    new_node.set_size(node.size());
    new_node.set_headers(extra_headers);
    new_node.set_last_modified(node.last_modified());

    ctx.directory_cache.delete(container, &src_dir.path, src_name);
    if is_dir {
        ctx.directory_cache.delete_all(container, &node.path);
    }
    ctx.directory_cache.set(dst_container, &dst_dir.path, dst_name, new_node);
    Ok(())
}
