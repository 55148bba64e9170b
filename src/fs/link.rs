//! `Link`: hardlink-as-copy, since object storage has no inode aliasing.
//! Directories cannot be linked. A segmented object can only be linked
//! within the same container: its manifest header names a segment
//! container derived solely from the source container's name, and a
//! destination in a different container can never share that name, so
//! cross-container linking of a manifest always fails closed rather
//! than producing a manifest that points at the wrong segments.

use crate::error::{Result, SwiftFsError};
use crate::fs::entry::FsContext;
use crate::fs::lookup::lookup;
use crate::naming;
use crate::node::{Node, NodeRef};
use crate::storage::MANIFEST_HEADER;

pub async fn link(
    ctx: &FsContext,
    container: &str,
    src_dir: &NodeRef,
    src_name: &str,
    dst_container: &str,
    dst_dir: &NodeRef,
    dst_name: &str,
) -> Result<NodeRef> {
    let node = lookup(ctx, container, src_dir, src_name).await?;
    if node.is_directory_like() {
        return Err(SwiftFsError::NotSupported("link on a directory"));
    }

    let manifest_header = node.manifest_header();
    if manifest_header.is_some() && container != dst_container {
        let src_segment = naming::segment_container_name(container);
        let dst_segment = naming::segment_container_name(dst_container);
        if src_segment != dst_segment {
            return Err(SwiftFsError::NotSupported("link of a segmented object across containers"));
        }
    }

    let new_path = format!("{}{}", dst_dir.path, dst_name);
    let mut extra_headers = node.headers();
    if let Some(header) = &manifest_header {
        extra_headers.insert(MANIFEST_HEADER.to_string(), header.clone());
    }

    {
        let client = ctx.pool.borrow().await;
        client
            .copy_object(container, &node.path, dst_container, &new_path, extra_headers.clone())
            .await?;
    }

    let new_node = Node::new(dst_container, new_path, dst_name, node.kind());
    new_node.set_size(node.size());
    new_node.set_headers(extra_headers);
    new_node.set_last_modified(node.last_modified());
    ctx.directory_cache.set(dst_container, &dst_dir.path, dst_name, new_node.clone());
    Ok(new_node)
}
