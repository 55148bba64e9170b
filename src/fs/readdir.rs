//! `Readdir`: the one operation that populates the Directory Cache, and
//! the first one consulted on a cache hit. Every other read path
//! (`lookup`, `getattr`) either hits the cache or falls back to calling
//! this first.

use std::collections::HashMap;

use crate::error::Result;
use crate::fs::entry::FsContext;
use crate::naming::{self, EntryKind};
use crate::node::{Node, NodeKind, NodeRef};

/// Lists `dir`'s children, classifies them, resolves zero-byte
/// candidates through the Metadata Lister, substitutes any node a
/// concurrent writer has registered in the Change Cache, and populates
/// the Directory Cache. Returns the children in iteration order.
pub async fn readdir(ctx: &FsContext, container: &str, dir: &NodeRef) -> Result<Vec<NodeRef>> {
    if let Some((_, children)) = ctx.directory_cache.get_all(container, &dir.path) {
        return Ok(children.into_values().collect());
    }

    if matches!(dir.kind(), NodeKind::Root) {
        return readdir_root(ctx, dir).await;
    }

    let entries = {
        let client = ctx.pool.borrow().await;
        client.list_objects(container, &dir.path, Some('/'), None).await?
    };
    let classified = naming::classify_listing(&entries, &dir.path);

    let mut children = HashMap::with_capacity(classified.len());
    let mut needs_metadata = Vec::new();

    for entry in &classified {
        if let Some(live) = ctx.change_cache.get(container, &entry.storage_path) {
            children.insert(entry.leaf_name.clone(), live);
            continue;
        }

        let kind = match &entry.kind {
            EntryKind::Directory | EntryKind::SyntheticDirectory => NodeKind::Directory,
            EntryKind::Symlink { target } => NodeKind::Symlink { target: target.clone() },
            EntryKind::Object => NodeKind::Object {
                manifest_header: entry.headers.get(crate::storage::MANIFEST_HEADER).cloned(),
            },
        };
        let node = Node::new(container, entry.storage_path.clone(), entry.leaf_name.clone(), kind);
        node.set_size(entry.bytes);
        node.set_headers(entry.headers.clone());
        node.set_last_modified(entry.last_modified);
        if entry.needs_metadata {
            needs_metadata.push(node.clone());
        }
        children.insert(entry.leaf_name.clone(), node);
    }

    if !needs_metadata.is_empty() {
        ctx.lister.resolve_batch(container, &needs_metadata).await;
    }

    let values: Vec<NodeRef> = children.values().cloned().collect();
    ctx.directory_cache.add_all(container, &dir.path, dir.clone(), children);
    Ok(values)
}

async fn readdir_root(ctx: &FsContext, root: &NodeRef) -> Result<Vec<NodeRef>> {
    let containers = {
        let client = ctx.pool.borrow().await;
        client.list_containers().await?
    };

    let mut children = HashMap::with_capacity(containers.len());
    for info in containers {
        if naming::is_segment_container(&info.name) {
            continue;
        }
        let node = Node::new(
            "",
            "",
            info.name.clone(),
            NodeKind::Container {
                storage_policy: info.storage_policy.clone(),
            },
        );
        children.insert(info.name, node);
    }

    let values: Vec<NodeRef> = children.values().cloned().collect();
    ctx.directory_cache.add_all("", "", root.clone(), children);
    Ok(values)
}
