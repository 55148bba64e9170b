//! Extended attributes are stored as `X-Object-Meta-Xattr-<name>`
//! headers. On a plain object these are set via a POST (metadata-only
//! update, no body rewrite); on a segmented object a POST would not
//! touch the manifest's own headers, so the update instead goes through
//! `copy_object` with the manifest header re-attached, preserving it.
//! Either way the result is mirrored onto the in-memory node so a
//! subsequent `getxattr` doesn't need a round trip.

use crate::error::{Result, SwiftFsError};
use crate::fs::entry::FsContext;
use crate::node::NodeRef;
use crate::storage::{Headers, MANIFEST_HEADER, XATTR_HEADER_PREFIX};

fn header_name(name: &str) -> String {
    format!("{XATTR_HEADER_PREFIX}{name}")
}

/// Applies `headers` to storage, routing through a manifest-preserving
/// copy when `node` is a segmented object rather than a plain POST.
async fn apply_headers(ctx: &FsContext, container: &str, node: &NodeRef, mut headers: Headers) -> Result<()> {
    let client = ctx.pool.borrow().await;
    match node.manifest_header() {
        Some(manifest_header) => {
            headers.insert(MANIFEST_HEADER.to_string(), manifest_header);
            client.copy_object(container, &node.path, container, &node.path, headers).await
        }
        None => client.post_object(container, &node.path, headers).await,
    }
}

pub async fn set_xattr(ctx: &FsContext, container: &str, node: &NodeRef, name: &str, value: &[u8]) -> Result<()> {
    let value = String::from_utf8(value.to_vec()).map_err(|_| SwiftFsError::NotSupported("non-utf8 xattr value"))?;
    let mut headers = Headers::new();
    headers.insert(header_name(name), value);
    apply_headers(ctx, container, node, headers.clone()).await?;
    node.merge_headers(headers);
    Ok(())
}

pub fn get_xattr(node: &NodeRef, name: &str) -> Option<String> {
    node.headers().get(&header_name(name)).cloned()
}

pub fn list_xattr(node: &NodeRef) -> Vec<String> {
    node.headers()
        .keys()
        .filter_map(|k| k.strip_prefix(XATTR_HEADER_PREFIX).map(str::to_string))
        .collect()
}

pub async fn remove_xattr(ctx: &FsContext, container: &str, node: &NodeRef, name: &str) -> Result<()> {
    let key = header_name(name);
    let mut headers = node.headers();
    if headers.remove(&key).is_none() {
        return Err(SwiftFsError::not_found(name));
    }
    apply_full_headers(ctx, container, node, headers.clone()).await?;
    node.set_headers(headers);
    Ok(())
}

/// Like [`apply_headers`] but replaces the object's entire header set
/// rather than merging a delta — needed for removal, where the absence
/// of a key has to actually take effect.
async fn apply_full_headers(ctx: &FsContext, container: &str, node: &NodeRef, mut headers: Headers) -> Result<()> {
    let client = ctx.pool.borrow().await;
    if let Some(manifest_header) = node.manifest_header() {
        headers.insert(MANIFEST_HEADER.to_string(), manifest_header);
    }
    client.post_object(container, &node.path, headers).await
}
