//! Component K — Truncate/Delete Engine.

use bytes::Bytes;

use crate::error::{Result, SwiftFsError};
use crate::naming;
use crate::node::{NodeKind, NodeRef};
use crate::pool::ConnectionPool;
use crate::storage::MANIFEST_HEADER;

/// Validates `manifest_header` against `container`'s segment container,
/// lists every segment under the decoded prefix, and deletes them.
/// Returns the decoded prefix on success. `ENOTSUP` on a missing or
/// mismatched prefix, without touching storage (§8 boundary behaviour).
pub async fn delete_segment_set(pool: &ConnectionPool, container: &str, manifest_header: &str) -> Result<String> {
    let segment_container = naming::segment_container_name(container);
    let prefix = naming::decode_manifest_header(manifest_header, &segment_container)?;

    let client = pool.borrow().await;
    let segments = client
        .list_objects(&segment_container, &format!("{prefix}/"), None, None)
        .await?;
    let names: Vec<String> = segments.into_iter().map(|s| s.name).collect();
    client.delete_objects(&segment_container, &names).await?;
    Ok(prefix)
}

/// `setattr.size = 0` on a manifest: deletes all its segments, clears the
/// manifest header, and clears the segmented flag. On a regular object,
/// simply overwrites it with an empty body.
pub async fn truncate_to_zero(pool: &ConnectionPool, container: &str, node: &NodeRef) -> Result<()> {
    let Some(manifest_header) = node.manifest_header() else {
        let client = pool.borrow().await;
        client
            .put_object(container, &node.path, Bytes::new(), "application/octet-stream", node.headers())
            .await?;
        node.set_size(0);
        return Ok(());
    };

    delete_segment_set(pool, container, &manifest_header).await.map_err(|e| match e {
        SwiftFsError::NotSupported(_) => e,
        other => other,
    })?;

    let mut headers = node.headers();
    headers.remove(MANIFEST_HEADER);
    {
        let client = pool.borrow().await;
        client
            .put_object(container, &node.path, Bytes::new(), "application/octet-stream", headers.clone())
            .await?;
    }
    node.set_headers(headers);
    node.set_size(0);
    node.set_kind(NodeKind::Object { manifest_header: None });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::storage::memory::MemoryStorageClient;
    use crate::storage::{Headers, StorageClient};
    use std::sync::Arc;

    async fn segmented_fixture() -> (Arc<ConnectionPool>, NodeRef) {
        let client: Arc<dyn StorageClient> = Arc::new(MemoryStorageClient::new());
        client.ensure_container("c", None).await.unwrap();
        client.ensure_container("c_segments", None).await.unwrap();
        client
            .put_object("c_segments", "f/1700000000/00000001", Bytes::from(vec![0u8; 1024 * 1024]), "", Headers::new())
            .await
            .unwrap();
        client
            .put_object("c_segments", "f/1700000000/00000002", Bytes::from(vec![0u8; 200 * 1024]), "", Headers::new())
            .await
            .unwrap();
        let header = naming::encode_manifest_header("c_segments", "f/1700000000");
        let mut headers = Headers::new();
        headers.insert(MANIFEST_HEADER.to_string(), header.clone());
        client
            .put_object("c", "f", Bytes::new(), "application/octet-stream", headers.clone())
            .await
            .unwrap();

        let node = Node::new("c", "f", "f", NodeKind::Object { manifest_header: Some(header) });
        node.set_size(1024 * 1024 + 200 * 1024);
        node.set_headers(headers);
        let pool = Arc::new(ConnectionPool::new(vec![client]));
        (pool, node)
    }

    #[tokio::test]
    async fn truncate_to_zero_deletes_segments_and_clears_manifest() {
        let (pool, node) = segmented_fixture().await;
        truncate_to_zero(&pool, "c", &node).await.unwrap();
        assert_eq!(node.size(), 0);
        assert!(node.manifest_header().is_none());

        let client = pool.borrow().await;
        let remaining = client.list_objects("c_segments", "f/1700000000/", None, None).await.unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn unlink_of_mismatched_manifest_is_not_supported_without_touching_storage() {
        let (pool, _node) = segmented_fixture().await;
        let bogus_header = naming::encode_manifest_header("other_segments", "f/1700000000");
        let result = delete_segment_set(&pool, "c", &bogus_header).await;
        assert!(matches!(result, Err(SwiftFsError::NotSupported(_))));

        // Storage untouched: the real segments are all still present.
        let client = pool.borrow().await;
        let remaining = client.list_objects("c_segments", "f/1700000000/", None, None).await.unwrap();
        assert_eq!(remaining.len(), 2);
    }
}
