//! Component J — Segmented Write Engine.
//!
//! Streams writes, rolling segments as the configured segment size is
//! crossed, and promotes a plain object into manifest-backed form on the
//! first crossing (§4.J). Every segment is written contiguously; the
//! writer never overlaps the reader path (§4.I).

use bytes::{Bytes, BytesMut};

use crate::error::Result;
use crate::handle::WriteState;
use crate::naming;
use crate::node::{NodeKind, NodeRef};
use crate::pool::ConnectionPool;
use crate::storage::{Headers, MANIFEST_HEADER};

/// Appends `data` to the handle's write state, rolling and promoting
/// segments as needed, and persists whatever is now fully or partially
/// buffered. `unix_seconds` names the segment prefix on first promotion
/// and must be stable for the lifetime of the handle.
pub async fn write(
    pool: &ConnectionPool,
    container: &str,
    node: &NodeRef,
    state: &mut WriteState,
    data: &[u8],
    segment_size: u64,
    unix_seconds: u64,
) -> Result<()> {
    state.buffer.extend_from_slice(data);
    state.total_bytes_written += data.len() as u64;

    while state.buffer.len() as u64 > segment_size {
        if state.segment_prefix.is_none() {
            promote(pool, container, node, state, segment_size, unix_seconds).await?;
        } else {
            seal_current_segment(pool, container, state, segment_size).await?;
        }
    }

    // Persist whatever remains buffered to the current active target so
    // concurrent readers (and the Change Cache consumer) see up-to-date
    // bytes without waiting for release.
    match &state.segment_prefix {
        None => {
            let client = pool.borrow().await;
            client
                .put_object(container, &node.path, to_bytes(&state.buffer), "application/octet-stream", Headers::new())
                .await?;
        }
        Some(prefix) => {
            let segment_container = naming::segment_container_name(container);
            let name = naming::segment_name(prefix, state.segment_index);
            let client = pool.borrow().await;
            client
                .put_object(&segment_container, &name, to_bytes(&state.buffer), "application/octet-stream", Headers::new())
                .await?;
        }
    }

    node.set_size(state.total_bytes_written);
    Ok(())
}

async fn promote(
    pool: &ConnectionPool,
    container: &str,
    node: &NodeRef,
    state: &mut WriteState,
    segment_size: u64,
    unix_seconds: u64,
) -> Result<()> {
    let segment_container = naming::segment_container_name(container);
    let prefix = naming::segment_prefix(&node.path, unix_seconds);
    let first_segment = naming::segment_name(&prefix, 1);

    let sealed: BytesMut = state.buffer.split_to(segment_size as usize);
    let manifest_header = naming::encode_manifest_header(&segment_container, &prefix);
    {
        let client = pool.borrow().await;
        client.ensure_container(&segment_container, None).await?;
        client
            .put_object(&segment_container, &first_segment, to_bytes(&sealed), "application/octet-stream", Headers::new())
            .await?;

        let mut headers = Headers::new();
        headers.insert(MANIFEST_HEADER.to_string(), manifest_header.clone());
        client
            .put_object(container, &node.path, Bytes::new(), "application/octet-stream", headers)
            .await?;
    }

    state.segment_prefix = Some(prefix);
    state.segment_index = 2;
    node.set_kind(NodeKind::Object {
        manifest_header: Some(manifest_header),
    });
    Ok(())
}

async fn seal_current_segment(
    pool: &ConnectionPool,
    container: &str,
    state: &mut WriteState,
    segment_size: u64,
) -> Result<()> {
    let prefix = state.segment_prefix.clone().expect("seal_current_segment requires a promoted handle");
    let segment_container = naming::segment_container_name(container);
    let sealed = state.buffer.split_to(segment_size as usize);
    let name = naming::segment_name(&prefix, state.segment_index);
    let client = pool.borrow().await;
    client
        .put_object(&segment_container, &name, to_bytes(&sealed), "application/octet-stream", Headers::new())
        .await?;
    state.segment_index += 1;
    Ok(())
}

fn to_bytes(buf: &BytesMut) -> Bytes {
    Bytes::copy_from_slice(buf)
}
