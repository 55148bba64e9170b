//! Component H — Metadata Lister (Worker Pool).
//!
//! One bounded task channel fed by readdir, a fixed pool of workers each
//! looping on it. A task carries a target node; a worker performs a
//! single HEAD, updates the node's size/headers/segmented flag in place,
//! and acks a per-call completion channel owned by the submitting
//! readdir. Readdir blocks until exactly its own submitted task count
//! has acked.

use std::sync::Arc;

use tracing::warn;

use crate::naming;
use crate::node::{NodeKind, NodeRef};
use crate::pool::ConnectionPool;
use crate::storage::MANIFEST_HEADER;

struct ListerTask {
    container: String,
    node: NodeRef,
    reply: async_channel::Sender<()>,
}

pub struct MetadataLister {
    task_tx: async_channel::Sender<ListerTask>,
    _workers: Vec<tokio::task::JoinHandle<()>>,
}

impl MetadataLister {
    pub fn start(concurrency: u32, pool: Arc<ConnectionPool>) -> Self {
        let concurrency = concurrency.max(1) as usize;
        let (task_tx, task_rx) = async_channel::bounded::<ListerTask>(concurrency * 4);

        let mut workers = Vec::with_capacity(concurrency);
        for _ in 0..concurrency {
            let task_rx = task_rx.clone();
            let pool = pool.clone();
            workers.push(tokio::spawn(async move {
                while let Ok(task) = task_rx.recv().await {
                    if let Err(e) = resolve_one(&pool, &task.container, &task.node).await {
                        warn!(container = %task.container, path = %task.node.path, error = %e, "metadata lister HEAD failed");
                    }
                    let _ = task.reply.send(()).await;
                }
            }));
        }

        MetadataLister {
            task_tx,
            _workers: workers,
        }
    }

    /// Submits `nodes` for HEAD resolution and blocks until all of them
    /// have completed. Independent of any other concurrent readdir's
    /// in-flight batch.
    pub async fn resolve_batch(&self, container: &str, nodes: &[NodeRef]) {
        if nodes.is_empty() {
            return;
        }
        let (reply_tx, reply_rx) = async_channel::bounded::<()>(nodes.len());
        for node in nodes {
            self.task_tx
                .send(ListerTask {
                    container: container.to_string(),
                    node: node.clone(),
                    reply: reply_tx.clone(),
                })
                .await
                .expect("metadata lister task channel should not be closed while mounted");
        }
        drop(reply_tx);
        for _ in 0..nodes.len() {
            let _ = reply_rx.recv().await;
        }
    }
}

async fn resolve_one(pool: &ConnectionPool, container: &str, node: &NodeRef) -> crate::error::Result<()> {
    let client = pool.borrow().await;
    let stub = client.head_object(container, &node.path).await?;
    node.set_headers(stub.headers.clone());
    node.set_last_modified(stub.last_modified);

    if let Some(manifest) = stub.headers.get(MANIFEST_HEADER) {
        let segment_container = naming::segment_container_name(container);
        node.set_kind(NodeKind::Object {
            manifest_header: Some(manifest.clone()),
        });
        if let Ok(prefix) = naming::decode_manifest_header(manifest, &segment_container) {
            let segments = client
                .list_objects(&segment_container, &format!("{prefix}/"), None, None)
                .await?;
            let total: u64 = segments.iter().map(|s| s.bytes).sum();
            node.set_size(total);
            return Ok(());
        }
        // Header present but malformed/mismatched: size falls back to the
        // raw (likely zero) object size; callers that care (unlink,
        // truncate) re-validate the header themselves and fail there.
        node.set_size(stub.bytes);
        return Ok(());
    }

    node.set_size(stub.bytes);
    node.set_kind(NodeKind::Object { manifest_header: None });
    Ok(())
}
