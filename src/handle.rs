//! Per-open state (§3 Handle entity) and the table mapping FUSE file
//! handle ids to it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use bytes::BytesMut;

use crate::node::NodeRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleMode {
    Read,
    Write,
}

/// Segmented Write Engine progress for one handle (§4.J).
pub struct WriteState {
    /// `None` until the handle's first promotion to a segmented object.
    pub segment_prefix: Option<String>,
    pub segment_index: u32,
    pub bytes_in_current_segment: u64,
    pub total_bytes_written: u64,
    /// Buffers small writes so the engine does not issue one upload
    /// request per `write()` call, as §9 Design Notes permits, so long as
    /// the segment-size boundary stays exact.
    pub buffer: BytesMut,
}

impl Default for WriteState {
    fn default() -> Self {
        WriteState {
            segment_prefix: None,
            segment_index: 0,
            bytes_in_current_segment: 0,
            total_bytes_written: 0,
            buffer: BytesMut::new(),
        }
    }
}

pub struct Handle {
    pub id: u64,
    pub node: NodeRef,
    pub container: String,
    pub mode: HandleMode,
    pub create: bool,
    pub truncated: bool,
    pub write_state: Mutex<WriteState>,
    /// Held for the handle's lifetime when `mode == Write`; taken at
    /// `open()`, dropped at `release()` (§5 per-object mutex discipline).
    pub write_guard: Option<tokio::sync::OwnedMutexGuard<()>>,
}

impl Handle {
    pub fn new_read(id: u64, container: impl Into<String>, node: NodeRef) -> Arc<Handle> {
        Arc::new(Handle {
            id,
            node,
            container: container.into(),
            mode: HandleMode::Read,
            create: false,
            truncated: false,
            write_state: Mutex::new(WriteState::default()),
            write_guard: None,
        })
    }

    pub fn new_write(
        id: u64,
        container: impl Into<String>,
        node: NodeRef,
        create: bool,
        write_guard: tokio::sync::OwnedMutexGuard<()>,
    ) -> Arc<Handle> {
        Arc::new(Handle {
            id,
            node,
            container: container.into(),
            mode: HandleMode::Write,
            create,
            truncated: false,
            write_state: Mutex::new(WriteState::default()),
            write_guard: Some(write_guard),
        })
    }
}

/// Issues fresh handle ids and stores the live handles.
pub struct HandleTable {
    next_id: AtomicU64,
    handles: Mutex<HashMap<u64, Arc<Handle>>>,
}

impl Default for HandleTable {
    fn default() -> Self {
        HandleTable {
            next_id: AtomicU64::new(1),
            handles: Mutex::new(HashMap::new()),
        }
    }
}

impl HandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, build: impl FnOnce(u64) -> Arc<Handle>) -> Arc<Handle> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = build(id);
        self.handles.lock().unwrap().insert(id, handle.clone());
        handle
    }

    pub fn get(&self, id: u64) -> Option<Arc<Handle>> {
        self.handles.lock().unwrap().get(&id).cloned()
    }

    pub fn remove(&self, id: u64) -> Option<Arc<Handle>> {
        self.handles.lock().unwrap().remove(&id)
    }
}
