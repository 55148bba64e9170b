//! Component G — Change Cache.
//!
//! A small map tracking in-flight writes so readdir can surface the live
//! writer's node instead of re-reading a stale or empty view from storage.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::node::NodeRef;

pub struct ChangeCache {
    inner: Mutex<HashMap<String, NodeRef>>,
}

fn key(container: &str, path: &str) -> String {
    format!("{container}:{path}")
}

impl Default for ChangeCache {
    fn default() -> Self {
        ChangeCache {
            inner: Mutex::new(HashMap::new()),
        }
    }
}

impl ChangeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set on open-for-write before the first write.
    pub fn set(&self, container: &str, path: &str, node: NodeRef) {
        self.inner.lock().unwrap().insert(key(container, path), node);
    }

    pub fn get(&self, container: &str, path: &str) -> Option<NodeRef> {
        self.inner.lock().unwrap().get(&key(container, path)).cloned()
    }

    /// Cleared on release.
    pub fn clear(&self, container: &str, path: &str) {
        self.inner.lock().unwrap().remove(&key(container, path));
    }
}
