//! Component F — Directory Cache.
//!
//! TTL + capacity + access-count cache keyed by `(container, path)`. The
//! cache is the single place the synthesized directory tree and its
//! invariants exist (§2); every other operation's correctness depends on
//! it being right.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::node::NodeRef;

struct CacheEntry {
    parent: NodeRef,
    children: HashMap<String, NodeRef>,
    caching: Instant,
    access_count: i64,
    temporary: bool,
}

struct Inner {
    entries: HashMap<String, CacheEntry>,
    node_count: i64,
}

pub struct DirectoryCache {
    ttl: Duration,
    /// `-1` means unlimited.
    max_entries: i64,
    /// `-1` means unlimited.
    max_access: i64,
    inner: Mutex<Inner>,
}

fn key(container: &str, path: &str) -> String {
    format!("{container}:{path}")
}

impl DirectoryCache {
    pub fn new(ttl: Duration, max_entries: i64, max_access: i64) -> Self {
        DirectoryCache {
            ttl,
            max_entries,
            max_access,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                node_count: 0,
            }),
        }
    }

    #[cfg(test)]
    pub fn node_count(&self) -> i64 {
        self.inner.lock().unwrap().node_count
    }

    /// Creates an entry for `(container, path)`. Marks it `temporary` when
    /// it would push `nodeCount` to or past `maxEntries`, or when
    /// `maxAccess == 0`; otherwise accounts `children.len()` into
    /// `nodeCount`.
    pub fn add_all(&self, container: &str, path: &str, parent: NodeRef, children: HashMap<String, NodeRef>) {
        let mut inner = self.inner.lock().unwrap();
        let k = key(container, path);
        if let Some(old) = inner.entries.remove(&k) {
            if !old.temporary {
                inner.node_count -= old.children.len() as i64;
            }
        }
        let incoming = children.len() as i64;
        let temporary = (self.max_entries >= 0 && inner.node_count + incoming >= self.max_entries)
            || self.max_access == 0;
        if !temporary {
            inner.node_count += incoming;
        }
        inner.entries.insert(
            k,
            CacheEntry {
                parent,
                children,
                caching: Instant::now(),
                access_count: 0,
                temporary,
            },
        );
    }

    /// Returns `(parent, children)` on a hit, incrementing access count.
    /// Expired entries are treated as a miss and scheduled for deletion;
    /// `temporary` entries or entries that just hit `maxAccess` are
    /// scheduled for deletion *after* the value is returned, so a
    /// concurrent `peek` never observes a half-deleted entry.
    pub fn get_all(&self, container: &str, path: &str) -> Option<(NodeRef, HashMap<String, NodeRef>)> {
        let k = key(container, path);
        let now = Instant::now();

        let (result, pending_delete) = {
            let mut inner = self.inner.lock().unwrap();
            match inner.entries.get_mut(&k) {
                None => return None,
                Some(entry) => {
                    if now.duration_since(entry.caching) > self.ttl {
                        (None, true)
                    } else {
                        entry.access_count += 1;
                        let result = (entry.parent.clone(), entry.children.clone());
                        let should_delete = entry.temporary
                            || (self.max_access >= 0 && entry.access_count == self.max_access);
                        (Some(result), should_delete)
                    }
                }
            }
        };

        if pending_delete {
            self.delete_all(container, path);
        }
        result
    }

    /// Returns the parent node without mutating access counters. `None`
    /// on a miss or an expired entry.
    pub fn peek(&self, container: &str, path: &str) -> Option<NodeRef> {
        let inner = self.inner.lock().unwrap();
        let entry = inner.entries.get(&key(container, path))?;
        if Instant::now().duration_since(entry.caching) > self.ttl {
            return None;
        }
        Some(entry.parent.clone())
    }

    /// Returns a single child node; never touches the entry's counters.
    pub fn get(&self, container: &str, path: &str, name: &str) -> Option<NodeRef> {
        let inner = self.inner.lock().unwrap();
        inner.entries.get(&key(container, path))?.children.get(name).cloned()
    }

    /// Inserts into an existing entry's children map; no-op if the entry
    /// is missing.
    pub fn set(&self, container: &str, path: &str, name: &str, node: NodeRef) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(entry) = inner.entries.get_mut(&key(container, path)) {
            entry.children.insert(name.to_string(), node);
        }
    }

    /// Removes a single child, leaving the entry itself in place.
    pub fn delete(&self, container: &str, path: &str, name: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(entry) = inner.entries.get_mut(&key(container, path)) {
            entry.children.remove(name);
        }
    }

    /// Removes the whole entry, decrementing `nodeCount` by the number of
    /// children it held if it was non-temporary.
    pub fn delete_all(&self, container: &str, path: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(entry) = inner.entries.remove(&key(container, path)) {
            if !entry.temporary {
                inner.node_count -= entry.children.len() as i64;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeKind};
    use std::collections::HashMap;

    fn child(name: &str) -> NodeRef {
        Node::new("c", format!("{name}/"), name, NodeKind::Directory)
    }

    #[test]
    fn add_all_then_get_all_round_trips_and_bumps_access_count() {
        let cache = DirectoryCache::new(Duration::from_secs(60), -1, -1);
        let parent = Node::root();
        let mut children = HashMap::new();
        children.insert("a".to_string(), child("a"));
        children.insert("b".to_string(), child("b"));
        cache.add_all("c", "", parent.clone(), children);

        let (got_parent, got_children) = cache.get_all("c", "").unwrap();
        assert!(std::sync::Arc::ptr_eq(&got_parent, &parent));
        assert_eq!(got_children.len(), 2);
        assert_eq!(cache.node_count(), 2);

        // second call: still present with unlimited maxAccess.
        let (_, got_children2) = cache.get_all("c", "").unwrap();
        assert_eq!(got_children2.len(), 2);
    }

    #[test]
    fn capacity_bounded_eviction_marks_overflow_temporary() {
        // Scenario 6 from spec §8: maxEntries = 10; 8 children at K1, then
        // 5 at K2. K1 stays (nodeCount=8); K2 is temporary (would push to
        // 13); after one getAll(K2), K2 is evicted.
        let cache = DirectoryCache::new(Duration::from_secs(60), 10, -1);
        let mut k1_children = HashMap::new();
        for i in 0..8 {
            k1_children.insert(format!("n{i}"), child(&format!("n{i}")));
        }
        cache.add_all("c", "k1", Node::root(), k1_children);
        assert_eq!(cache.node_count(), 8);

        let mut k2_children = HashMap::new();
        for i in 0..5 {
            k2_children.insert(format!("m{i}"), child(&format!("m{i}")));
        }
        cache.add_all("c", "k2", Node::root(), k2_children);
        // k2 was temporary, so nodeCount is unchanged.
        assert_eq!(cache.node_count(), 8);

        assert!(cache.get_all("c", "k2").is_some());
        assert!(cache.get_all("c", "k2").is_none());
        assert!(cache.get_all("c", "k1").is_some());
    }

    #[test]
    fn expired_entry_is_a_miss_and_is_removed() {
        let cache = DirectoryCache::new(Duration::from_millis(1), -1, -1);
        cache.add_all("c", "", Node::root(), HashMap::new());
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get_all("c", "").is_none());
        assert!(cache.peek("c", "").is_none());
    }

    #[test]
    fn set_and_delete_mutate_children_without_touching_counters() {
        let cache = DirectoryCache::new(Duration::from_secs(60), -1, -1);
        cache.add_all("c", "", Node::root(), HashMap::new());
        cache.set("c", "", "a", child("a"));
        assert!(cache.get("c", "", "a").is_some());
        cache.delete("c", "", "a");
        assert!(cache.get("c", "", "a").is_none());
    }
}
