//! Component E — Node Model.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::storage::{Headers, HUBIC_MTIME_HEADER, MTIME_HEADER};

pub type NodeRef = Arc<Node>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Container { storage_policy: Option<String> },
    Directory,
    /// `manifest_header` carries the raw, not-yet-validated
    /// `X-Object-Manifest` header value when present. Whether it actually
    /// matches this container's segment container is decided at the
    /// use-site (unlink, read, truncate), not at classification time —
    /// see §4.I's unlink contract and the boundary behaviour in §8.
    Object { manifest_header: Option<String> },
    Symlink { target: String },
}

/// The FUSE-facing attribute projection of a node (§4.E).
#[derive(Debug, Clone, Copy)]
pub struct NodeAttr {
    pub size: u64,
    pub uid: u32,
    pub gid: u32,
    pub mode: u32,
    pub mtime: f64,
    pub ctime: f64,
    pub crtime: f64,
    pub is_dir: bool,
    pub is_symlink: bool,
}

/// In-memory projection of a storage entity. Variants: Root, Container,
/// Directory, Object, Symlink (§3). Owned by its Directory Cache entry;
/// passed by `Arc` to in-flight handles.
pub struct Node {
    /// Empty for `Root`.
    pub container: String,
    /// Storage path within `container`; empty for `Root`/`Container`.
    /// Directories carry a trailing `/`.
    pub path: String,
    pub name: String,
    pub kind: RwLock<NodeKind>,
    size: AtomicU64,
    headers: RwLock<Headers>,
    last_modified: RwLock<f64>,
    /// Per-object mutex (§5): acquired by open-for-write, released by
    /// release-of-write; also taken by setattr on a writing object to
    /// serialize header updates. Only meaningful for `Object` nodes, but
    /// harmless to carry on every variant. `Arc`-wrapped so a held guard
    /// can outlive the `open()` call that acquired it (an owned guard),
    /// living on the `Handle` until `release()` drops it.
    pub write_lock: Arc<tokio::sync::Mutex<()>>,
}

impl Node {
    pub fn new(container: impl Into<String>, path: impl Into<String>, name: impl Into<String>, kind: NodeKind) -> NodeRef {
        Arc::new(Node {
            container: container.into(),
            path: path.into(),
            name: name.into(),
            kind: RwLock::new(kind),
            size: AtomicU64::new(0),
            headers: RwLock::new(Headers::new()),
            last_modified: RwLock::new(0.0),
            write_lock: Arc::new(tokio::sync::Mutex::new(())),
        })
    }

    pub fn root() -> NodeRef {
        Node::new("", "", "", NodeKind::Root)
    }

    pub fn size(&self) -> u64 {
        self.size.load(Ordering::Acquire)
    }

    pub fn set_size(&self, size: u64) {
        self.size.store(size, Ordering::Release);
    }

    pub fn headers(&self) -> Headers {
        self.headers.read().unwrap().clone()
    }

    pub fn set_headers(&self, headers: Headers) {
        *self.headers.write().unwrap() = headers;
    }

    pub fn merge_headers(&self, extra: Headers) {
        self.headers.write().unwrap().extend(extra);
    }

    pub fn last_modified(&self) -> f64 {
        *self.last_modified.read().unwrap()
    }

    pub fn set_last_modified(&self, ts: f64) {
        *self.last_modified.write().unwrap() = ts;
    }

    pub fn kind(&self) -> NodeKind {
        self.kind.read().unwrap().clone()
    }

    pub fn set_kind(&self, kind: NodeKind) {
        *self.kind.write().unwrap() = kind;
    }

    pub fn is_directory_like(&self) -> bool {
        matches!(self.kind(), NodeKind::Root | NodeKind::Container { .. } | NodeKind::Directory)
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self.kind(), NodeKind::Symlink { .. })
    }

    /// The raw (not-yet-validated) manifest header, if this object
    /// carries one.
    pub fn manifest_header(&self) -> Option<String> {
        match self.kind() {
            NodeKind::Object { manifest_header } => manifest_header,
            _ => None,
        }
    }

    /// Mtime priority (§4.E): hubiC-mtime header (if enabled) → standard
    /// mtime header → object last-modified → mount time.
    pub fn effective_mtime(&self, hubic_times: bool, mount_time: f64) -> f64 {
        let headers = self.headers.read().unwrap();
        if hubic_times {
            if let Some(v) = headers.get(HUBIC_MTIME_HEADER).and_then(|s| s.parse::<f64>().ok()) {
                return v;
            }
        }
        if let Some(v) = headers.get(MTIME_HEADER).and_then(|s| s.parse::<f64>().ok()) {
            return v;
        }
        let lm = *self.last_modified.read().unwrap();
        if lm > 0.0 {
            return lm;
        }
        mount_time
    }

    pub fn attr(&self, ctx: &AttrDefaults) -> NodeAttr {
        let is_dir = self.is_directory_like();
        let is_symlink = self.is_symlink();
        let mode = if is_dir {
            0o040000 | ctx.default_mode
        } else if is_symlink {
            0o120000 | 0o777
        } else {
            0o100000 | ctx.default_mode
        };
        let mtime = self.effective_mtime(ctx.hubic_times, ctx.mount_time);
        NodeAttr {
            size: self.size(),
            uid: ctx.default_uid,
            gid: ctx.default_gid,
            mode,
            mtime,
            ctime: mtime,
            crtime: ctx.mount_time,
            is_dir,
            is_symlink,
        }
    }

    /// Full storage path as used in listing/HEAD calls against `container`.
    pub fn full_path(&self) -> &str {
        &self.path
    }
}

/// Which mtime header a write should target, per §4.E's priority order:
/// the hubiC variant when hubiC-style timestamps are in use, the
/// standard one otherwise.
pub fn mtime_header_name(hubic_times: bool) -> &'static str {
    if hubic_times {
        HUBIC_MTIME_HEADER
    } else {
        MTIME_HEADER
    }
}

/// Process-wide attribute defaults (§4.E), passed explicitly rather than
/// read from ambient global state (§9 Design Notes).
#[derive(Debug, Clone, Copy)]
pub struct AttrDefaults {
    pub default_uid: u32,
    pub default_gid: u32,
    pub default_mode: u32,
    pub block_size: u32,
    pub hubic_times: bool,
    pub mount_time: f64,
}
