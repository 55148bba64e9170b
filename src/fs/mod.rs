//! Component I — VFS Operations, plus the Component L entry point.
//!
//! Each operation lives in its own module, grounded in the
//! `fuse3::path::PathFilesystem` callback it backs; `fuse_adapter`
//! translates FUSE's `Option<&OsStr>` path arguments into the
//! `(container, NodeRef)` pairs these functions expect.

pub mod create;
pub mod entry;
pub mod get_attr;
pub mod link;
pub mod lookup;
pub mod mk_dir;
pub mod open;
pub mod read;
pub mod readdir;
pub mod release;
pub mod remove;
pub mod rename;
pub mod rm_dir;
pub mod set_attr;
pub mod symlink;
pub mod write;
pub mod xattr;

pub use entry::{init, root, statfs, FsContext, FsStat};

use crate::error::Result;
use crate::node::{NodeKind, NodeRef};

fn path_components(path: &str) -> Vec<&str> {
    path.trim_start_matches('/').split('/').filter(|p| !p.is_empty()).collect()
}

/// Resolves a full FUSE path to its container name and node, walking
/// `lookup` one component at a time from the mount's root. When a
/// container is pinned (§4.L `Root`), the mount root already *is* that
/// container and every path component is an object-path segment;
/// otherwise the first component names the container to descend into.
pub async fn resolve(ctx: &FsContext, path: &str) -> Result<(String, NodeRef)> {
    let root = entry::root(ctx);
    let components = path_components(path);

    match root.kind() {
        NodeKind::Container { .. } => {
            let container = root.name.clone();
            let mut current = root;
            for component in components {
                current = lookup::lookup(ctx, &container, &current, component).await?;
            }
            Ok((container, current))
        }
        _ => {
            if components.is_empty() {
                return Ok((String::new(), root));
            }
            let container = components[0];
            let mut current = lookup::lookup(ctx, "", &root, container).await?;
            for component in &components[1..] {
                current = lookup::lookup(ctx, container, &current, component).await?;
            }
            Ok((container.to_string(), current))
        }
    }
}
