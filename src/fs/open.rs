//! Open / Read / Write / Release form one operation family: a write
//! handle holds the per-object mutex (§5) and a `ChangeCache` entry for
//! its entire lifetime, both released together in `release`.

use std::sync::Arc;

use crate::config::transfer_mode;
use crate::error::{Result, SwiftFsError};
use crate::fs::entry::FsContext;
use crate::handle::{Handle, HandleMode};
use crate::node::NodeRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenFlags {
    Read,
    Write,
    Append,
    ReadWrite,
}

/// `Open`: read opens are handed out freely (subject to
/// `SKIP_OPEN_READ`, which refuses them outright). Write opens acquire
/// the node's owned mutex guard before anything else, then register the
/// node in the Change Cache so a concurrent readdir sees it — mutex
/// first, then Change Cache, per the deadlock-avoidance ordering.
pub async fn open(ctx: &FsContext, container: &str, node: &NodeRef, flags: OpenFlags) -> Result<Arc<Handle>> {
    match flags {
        OpenFlags::Append => Err(SwiftFsError::NotSupported("append mode")),
        OpenFlags::ReadWrite => Err(SwiftFsError::NotSupported("read-write open")),
        OpenFlags::Read => {
            if ctx.config.transfer_mode & transfer_mode::SKIP_OPEN_READ != 0 {
                return Err(SwiftFsError::NotSupported("open for read disabled by transfer-mode"));
            }
            Ok(ctx.handles.insert(|id| Handle::new_read(id, container, node.clone())))
        }
        OpenFlags::Write => {
            let write_guard = node.write_lock.clone().lock_owned().await;
            ctx.change_cache.set(container, &node.path, node.clone());
            let container = container.to_string();
            let node2 = node.clone();
            Ok(ctx
                .handles
                .insert(move |id| Handle::new_write(id, container, node2, false, write_guard)))
        }
    }
}

pub fn handle_mode(handle: &Handle) -> HandleMode {
    handle.mode
}
