//! `Rmdir`: verifies emptiness (unless `SKIP_RMDIR`), then unconditionally
//! deletes the directory marker and both the directory's own cache entry
//! and its entry in the parent.

use crate::config::transfer_mode;
use crate::error::{Result, SwiftFsError};
use crate::fs::entry::FsContext;
use crate::fs::lookup::lookup;
use crate::node::NodeRef;

pub async fn rmdir(ctx: &FsContext, container: &str, dir: &NodeRef, name: &str) -> Result<()> {
    let target = lookup(ctx, container, dir, name).await?;
    if !target.is_directory_like() {
        return Err(SwiftFsError::NotSupported("rmdir target is not a directory"));
    }

    if ctx.config.transfer_mode & transfer_mode::SKIP_RMDIR == 0 {
        let entries = {
            let client = ctx.pool.borrow().await;
            client.list_objects(container, &target.path, Some('/'), Some(2)).await?
        };
        // The marker object itself is excluded by classify_listing's rule
        // for the parent prefix; any survivor means the directory is non-empty.
        let classified = crate::naming::classify_listing(&entries, &target.path);
        if !classified.is_empty() {
            return Err(SwiftFsError::NotEmpty(target.path.clone()));
        }
    }

    {
        let client = ctx.pool.borrow().await;
        client.delete_object(container, &target.path).await?;
    }

    ctx.directory_cache.delete_all(container, &target.path);
    ctx.directory_cache.delete(container, &dir.path, name);
    Ok(())
}
