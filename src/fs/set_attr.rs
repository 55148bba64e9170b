//! `Setattr`: `size = 0` triggers the Truncate Engine. An mtime change,
//! when extended attrs are enabled, rewrites the mtime header instead —
//! through a manifest-preserving copy for segmented objects, a plain
//! POST otherwise. Any other size change is rejected rather than
//! faked, since there is no partial-overwrite primitive to honour it
//! with.

use crate::error::{Result, SwiftFsError};
use crate::fs::entry::FsContext;
use crate::node::{mtime_header_name, NodeRef};
use crate::storage::{Headers, MANIFEST_HEADER};
use crate::truncate;

pub async fn setattr_size(ctx: &FsContext, container: &str, node: &NodeRef, size: u64) -> Result<()> {
    if size != 0 {
        return Err(SwiftFsError::NotSupported("setattr to a non-zero size"));
    }
    truncate::truncate_to_zero(&ctx.pool, container, node).await
}

/// Rewrites the mtime header to `mtime` (Unix seconds). A no-op when
/// extended attrs are disabled in config — there is nowhere for a
/// client-chosen mtime to be surfaced back through `readdir`/`getattr`
/// otherwise, so the change is silently dropped rather than rejected.
pub async fn setattr_mtime(ctx: &FsContext, container: &str, node: &NodeRef, mtime: f64) -> Result<()> {
    if !ctx.config.readdir_extra_attributes {
        return Ok(());
    }

    let mut headers = Headers::new();
    headers.insert(mtime_header_name(ctx.config.hubic_times).to_string(), mtime.to_string());

    {
        let client = ctx.pool.borrow().await;
        match node.manifest_header() {
            Some(manifest_header) => {
                headers.insert(MANIFEST_HEADER.to_string(), manifest_header);
                client
                    .copy_object(container, &node.path, container, &node.path, headers.clone())
                    .await?;
            }
            None => {
                client.post_object(container, &node.path, headers.clone()).await?;
            }
        }
    }
    node.merge_headers(headers);
    Ok(())
}
