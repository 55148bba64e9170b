//! `Release`: for a write handle, stamps the write commit's mtime
//! header before clearing the Change Cache entry; removing the handle
//! from the table drops its owned write-mutex guard via `Handle`'s own
//! `Drop`, which is what actually releases the per-object mutex.

use crate::error::Result;
use crate::fs::entry::FsContext;
use crate::handle::HandleMode;
use crate::node::mtime_header_name;
use crate::storage::{Headers, MANIFEST_HEADER};

pub async fn release(ctx: &FsContext, handle_id: u64) -> Result<()> {
    let handle = match ctx.handles.remove(handle_id) {
        Some(handle) => handle,
        None => return Ok(()),
    };

    if handle.mode == HandleMode::Write {
        let mut headers = Headers::new();
        headers.insert(
            mtime_header_name(ctx.config.hubic_times).to_string(),
            ctx.now_unix_seconds().to_string(),
        );

        {
            let client = ctx.pool.borrow().await;
            match handle.node.manifest_header() {
                Some(manifest_header) => {
                    headers.insert(MANIFEST_HEADER.to_string(), manifest_header);
                    client
                        .copy_object(&handle.container, &handle.node.path, &handle.container, &handle.node.path, headers.clone())
                        .await?;
                }
                None => {
                    client.post_object(&handle.container, &handle.node.path, headers.clone()).await?;
                }
            }
        }
        handle.node.merge_headers(headers);
        ctx.change_cache.clear(&handle.container, &handle.node.path);
    }
    Ok(())
}
