//! `Write`: delegates to the Segmented Write Engine (§4.J), holding the
//! handle's own `write_state` lock for the duration of one call.

use crate::error::Result;
use crate::fs::entry::FsContext;
use crate::handle::Handle;
use crate::write_engine;

pub async fn write(ctx: &FsContext, handle: &Handle, data: &[u8]) -> Result<u32> {
    let mut state = handle.write_state.lock().unwrap();
    write_engine::write(
        &ctx.pool,
        &handle.container,
        &handle.node,
        &mut state,
        data,
        ctx.config.segment_size_bytes(),
        ctx.now_unix_seconds(),
    )
    .await?;
    Ok(data.len() as u32)
}
