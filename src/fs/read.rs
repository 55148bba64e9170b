//! `Read`: ranged GET against the handle's object. Manifests are read
//! transparently by the storage client (the `StorageClient` facade is
//! responsible for concatenating segments on a ranged GET against the
//! manifest path); this module only forwards the call.

use bytes::Bytes;

use crate::error::Result;
use crate::handle::Handle;
use crate::pool::ConnectionPool;

pub async fn read(pool: &ConnectionPool, handle: &Handle, offset: u64, size: u32) -> Result<Bytes> {
    let client = pool.borrow().await;
    client
        .get_object(&handle.container, &handle.node.path, Some((offset, offset + size as u64)))
        .await
}
