//! Component C — Connection Pool.
//!
//! A bounded semaphore guarding a free-list of shared storage-client
//! instances. Acquisition order (§5 Deadlock avoidance) is always:
//! semaphore permit first, then pop a client off the free-list — a pool
//! borrow never blocks while holding a cache mutex.

use std::sync::Arc;

use crossbeam_queue::ArrayQueue;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::storage::StorageClient;

pub struct ConnectionPool {
    semaphore: Arc<Semaphore>,
    free: ArrayQueue<Arc<dyn StorageClient>>,
}

impl ConnectionPool {
    /// `clients` are `capacity` shared handles to the backing storage
    /// client; they may all point at the same underlying connection-pool
    /// inside a real HTTP client, or be genuinely distinct connections —
    /// either way this type only enforces the borrow/return discipline
    /// and the bound on concurrent borrowers.
    pub fn new(clients: Vec<Arc<dyn StorageClient>>) -> Self {
        let capacity = clients.len().max(1);
        let free = ArrayQueue::new(capacity);
        for c in clients {
            let _ = free.push(c);
        }
        ConnectionPool {
            semaphore: Arc::new(Semaphore::new(capacity)),
            free,
        }
    }

    pub async fn borrow(&self) -> PooledClient<'_> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("connection pool semaphore should never be closed");
        // A permit was acquired, so the free-list is guaranteed to have a
        // client waiting (every permit corresponds to exactly one client
        // pushed at construction or returned on drop).
        let client = self.free.pop().expect("permit acquired but free-list empty");
        PooledClient {
            client: Some(client),
            pool: self,
            _permit: permit,
        }
    }
}

pub struct PooledClient<'a> {
    client: Option<Arc<dyn StorageClient>>,
    pool: &'a ConnectionPool,
    _permit: OwnedSemaphorePermit,
}

impl<'a> std::ops::Deref for PooledClient<'a> {
    type Target = dyn StorageClient;

    fn deref(&self) -> &Self::Target {
        self.client.as_deref().expect("client taken before drop")
    }
}

impl<'a> Drop for PooledClient<'a> {
    fn drop(&mut self) {
        if let Some(c) = self.client.take() {
            let _ = self.pool.free.push(c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorageClient;

    #[tokio::test]
    async fn borrow_returns_client_on_drop() {
        let client: Arc<dyn StorageClient> = Arc::new(MemoryStorageClient::new());
        let pool = ConnectionPool::new(vec![client]);
        {
            let borrowed = pool.borrow().await;
            borrowed.ensure_container("c", None).await.unwrap();
        }
        // Second borrow must succeed promptly; proves the first was returned.
        let borrowed2 = pool.borrow().await;
        assert!(borrowed2.container_info("c").await.is_ok());
    }

    #[tokio::test]
    async fn capacity_bounds_concurrent_borrowers() {
        let client: Arc<dyn StorageClient> = Arc::new(MemoryStorageClient::new());
        let pool = Arc::new(ConnectionPool::new(vec![client]));
        let first = pool.borrow().await;
        let pool2 = pool.clone();
        let attempt = tokio::time::timeout(std::time::Duration::from_millis(50), pool2.borrow()).await;
        assert!(attempt.is_err(), "second borrow should block while capacity is 1");
        drop(first);
    }
}
