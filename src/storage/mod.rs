//! Component A — Storage Client Facade.
//!
//! A thin contract over the HTTP object-store API: account, container and
//! object CRUD, ranged GET, streaming-ish PUT, copy and bulk delete. This
//! is external per the specification ("stubbed", 0% share); this module
//! only declares the trait and ships an in-memory test double so the rest
//! of the crate has something concrete to run tests against. A production
//! build plugs in a real Swift/hubiC HTTP client behind the same trait.

pub mod memory;

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

pub type Headers = BTreeMap<String, String>;

pub const DIRECTORY_CONTENT_TYPE: &str = "application/directory";
pub const LINK_CONTENT_TYPE: &str = "application/link";
pub const MANIFEST_HEADER: &str = "X-Object-Manifest";
pub const MTIME_HEADER: &str = "X-Object-Meta-Mtime";
pub const HUBIC_MTIME_HEADER: &str = "X-Object-Meta-Hubic-Mtime";
pub const SYMLINK_TARGET_HEADER: &str = "X-Object-Meta-Symlink-Target";
pub const XATTR_HEADER_PREFIX: &str = "X-Object-Meta-Xattr-";
pub const STORAGE_POLICY_HEADER: &str = "X-Storage-Policy";
pub const TIMESTAMP_HEADER: &str = "X-Timestamp";

/// Account-level metadata (§3 Account entity).
#[derive(Debug, Clone, Default)]
pub struct AccountInfo {
    pub bytes_used: u64,
    pub object_count: u64,
    pub container_count: u64,
    pub quota_bytes: Option<i64>,
    pub creation_time: Option<f64>,
}

/// A raw listing entry as the storage API would return it, before
/// classification (§4.D) turns it into a [`crate::node::Node`].
#[derive(Debug, Clone)]
pub struct ObjectStub {
    pub name: String,
    pub bytes: u64,
    pub content_type: String,
    pub last_modified: f64,
    pub headers: Headers,
    /// True when this entry was synthesized by the delimiter scan rather
    /// than backed by a real object (a Swift "subdir" listing entry).
    pub is_pseudo_dir: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ContainerInfo {
    pub name: String,
    pub bytes_used: u64,
    pub object_count: u64,
    pub storage_policy: Option<String>,
}

#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn account_info(&self) -> Result<AccountInfo>;

    async fn list_containers(&self) -> Result<Vec<ContainerInfo>>;

    /// Creates a container if it does not already exist. Idempotent.
    async fn ensure_container(&self, name: &str, storage_policy: Option<&str>) -> Result<()>;

    async fn container_info(&self, name: &str) -> Result<ContainerInfo>;

    /// Lists objects under `prefix` in `container`, scanned with the given
    /// delimiter (spec §4.D always uses `/`). `limit` caps the number of
    /// entries returned (used by `rmdir`'s emptiness check).
    async fn list_objects(
        &self,
        container: &str,
        prefix: &str,
        delimiter: Option<char>,
        limit: Option<usize>,
    ) -> Result<Vec<ObjectStub>>;

    async fn head_object(&self, container: &str, path: &str) -> Result<ObjectStub>;

    async fn get_object(
        &self,
        container: &str,
        path: &str,
        range: Option<(u64, u64)>,
    ) -> Result<Bytes>;

    async fn put_object(
        &self,
        container: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
        headers: Headers,
    ) -> Result<()>;

    /// Updates headers/content-type in place without rewriting the body
    /// (Swift POST semantics).
    async fn post_object(&self, container: &str, path: &str, headers: Headers) -> Result<()>;

    /// Server-side copy; used by rename (manifest), link, and
    /// setattr/xattr-driven manifest rewrites.
    async fn copy_object(
        &self,
        src_container: &str,
        src_path: &str,
        dst_container: &str,
        dst_path: &str,
        extra_headers: Headers,
    ) -> Result<()>;

    /// Server-side atomic rename within the same container, used for
    /// regular (non-manifest) objects so a rename never exposes a window
    /// where both the old and new name are visible (the copy+delete pair
    /// `rename` falls back to for manifests does have that window).
    async fn move_object(&self, container: &str, src_path: &str, dst_path: &str) -> Result<()>;

    async fn delete_object(&self, container: &str, path: &str) -> Result<()>;

    /// Best-effort bulk delete; the in-memory double and the real client
    /// may both just loop over `delete_object` serially — the contract is
    /// "all named objects removed or an error", not atomicity.
    async fn delete_objects(&self, container: &str, paths: &[String]) -> Result<()> {
        for p in paths {
            self.delete_object(container, p).await?;
        }
        Ok(())
    }
}
