//! In-memory [`StorageClient`] test double. Used by the crate's own test
//! suite; Component A is external per the specification, so no real HTTP
//! client lives in this crate.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::{AccountInfo, ContainerInfo, Headers, ObjectStub, StorageClient};
use crate::error::{Result, SwiftFsError};

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Bytes,
    content_type: String,
    headers: Headers,
    last_modified: f64,
}

#[derive(Default)]
struct ContainerState {
    storage_policy: Option<String>,
    objects: BTreeMap<String, StoredObject>,
}

pub struct MemoryStorageClient {
    clock: Mutex<f64>,
    containers: Mutex<BTreeMap<String, ContainerState>>,
}

impl Default for MemoryStorageClient {
    fn default() -> Self {
        MemoryStorageClient {
            clock: Mutex::new(1_700_000_000.0),
            containers: Mutex::new(BTreeMap::new()),
        }
    }
}

impl MemoryStorageClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic fake wall clock so tests are deterministic; each call
    /// advances by one second.
    fn tick(&self) -> f64 {
        let mut c = self.clock.lock().unwrap();
        *c += 1.0;
        *c
    }
}

#[async_trait]
impl StorageClient for MemoryStorageClient {
    async fn account_info(&self) -> Result<AccountInfo> {
        let containers = self.containers.lock().unwrap();
        let mut bytes_used = 0u64;
        let mut object_count = 0u64;
        for c in containers.values() {
            object_count += c.objects.len() as u64;
            bytes_used += c.objects.values().map(|o| o.bytes.len() as u64).sum::<u64>();
        }
        Ok(AccountInfo {
            bytes_used,
            object_count,
            container_count: containers.len() as u64,
            quota_bytes: None,
            creation_time: Some(1_700_000_000.0),
        })
    }

    async fn list_containers(&self) -> Result<Vec<ContainerInfo>> {
        let containers = self.containers.lock().unwrap();
        Ok(containers
            .iter()
            .map(|(name, c)| ContainerInfo {
                name: name.clone(),
                bytes_used: c.objects.values().map(|o| o.bytes.len() as u64).sum(),
                object_count: c.objects.len() as u64,
                storage_policy: c.storage_policy.clone(),
            })
            .collect())
    }

    async fn ensure_container(&self, name: &str, storage_policy: Option<&str>) -> Result<()> {
        let mut containers = self.containers.lock().unwrap();
        containers.entry(name.to_string()).or_insert_with(|| ContainerState {
            storage_policy: storage_policy.map(|s| s.to_string()),
            objects: BTreeMap::new(),
        });
        Ok(())
    }

    async fn container_info(&self, name: &str) -> Result<ContainerInfo> {
        let containers = self.containers.lock().unwrap();
        let c = containers
            .get(name)
            .ok_or_else(|| SwiftFsError::not_found(name.to_string()))?;
        Ok(ContainerInfo {
            name: name.to_string(),
            bytes_used: c.objects.values().map(|o| o.bytes.len() as u64).sum(),
            object_count: c.objects.len() as u64,
            storage_policy: c.storage_policy.clone(),
        })
    }

    async fn list_objects(
        &self,
        container: &str,
        prefix: &str,
        delimiter: Option<char>,
        limit: Option<usize>,
    ) -> Result<Vec<ObjectStub>> {
        let containers = self.containers.lock().unwrap();
        let c = match containers.get(container) {
            Some(c) => c,
            None => return Ok(Vec::new()),
        };

        let mut out: Vec<ObjectStub> = Vec::new();
        let mut seen_subdirs = std::collections::BTreeSet::new();

        for (name, obj) in c.objects.range(prefix.to_string()..) {
            if !name.starts_with(prefix) {
                break;
            }
            let rest = &name[prefix.len()..];
            if rest.is_empty() {
                continue;
            }
            if let Some(delim) = delimiter {
                if let Some(pos) = rest.find(delim) {
                    let subdir = &rest[..=pos];
                    if seen_subdirs.insert(subdir.to_string()) {
                        out.push(ObjectStub {
                            name: format!("{prefix}{subdir}"),
                            bytes: 0,
                            content_type: String::new(),
                            last_modified: 0.0,
                            headers: Headers::new(),
                            is_pseudo_dir: true,
                        });
                    }
                    continue;
                }
            }
            out.push(ObjectStub {
                name: name.clone(),
                bytes: obj.bytes.len() as u64,
                content_type: obj.content_type.clone(),
                last_modified: obj.last_modified,
                headers: obj.headers.clone(),
                is_pseudo_dir: false,
            });
            if let Some(l) = limit {
                if out.len() >= l {
                    break;
                }
            }
        }

        Ok(out)
    }

    async fn head_object(&self, container: &str, path: &str) -> Result<ObjectStub> {
        let containers = self.containers.lock().unwrap();
        let c = containers
            .get(container)
            .ok_or_else(|| SwiftFsError::not_found(container.to_string()))?;
        let obj = c
            .objects
            .get(path)
            .ok_or_else(|| SwiftFsError::not_found(format!("{container}/{path}")))?;
        Ok(ObjectStub {
            name: path.to_string(),
            bytes: obj.bytes.len() as u64,
            content_type: obj.content_type.clone(),
            last_modified: obj.last_modified,
            headers: obj.headers.clone(),
            is_pseudo_dir: false,
        })
    }

    async fn get_object(
        &self,
        container: &str,
        path: &str,
        range: Option<(u64, u64)>,
    ) -> Result<Bytes> {
        let containers = self.containers.lock().unwrap();
        let c = containers
            .get(container)
            .ok_or_else(|| SwiftFsError::not_found(container.to_string()))?;
        let obj = c
            .objects
            .get(path)
            .ok_or_else(|| SwiftFsError::not_found(format!("{container}/{path}")))?;
        match range {
            None => Ok(obj.bytes.clone()),
            Some((start, end)) => {
                let start = start.min(obj.bytes.len() as u64) as usize;
                let end = end.min(obj.bytes.len() as u64) as usize;
                Ok(obj.bytes.slice(start..end.max(start)))
            }
        }
    }

    async fn put_object(
        &self,
        container: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
        headers: Headers,
    ) -> Result<()> {
        let now = self.tick();
        let mut containers = self.containers.lock().unwrap();
        let c = containers
            .get_mut(container)
            .ok_or_else(|| SwiftFsError::not_found(container.to_string()))?;
        c.objects.insert(
            path.to_string(),
            StoredObject {
                bytes: data,
                content_type: content_type.to_string(),
                headers,
                last_modified: now,
            },
        );
        Ok(())
    }

    async fn post_object(&self, container: &str, path: &str, headers: Headers) -> Result<()> {
        let mut containers = self.containers.lock().unwrap();
        let c = containers
            .get_mut(container)
            .ok_or_else(|| SwiftFsError::not_found(container.to_string()))?;
        let obj = c
            .objects
            .get_mut(path)
            .ok_or_else(|| SwiftFsError::not_found(format!("{container}/{path}")))?;
        obj.headers.extend(headers);
        Ok(())
    }

    async fn copy_object(
        &self,
        src_container: &str,
        src_path: &str,
        dst_container: &str,
        dst_path: &str,
        extra_headers: Headers,
    ) -> Result<()> {
        let now = self.tick();
        let mut containers = self.containers.lock().unwrap();
        let src = {
            let c = containers
                .get(src_container)
                .ok_or_else(|| SwiftFsError::not_found(src_container.to_string()))?;
            c.objects
                .get(src_path)
                .ok_or_else(|| SwiftFsError::not_found(format!("{src_container}/{src_path}")))?
                .clone()
        };
        let dst = containers
            .get_mut(dst_container)
            .ok_or_else(|| SwiftFsError::not_found(dst_container.to_string()))?;
        let mut headers = src.headers.clone();
        headers.extend(extra_headers);
        dst.objects.insert(
            dst_path.to_string(),
            StoredObject {
                bytes: src.bytes,
                content_type: src.content_type,
                headers,
                last_modified: now,
            },
        );
        Ok(())
    }

    async fn move_object(&self, container: &str, src_path: &str, dst_path: &str) -> Result<()> {
        let mut containers = self.containers.lock().unwrap();
        let c = containers
            .get_mut(container)
            .ok_or_else(|| SwiftFsError::not_found(container.to_string()))?;
        let obj = c
            .objects
            .remove(src_path)
            .ok_or_else(|| SwiftFsError::not_found(format!("{container}/{src_path}")))?;
        c.objects.insert(dst_path.to_string(), obj);
        Ok(())
    }

    async fn delete_object(&self, container: &str, path: &str) -> Result<()> {
        let mut containers = self.containers.lock().unwrap();
        let c = containers
            .get_mut(container)
            .ok_or_else(|| SwiftFsError::not_found(container.to_string()))?;
        c.objects
            .remove(path)
            .ok_or_else(|| SwiftFsError::not_found(format!("{container}/{path}")))?;
        Ok(())
    }
}
