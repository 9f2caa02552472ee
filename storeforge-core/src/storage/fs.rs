//! Filesystem-backed object store.
//!
//! Buckets are directories under a configured root; bucket metadata
//! (region, quota, versioning, tags, policy) lives in a JSON sidecar inside
//! the bucket, excluded from object listings.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{ProvisionError, Result};
use crate::ports::ObjectStore;
use crate::types::BucketSpec;

const METADATA_FILE: &str = ".bucket.json";

/// Persisted sidecar describing a bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketMetadata {
    pub spec: BucketSpec,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn bucket_path(&self, bucket: &str) -> PathBuf {
        self.root.join(bucket)
    }

    /// Loads the metadata sidecar for an existing bucket.
    pub async fn metadata(&self, bucket: &str) -> Result<BucketMetadata> {
        let raw =
            fs::read(self.bucket_path(bucket).join(METADATA_FILE)).await?;
        serde_json::from_slice(&raw).map_err(|e| {
            ProvisionError::Failed(format!(
                "corrupt bucket metadata for {bucket}: {e}"
            ))
        })
    }

    async fn collect_keys(
        &self,
        dir: &Path,
        prefix: &str,
        keys: &mut Vec<String>,
    ) -> Result<()> {
        // Iterative walk; async recursion would need boxing.
        let mut pending = vec![(dir.to_path_buf(), prefix.to_string())];
        while let Some((current, rel)) = pending.pop() {
            let mut entries = fs::read_dir(&current).await?;
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name().to_string_lossy().into_owned();
                let key = if rel.is_empty() {
                    name.clone()
                } else {
                    format!("{rel}/{name}")
                };
                if entry.file_type().await?.is_dir() {
                    pending.push((entry.path(), key));
                } else if key != METADATA_FILE {
                    keys.push(key);
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        Ok(fs::try_exists(self.bucket_path(bucket)).await?)
    }

    async fn create_bucket(&self, spec: &BucketSpec) -> Result<()> {
        let path = self.bucket_path(&spec.name);
        fs::create_dir_all(&path).await?;

        let metadata = BucketMetadata {
            spec: spec.clone(),
            created_at: Utc::now(),
        };
        let raw = serde_json::to_vec_pretty(&metadata).map_err(|e| {
            ProvisionError::Failed(format!("encode bucket metadata: {e}"))
        })?;
        fs::write(path.join(METADATA_FILE), raw).await?;
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
    ) -> Result<()> {
        let path = self.bucket_path(bucket).join(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, bytes).await?;
        Ok(())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>> {
        let path = self.bucket_path(bucket);
        let mut keys = Vec::new();
        self.collect_keys(&path, "", &mut keys).await?;
        keys.sort();
        Ok(keys)
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        fs::remove_dir_all(self.bucket_path(bucket)).await?;
        Ok(())
    }
}
