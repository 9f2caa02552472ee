//! Tenant asset bucket lifecycle on top of an [`ObjectStore`] backend.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use storeforge_model::{Plan, naming};

use crate::error::{ProvisionError, Result};
use crate::ports::{BucketLifecycle, ObjectStore};
use crate::types::{BucketSpec, StorageBucketHandle};

/// Objects seeded into every new bucket so the folder structure exists.
const PLACEHOLDER_KEYS: &[&str] = &["public/.keep", "private/.keep"];

pub struct BucketManager {
    store: Arc<dyn ObjectStore>,
    region: String,
}

impl std::fmt::Debug for BucketManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketManager")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl BucketManager {
    pub fn new(store: Arc<dyn ObjectStore>, region: impl Into<String>) -> Self {
        Self {
            store,
            region: region.into(),
        }
    }
}

#[async_trait]
impl BucketLifecycle for BucketManager {
    async fn create(
        &self,
        subdomain: &str,
        plan: Plan,
    ) -> Result<StorageBucketHandle> {
        let name = naming::bucket_name(subdomain)?;

        if self.store.bucket_exists(&name).await? {
            return Err(ProvisionError::AlreadyExists(format!("bucket {name}")));
        }

        let mut tags = BTreeMap::new();
        tags.insert("plan".to_string(), plan.as_str().to_string());
        tags.insert("tenant".to_string(), subdomain.to_string());

        let spec = BucketSpec {
            name: name.clone(),
            region: self.region.clone(),
            // Advisory only; the storage layer does not enforce it.
            quota_bytes: plan.quota_bytes(),
            versioning_enabled: true,
            public_read_prefix: Some("public/".to_string()),
            tags,
        };
        self.store.create_bucket(&spec).await?;

        for key in PLACEHOLDER_KEYS {
            self.store.put_object(&name, key, b"").await?;
        }

        info!(bucket = %name, plan = %plan, "created tenant bucket");

        Ok(StorageBucketHandle {
            bucket_name: name,
            region: self.region.clone(),
            quota_bytes: plan.quota_bytes(),
            versioning_enabled: true,
        })
    }

    async fn delete(&self, subdomain: &str, force: bool) -> Result<bool> {
        let name = naming::bucket_name(subdomain)?;

        if !self.store.bucket_exists(&name).await? {
            debug!(bucket = %name, "delete requested for absent bucket");
            return Ok(false);
        }

        if !force {
            let objects = self.store.list_objects(&name).await?;
            if !objects.is_empty() {
                return Err(ProvisionError::NotEmpty(format!(
                    "bucket {name} holds {} object(s)",
                    objects.len()
                )));
            }
        }

        self.store.delete_bucket(&name).await?;
        info!(bucket = %name, forced = force, "deleted tenant bucket");
        Ok(true)
    }
}
