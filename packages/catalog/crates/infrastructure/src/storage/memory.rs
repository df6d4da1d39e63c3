use anyhow::Result;
use async_trait::async_trait;
use domain::ImageStore;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// Process-local image store for tests and throwaway runs.
pub struct MemoryImageStore {
    base_url: String,
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryImageStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

impl Default for MemoryImageStore {
    fn default() -> Self {
        Self::new("memory://images")
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<String> {
        self.objects.write().await.insert(key.to_string(), bytes);
        Ok(format!("{}/{}", self.base_url, key))
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.objects.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn presigned_url(&self, key: &str, expires_in: Duration) -> Result<String> {
        Ok(format!(
            "{}/{}?expires={}",
            self.base_url,
            key,
            expires_in.as_secs()
        ))
    }
}
