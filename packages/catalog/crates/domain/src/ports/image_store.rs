use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores `bytes` under `key` and returns the object's public URL.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;

    /// `None` when no object exists under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Temporary read access to a private object.
    async fn presigned_url(&self, key: &str, expires_in: Duration) -> Result<String>;
}
