use anyhow::Result;
use async_trait::async_trait;

/// Pre-trained embedding models, consumed rather than implemented.
///
/// Providers return raw vectors; width validation is the caller's job.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Sentence embedding from the text-only model.
    async fn text(&self, text: &str) -> Result<Vec<f32>>;

    /// Text projected into the joint image/text space.
    async fn clip_text(&self, text: &str) -> Result<Vec<f32>>;

    /// Image projected into the joint image/text space. `jpeg` is an encoded
    /// JPEG image.
    async fn clip_image(&self, jpeg: &[u8]) -> Result<Vec<f32>>;

    fn name(&self) -> &str;
}
