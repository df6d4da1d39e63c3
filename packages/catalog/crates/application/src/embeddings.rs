use domain::{Embedding, EmbeddingKind, EmbeddingProvider};
use std::sync::Arc;

/// Wraps an [`EmbeddingProvider`] with the catalog's failure policy: any
/// provider error or wrongly sized vector becomes an absent embedding.
#[derive(Clone)]
pub struct EmbeddingPipeline {
    provider: Arc<dyn EmbeddingProvider>,
}

impl EmbeddingPipeline {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn text(&self, text: &str) -> Option<Embedding> {
        let result = self.provider.text(text).await;
        self.validated(EmbeddingKind::Text, "text", result)
    }

    pub async fn clip_text(&self, text: &str) -> Option<Embedding> {
        let result = self.provider.clip_text(text).await;
        self.validated(EmbeddingKind::Multimodal, "clip text", result)
    }

    pub async fn clip_image(&self, jpeg: &[u8]) -> Option<Embedding> {
        let result = self.provider.clip_image(jpeg).await;
        self.validated(EmbeddingKind::Multimodal, "clip image", result)
    }

    /// Joint image/text embedding.
    ///
    /// With an image, the CLIP text and image vectors are averaged. Without
    /// one (or when the image side fails) the CLIP text vector stands alone;
    /// when only the text side fails the image vector is used.
    pub async fn multimodal(&self, text: &str, jpeg: Option<&[u8]>) -> Option<Embedding> {
        let text_part = self.clip_text(text).await;
        let Some(jpeg) = jpeg else {
            return text_part;
        };
        let image_part = self.clip_image(jpeg).await;

        match (text_part, image_part) {
            (Some(t), Some(i)) => match t.average(&i) {
                Ok(combined) => Some(combined),
                Err(e) => {
                    tracing::warn!("Failed to combine clip embeddings: {}", e);
                    Some(t)
                }
            },
            (Some(t), None) => Some(t),
            (None, Some(i)) => Some(i),
            (None, None) => None,
        }
    }

    fn validated(
        &self,
        kind: EmbeddingKind,
        what: &str,
        result: anyhow::Result<Vec<f32>>,
    ) -> Option<Embedding> {
        match result {
            Ok(values) => match Embedding::for_kind(kind, values) {
                Ok(embedding) => Some(embedding),
                Err(e) => {
                    tracing::warn!(
                        provider = self.provider.name(),
                        "Discarding {} embedding: {}",
                        what,
                        e
                    );
                    None
                }
            },
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    "Error generating {} embedding: {:#}",
                    what,
                    e
                );
                None
            }
        }
    }
}
