use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use domain::embedding::{MULTIMODAL_DIMENSIONS, TEXT_DIMENSIONS};
use domain::EmbeddingProvider;
use image::GenericImageView;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

// Runs without a model server. Vectors are deterministic and have the right
// widths, but text similarity is lexical overlap only and the CLIP text and
// image spaces are unrelated. Meant for development and tests.

/// Feature-hashing embedder.
///
/// Text: lower-cased alphanumeric tokens hashed into signed buckets.
/// Images: an 8x8x8 RGB color histogram, which fills the 512 CLIP slots.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalEmbedder;

impl LocalEmbedder {
    pub fn new() -> Self {
        Self
    }

    fn hash_tokens(text: &str, dimensions: usize, salt: u64) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; dimensions];
        let mut tokens = 0usize;

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            let mut hasher = DefaultHasher::new();
            salt.hash(&mut hasher);
            token.hash(&mut hasher);
            let hash = hasher.finish();

            let index = (hash % dimensions as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[index] += sign;
            tokens += 1;
        }

        if tokens == 0 {
            bail!("text has no tokens to embed");
        }
        Ok(normalize(vector))
    }

    fn color_histogram(jpeg: &[u8]) -> Result<Vec<f32>> {
        let img = image::load_from_memory(jpeg).context("Failed to decode image")?;
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            bail!("image has no pixels");
        }

        let thumb = img.thumbnail(64, 64).to_rgb8();
        let mut histogram = vec![0.0f32; MULTIMODAL_DIMENSIONS];
        for pixel in thumb.pixels() {
            let [r, g, b] = pixel.0;
            let bin = (((r as usize) >> 5) << 6) | (((g as usize) >> 5) << 3) | ((b as usize) >> 5);
            histogram[bin] += 1.0;
        }
        Ok(normalize(histogram))
    }
}

fn normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    v
}

#[async_trait]
impl EmbeddingProvider for LocalEmbedder {
    async fn text(&self, text: &str) -> Result<Vec<f32>> {
        Self::hash_tokens(text, TEXT_DIMENSIONS, 0)
    }

    async fn clip_text(&self, text: &str) -> Result<Vec<f32>> {
        Self::hash_tokens(text, MULTIMODAL_DIMENSIONS, 1)
    }

    async fn clip_image(&self, jpeg: &[u8]) -> Result<Vec<f32>> {
        let bytes = jpeg.to_vec();
        tokio::task::spawn_blocking(move || Self::color_histogram(&bytes))
            .await
            .context("Image embedding task panicked")?
    }

    fn name(&self) -> &str {
        "local"
    }
}
