use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use domain::EmbeddingProvider;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_TEXT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const DEFAULT_CLIP_MODEL: &str = "sentence-transformers/clip-ViT-B-32";

#[derive(Debug, Clone)]
pub struct HttpEmbeddingConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub text_model: String,
    pub clip_model: String,
    pub timeout: Duration,
}

impl Default for HttpEmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:7997".to_string(),
            api_key: None,
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            clip_model: DEFAULT_CLIP_MODEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
enum Modality {
    Text,
    Image,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<String>,
    modality: Modality,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Client for a model server speaking the OpenAI-style `/embeddings` API
/// with an extra `modality` field for CLIP image inputs.
pub struct HttpEmbeddingProvider {
    client: reqwest::Client,
    config: HttpEmbeddingConfig,
}

impl HttpEmbeddingProvider {
    pub fn new(config: HttpEmbeddingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build embedding HTTP client")?;
        Ok(Self { client, config })
    }

    async fn embed(&self, model: &str, modality: Modality, input: String) -> Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.config.base_url.trim_end_matches('/'));
        let body = EmbeddingRequest {
            model,
            input: vec![input],
            modality,
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Embedding request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("Embedding server returned {}: {}", status, text);
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .context("Malformed embedding response")?;

        parsed
            .data
            .into_iter()
            .find(|d| d.index == 0)
            .map(|d| d.embedding)
            .ok_or_else(|| anyhow!("Embedding response contained no vectors"))
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn text(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&self.config.text_model, Modality::Text, text.to_string())
            .await
    }

    async fn clip_text(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&self.config.clip_model, Modality::Text, text.to_string())
            .await
    }

    async fn clip_image(&self, jpeg: &[u8]) -> Result<Vec<f32>> {
        let data_uri = format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg));
        self.embed(&self.config.clip_model, Modality::Image, data_uri)
            .await
    }

    fn name(&self) -> &str {
        "http"
    }
}
