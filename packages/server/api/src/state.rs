use crate::config::{AuthConfig, CatalogBackend, Config, EmbeddingConfig, ImageStoreConfig};
use crate::services::auth::{JwksVerifier, SecretVerifier, TokenVerifier};
use anyhow::{Context, Result};
use application::CatalogService;
use database::Database;
use domain::{CatalogRepository, EmbeddingProvider, ImageStore};
use infrastructure::{
    HttpEmbeddingProvider, LocalEmbedder, LocalImageStore, MemoryCatalogRepository,
    MemoryImageStore, S3ImageStore,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    /// `None` disables authentication.
    pub verifier: Option<Arc<dyn TokenVerifier>>,
}

impl AppState {
    pub fn new(catalog: CatalogService, verifier: Option<Arc<dyn TokenVerifier>>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            verifier,
        }
    }

    /// Connects every backing service named by the configuration.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let repo: Arc<dyn CatalogRepository> = match config.backend {
            CatalogBackend::Postgres => {
                let db = Database::connect(&config.database_url).await?;
                db.migrate().await?;
                tracing::info!("Connected to PostgreSQL");
                Arc::new(db.catalog())
            }
            CatalogBackend::Memory => {
                tracing::warn!("Using the in-memory catalog; products are lost on restart");
                Arc::new(MemoryCatalogRepository::new())
            }
        };

        let images: Arc<dyn ImageStore> = match &config.images {
            ImageStoreConfig::S3(s3) => Arc::new(S3ImageStore::new(s3.clone()).await?),
            ImageStoreConfig::Local { dir, base_url } => {
                Arc::new(LocalImageStore::new(dir.as_str(), base_url.as_str()).await?)
            }
            ImageStoreConfig::Memory => Arc::new(MemoryImageStore::default()),
        };

        let provider: Arc<dyn EmbeddingProvider> = match &config.embeddings {
            EmbeddingConfig::Http(http) => {
                tracing::info!("Embedding models served by {}", http.base_url);
                Arc::new(
                    HttpEmbeddingProvider::new(http.clone())
                        .context("Failed to set up the embedding client")?,
                )
            }
            EmbeddingConfig::Local => {
                tracing::warn!("Using local hashed embeddings; similarity is lexical only");
                Arc::new(LocalEmbedder::new())
            }
        };

        let verifier: Option<Arc<dyn TokenVerifier>> = match &config.auth {
            AuthConfig::Disabled => {
                tracing::warn!("AUTH0_DOMAIN not set, authentication is disabled");
                None
            }
            AuthConfig::Auth0 {
                domain,
                audience,
                algorithms,
            } => Some(Arc::new(JwksVerifier::for_auth0(
                domain,
                audience,
                algorithms.clone(),
            ))),
            AuthConfig::Secret { secret, audience } => {
                tracing::warn!("Verifying tokens with a shared secret");
                Some(Arc::new(SecretVerifier::new(secret, audience.as_deref())))
            }
        };

        Ok(Self::new(
            CatalogService::new(repo, provider, images),
            verifier,
        ))
    }
}
