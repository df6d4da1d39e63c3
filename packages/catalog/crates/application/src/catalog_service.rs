use crate::embeddings::EmbeddingPipeline;
use crate::error::{CatalogError, Result};
use crate::images::{self, JPEG_CONTENT_TYPE};
use crate::stats;
use domain::{
    rank, CatalogRepository, Embedding, EmbeddingKind, EmbeddingProvider, ImageRef, ImageStore,
    ListFilter, NewProduct, Product, ProductDraft, ProductId,
};
use domain::ports::catalog_repository::MAX_LIST_LIMIT;
use shared::dto::CatalogStats;
use std::sync::Arc;
use std::time::Duration;

pub const MAX_TOP_K: usize = 100;

/// A product together with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub product: Product,
    pub score: f32,
}

/// Product lifecycle and similarity search over the catalog ports.
#[derive(Clone)]
pub struct CatalogService {
    repo: Arc<dyn CatalogRepository>,
    embeddings: EmbeddingPipeline,
    images: Arc<dyn ImageStore>,
}

impl CatalogService {
    pub fn new(
        repo: Arc<dyn CatalogRepository>,
        provider: Arc<dyn EmbeddingProvider>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            repo,
            embeddings: EmbeddingPipeline::new(provider),
            images,
        }
    }

    pub fn embedding_provider(&self) -> &str {
        self.embeddings.provider_name()
    }

    /// Validates and stores a product, generating whatever embeddings the
    /// provider can deliver. Embedding and upload failures never fail the
    /// creation; an undecodable image does.
    pub async fn create_product(
        &self,
        new: NewProduct,
        image: Option<Vec<u8>>,
    ) -> Result<Product> {
        let new = new.normalized()?;

        let jpeg = match image {
            Some(bytes) => Some(images::to_jpeg_blocking(bytes).await?),
            None => None,
        };

        let image_ref = match &jpeg {
            Some(jpeg) => self.upload(jpeg.clone()).await,
            None => None,
        };

        let text_embedding = self.embeddings.text(&new.description).await;
        let multimodal_embedding = self
            .embeddings
            .multimodal(&new.description, jpeg.as_deref())
            .await;

        let draft = ProductDraft {
            product: new,
            image: image_ref.clone(),
            text_embedding,
            multimodal_embedding,
        };

        match self.repo.insert(draft).await {
            Ok(product) => {
                tracing::info!(
                    product_id = product.id,
                    text = product.text_embedding.is_some(),
                    multimodal = product.multimodal_embedding.is_some(),
                    "Created product"
                );
                Ok(product)
            }
            Err(e) => {
                if let Some(image) = image_ref {
                    self.remove_image(&image.key).await;
                }
                Err(CatalogError::Repository(e))
            }
        }
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Product> {
        self.repo
            .find(id)
            .await
            .map_err(CatalogError::Repository)?
            .ok_or(CatalogError::NotFound(id))
    }

    /// Products in id order. The limit is capped rather than rejected.
    pub async fn list_products(&self, mut filter: ListFilter) -> Result<Vec<Product>> {
        filter.limit = filter.limit.min(MAX_LIST_LIMIT);
        filter.category = filter
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        self.repo
            .list(&filter)
            .await
            .map_err(CatalogError::Repository)
    }

    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        let product = self.get_product(id).await?;
        if let Some(image) = &product.image {
            self.remove_image(&image.key).await;
        }

        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(CatalogError::Repository)?;
        if !deleted {
            return Err(CatalogError::NotFound(id));
        }
        tracing::info!(product_id = id, "Deleted product");
        Ok(())
    }

    /// Products closest to an existing one, which is never part of its own
    /// result. Falls back from multimodal to text when the product has no
    /// multimodal embedding.
    pub async fn search_similar(
        &self,
        product_id: ProductId,
        top_k: usize,
        use_multimodal: bool,
    ) -> Result<Vec<SearchResult>> {
        check_top_k(top_k)?;

        let preferred: &[EmbeddingKind] = if use_multimodal {
            &[EmbeddingKind::Multimodal, EmbeddingKind::Text]
        } else {
            &[EmbeddingKind::Text]
        };

        for &kind in preferred {
            let found = self
                .repo
                .embedding_for_product(product_id, kind)
                .await
                .map_err(CatalogError::Repository)?;
            if let Some(query) = found {
                tracing::debug!(product_id, kind = %kind, "Searching similar products");
                return self.rank_against(kind, &query, top_k, Some(product_id)).await;
            }
        }

        // Distinguish a missing product from one without embeddings.
        self.get_product(product_id).await?;
        Err(CatalogError::NoEmbeddingAvailable(product_id))
    }

    pub async fn search_text(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        check_top_k(top_k)?;
        let query = non_blank(query, "query")?;

        let embedding = self
            .embeddings
            .text(query)
            .await
            .ok_or(CatalogError::EmbeddingUnavailable(EmbeddingKind::Text))?;
        self.rank_against(EmbeddingKind::Text, &embedding, top_k, None)
            .await
    }

    pub async fn search_image(&self, image: Vec<u8>, top_k: usize) -> Result<Vec<SearchResult>> {
        check_top_k(top_k)?;
        let jpeg = images::to_jpeg_blocking(image).await?;

        let embedding = self
            .embeddings
            .clip_image(&jpeg)
            .await
            .ok_or(CatalogError::EmbeddingUnavailable(EmbeddingKind::Multimodal))?;
        self.rank_against(EmbeddingKind::Multimodal, &embedding, top_k, None)
            .await
    }

    pub async fn search_multimodal(
        &self,
        query: &str,
        image: Vec<u8>,
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        check_top_k(top_k)?;
        let query = non_blank(query, "query")?;
        let jpeg = images::to_jpeg_blocking(image).await?;

        let embedding = self
            .embeddings
            .multimodal(query, Some(&jpeg))
            .await
            .ok_or(CatalogError::EmbeddingUnavailable(EmbeddingKind::Multimodal))?;
        self.rank_against(EmbeddingKind::Multimodal, &embedding, top_k, None)
            .await
    }

    /// Raw bytes of a stored image.
    pub async fn image(&self, key: &str) -> Result<Vec<u8>> {
        self.images
            .get(key)
            .await
            .map_err(CatalogError::Storage)?
            .ok_or_else(|| CatalogError::ImageNotFound(key.to_string()))
    }

    /// Temporary URL for a product's image.
    pub async fn image_url(&self, id: ProductId, expires_in: Duration) -> Result<String> {
        let product = self.get_product(id).await?;
        let image = product
            .image
            .ok_or_else(|| CatalogError::ImageNotFound(format!("product {}", id)))?;
        self.images
            .presigned_url(&image.key, expires_in)
            .await
            .map_err(CatalogError::Storage)
    }

    pub async fn stats(&self) -> Result<CatalogStats> {
        let products = self
            .repo
            .list(&ListFilter::everything())
            .await
            .map_err(CatalogError::Repository)?;
        Ok(stats::summarize(&products))
    }

    pub async fn ping(&self) -> Result<()> {
        self.repo.ping().await.map_err(CatalogError::Repository)
    }

    async fn rank_against(
        &self,
        kind: EmbeddingKind,
        query: &Embedding,
        top_k: usize,
        exclude: Option<ProductId>,
    ) -> Result<Vec<SearchResult>> {
        let candidates = self
            .repo
            .embeddings_for_kind(kind, exclude)
            .await
            .map_err(CatalogError::Repository)?;

        let ranked = rank(query.as_slice(), &candidates, top_k)?;
        let ids: Vec<ProductId> = ranked.iter().map(|m| m.id).collect();
        let products = self
            .repo
            .materialize(&ids)
            .await
            .map_err(CatalogError::Repository)?;

        // materialize may skip ids deleted in the meantime
        let mut products = products.into_iter().peekable();
        let mut results = Vec::with_capacity(ranked.len());
        for m in ranked {
            if products.peek().is_some_and(|p| p.id == m.id) {
                if let Some(product) = products.next() {
                    results.push(SearchResult {
                        product,
                        score: m.score,
                    });
                }
            }
        }
        Ok(results)
    }

    async fn upload(&self, jpeg: Vec<u8>) -> Option<ImageRef> {
        let key = images::new_image_key();
        match self.images.put(&key, jpeg, JPEG_CONTENT_TYPE).await {
            Ok(url) => Some(ImageRef { url, key }),
            Err(e) => {
                tracing::warn!("Error uploading image {}: {:#}", key, e);
                None
            }
        }
    }

    async fn remove_image(&self, key: &str) {
        if let Err(e) = self.images.delete(key).await {
            tracing::warn!("Error deleting image {}: {:#}", key, e);
        }
    }
}

fn check_top_k(top_k: usize) -> Result<()> {
    if (1..=MAX_TOP_K).contains(&top_k) {
        Ok(())
    } else {
        Err(CatalogError::InvalidInput(format!(
            "top_k must be between 1 and {}",
            MAX_TOP_K
        )))
    }
}

fn non_blank<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(trimmed)
}
