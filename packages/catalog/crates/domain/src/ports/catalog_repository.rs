use crate::embedding::{Embedding, EmbeddingKind};
use crate::entities::product::{Product, ProductDraft, ProductId};
use anyhow::Result;
use async_trait::async_trait;

pub const DEFAULT_LIST_LIMIT: usize = 100;
pub const MAX_LIST_LIMIT: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    pub skip: usize,
    pub limit: usize,
    pub category: Option<String>,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIST_LIMIT,
            category: None,
        }
    }
}

impl ListFilter {
    /// Every product, no paging.
    pub fn everything() -> Self {
        Self {
            skip: 0,
            limit: usize::MAX,
            category: None,
        }
    }
}

/// Persistence for products and the embeddings they own.
///
/// Implementations return products ordered by ascending id wherever a
/// sequence is returned, except `materialize`, which follows its input.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn insert(&self, draft: ProductDraft) -> Result<Product>;

    async fn find(&self, id: ProductId) -> Result<Option<Product>>;

    async fn list(&self, filter: &ListFilter) -> Result<Vec<Product>>;

    /// Returns `false` when no product had that id.
    async fn delete(&self, id: ProductId) -> Result<bool>;

    /// All stored embeddings of one kind, optionally leaving one product out.
    async fn embeddings_for_kind(
        &self,
        kind: EmbeddingKind,
        exclude: Option<ProductId>,
    ) -> Result<Vec<(ProductId, Embedding)>>;

    async fn embedding_for_product(
        &self,
        id: ProductId,
        kind: EmbeddingKind,
    ) -> Result<Option<Embedding>>;

    /// Hydrates products in the order of `ids`. Ids that no longer exist are
    /// skipped.
    async fn materialize(&self, ids: &[ProductId]) -> Result<Vec<Product>>;

    async fn ping(&self) -> Result<()>;
}
