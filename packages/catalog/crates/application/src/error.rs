use domain::{EmbeddingKind, ProductError, ProductId, SimilarityError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Product {0} not found")]
    NotFound(ProductId),

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Product {0} has no embeddings")]
    NoEmbeddingAvailable(ProductId),

    #[error("Could not generate a {0} embedding for the query")]
    EmbeddingUnavailable(EmbeddingKind),

    #[error(transparent)]
    Similarity(#[from] SimilarityError),

    #[error("Repository error: {0:#}")]
    Repository(#[source] anyhow::Error),

    #[error("Image storage error: {0:#}")]
    Storage(#[source] anyhow::Error),
}

impl From<ProductError> for CatalogError {
    fn from(e: ProductError) -> Self {
        CatalogError::InvalidInput(e.to_string())
    }
}

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;
