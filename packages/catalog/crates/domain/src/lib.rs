pub mod embedding;
pub mod entities;
pub mod ports;
pub mod similarity;

pub use embedding::{Embedding, EmbeddingError, EmbeddingKind};
pub use entities::product::{ImageRef, NewProduct, Product, ProductDraft, ProductError, ProductId};
pub use ports::{CatalogRepository, EmbeddingProvider, ImageStore, ListFilter};
pub use similarity::{rank, Match, SimilarityError};
