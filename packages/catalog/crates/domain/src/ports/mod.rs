pub mod catalog_repository;
pub mod embedding_provider;
pub mod image_store;

pub use catalog_repository::{CatalogRepository, ListFilter};
pub use embedding_provider::EmbeddingProvider;
pub use image_store::ImageStore;
