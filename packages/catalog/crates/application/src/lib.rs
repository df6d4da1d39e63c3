pub mod catalog_service;
pub mod embeddings;
pub mod error;
pub mod images;
pub mod stats;

pub use catalog_service::{CatalogService, SearchResult, MAX_TOP_K};
pub use error::CatalogError;
