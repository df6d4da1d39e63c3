pub mod embedding;
pub mod repository;
pub mod storage;

pub use embedding::http::{HttpEmbeddingConfig, HttpEmbeddingProvider};
pub use embedding::local::LocalEmbedder;
pub use repository::memory::MemoryCatalogRepository;
pub use storage::local::LocalImageStore;
pub use storage::memory::MemoryImageStore;
pub use storage::s3::{S3Config, S3ImageStore};
