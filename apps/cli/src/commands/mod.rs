pub mod check_embeddings;
pub mod products;
pub mod search;
pub mod seed;
pub mod stats;
pub mod token;
