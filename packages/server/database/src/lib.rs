use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;

pub use sqlx; // Re-export for convenience
pub mod models;
pub mod repositories;

pub use repositories::PgCatalogRepository;

#[derive(Clone)]
pub struct Database {
    pub pool: PgPool,
}

impl Database {
    /// Connects to PostgreSQL. The pool is sized for a single API instance.
    pub async fn connect(database_url: &str) -> Result<Arc<Self>> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(3)) // Fail fast if DB is overloaded
            .idle_timeout(Duration::from_secs(60 * 5))
            .test_before_acquire(true)
            .connect(database_url)
            .await
            .context("Failed to connect to the database")?;

        Ok(Arc::new(Self { pool }))
    }

    /// Creates the pgvector extension and the products table if missing.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("src/migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;

        Ok(())
    }

    pub fn catalog(&self) -> PgCatalogRepository {
        PgCatalogRepository::new(self.pool.clone())
    }
}
