use crate::models::{to_embedding, ProductRow, PRODUCT_COLUMNS};
use anyhow::{Context, Result};
use async_trait::async_trait;
use domain::{
    CatalogRepository, Embedding, EmbeddingKind, ListFilter, Product, ProductDraft, ProductId,
};
use pgvector::Vector;
use sqlx::PgPool;
use std::collections::HashMap;

fn column(kind: EmbeddingKind) -> &'static str {
    match kind {
        EmbeddingKind::Text => "text_embedding",
        EmbeddingKind::Multimodal => "multimodal_embedding",
    }
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// pgvector-backed catalog. Similarity is computed in-process, so the
/// database only stores and returns vectors.
#[derive(Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn insert(&self, draft: ProductDraft) -> Result<Product> {
        let (image_url, s3_key) = match draft.image {
            Some(image) => (Some(image.url), Some(image.key)),
            None => (None, None),
        };

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products
                (name, description, image_url, s3_key, category, price,
                 text_embedding, multimodal_embedding)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&draft.product.name)
        .bind(&draft.product.description)
        .bind(image_url)
        .bind(s3_key)
        .bind(&draft.product.category)
        .bind(draft.product.price)
        .bind(draft.text_embedding.map(|e| Vector::from(e.into_inner())))
        .bind(draft.multimodal_embedding.map(|e| Vector::from(e.into_inner())))
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert product")?;

        Product::try_from(row)
    }

    async fn find(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch product")?;

        row.map(Product::try_from).transpose()
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE ($1::varchar IS NULL OR category = $1)
            ORDER BY id
            OFFSET $2 LIMIT $3
            "#
        ))
        .bind(&filter.category)
        .bind(to_i64(filter.skip))
        .bind(to_i64(filter.limit))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list products")?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn delete(&self, id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete product")?;
        Ok(result.rows_affected() > 0)
    }

    async fn embeddings_for_kind(
        &self,
        kind: EmbeddingKind,
        exclude: Option<ProductId>,
    ) -> Result<Vec<(ProductId, Embedding)>> {
        let col = column(kind);
        let rows: Vec<(i32, Vector)> = sqlx::query_as(&format!(
            r#"
            SELECT id, {col} FROM products
            WHERE {col} IS NOT NULL AND ($1::int IS NULL OR id <> $1)
            ORDER BY id
            "#
        ))
        .bind(exclude)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to load {} embeddings", kind))?;

        rows.into_iter()
            .map(|(id, v)| Ok((id, to_embedding(v)?)))
            .collect()
    }

    async fn embedding_for_product(
        &self,
        id: ProductId,
        kind: EmbeddingKind,
    ) -> Result<Option<Embedding>> {
        let col = column(kind);
        let row: Option<(Option<Vector>,)> =
            sqlx::query_as(&format!("SELECT {col} FROM products WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("Failed to load {} embedding", kind))?;

        row.and_then(|(v,)| v).map(to_embedding).transpose()
    }

    async fn materialize(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load ranked products")?;

        let mut by_id: HashMap<ProductId, ProductRow> =
            rows.into_iter().map(|r| (r.id, r)).collect();
        ids.iter()
            .filter_map(|id| by_id.remove(id))
            .map(Product::try_from)
            .collect()
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}
