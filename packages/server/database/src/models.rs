use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use domain::{Embedding, ImageRef, Product};
use pgvector::Vector;

/// Column list shared by every query that hydrates a [`ProductRow`].
pub const PRODUCT_COLUMNS: &str = "id, name, description, image_url, s3_key, category, price, \
     text_embedding, multimodal_embedding, created_at, updated_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub s3_key: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub text_embedding: Option<Vector>,
    pub multimodal_embedding: Option<Vector>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn to_embedding(vector: Vector) -> Result<Embedding> {
    Embedding::new(Vec::from(vector)).context("Stored embedding is malformed")
}

impl TryFrom<ProductRow> for Product {
    type Error = anyhow::Error;

    fn try_from(row: ProductRow) -> Result<Self> {
        let image = match (row.image_url, row.s3_key) {
            (Some(url), Some(key)) => Some(ImageRef { url, key }),
            _ => None,
        };

        Ok(Product {
            id: row.id,
            name: row.name,
            description: row.description,
            category: row.category,
            price: row.price,
            image,
            text_embedding: row.text_embedding.map(to_embedding).transpose()?,
            multimodal_embedding: row.multimodal_embedding.map(to_embedding).transpose()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
