use crate::embedding::{Embedding, EmbeddingKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ProductId = i32;

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_CATEGORY_LEN: usize = 100;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProductError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("description must not be empty")]
    EmptyDescription,
    #[error("name exceeds {MAX_NAME_LEN} characters")]
    NameTooLong,
    #[error("category exceeds {MAX_CATEGORY_LEN} characters")]
    CategoryTooLong,
    #[error("price must be a non-negative number, got {0}")]
    InvalidPrice(f64),
}

/// Where a product's image lives in the object store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Public URL handed to clients.
    pub url: String,
    /// Object key, used for deletion and presigning.
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub image: Option<ImageRef>,
    pub text_embedding: Option<Embedding>,
    pub multimodal_embedding: Option<Embedding>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn embedding(&self, kind: EmbeddingKind) -> Option<&Embedding> {
        match kind {
            EmbeddingKind::Text => self.text_embedding.as_ref(),
            EmbeddingKind::Multimodal => self.multimodal_embedding.as_ref(),
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image.as_ref().map(|i| i.url.as_str())
    }
}

/// Caller-supplied fields of a product about to be created.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    pub price: Option<f64>,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Trims text fields, drops blank categories and checks the invariants.
    pub fn normalized(self) -> Result<Self, ProductError> {
        let name = self.name.trim().to_string();
        let description = self.description.trim().to_string();
        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        if name.is_empty() {
            return Err(ProductError::EmptyName);
        }
        if description.is_empty() {
            return Err(ProductError::EmptyDescription);
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(ProductError::NameTooLong);
        }
        if category
            .as_ref()
            .is_some_and(|c| c.chars().count() > MAX_CATEGORY_LEN)
        {
            return Err(ProductError::CategoryTooLong);
        }
        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                return Err(ProductError::InvalidPrice(price));
            }
        }

        Ok(Self {
            name,
            description,
            category,
            price: self.price,
        })
    }
}

/// Everything the repository needs to persist a new product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub product: NewProduct,
    pub image: Option<ImageRef>,
    pub text_embedding: Option<Embedding>,
    pub multimodal_embedding: Option<Embedding>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_trims_and_drops_blank_category() {
        let p = NewProduct::new("  Desk Lamp ", " LED lamp ")
            .with_category("   ")
            .with_price(34.99)
            .normalized()
            .unwrap();
        assert_eq!(p.name, "Desk Lamp");
        assert_eq!(p.description, "LED lamp");
        assert_eq!(p.category, None);
        assert_eq!(p.price, Some(34.99));
    }

    #[test]
    fn test_normalized_rejects_bad_fields() {
        assert_eq!(
            NewProduct::new(" ", "x").normalized(),
            Err(ProductError::EmptyName)
        );
        assert_eq!(
            NewProduct::new("x", "").normalized(),
            Err(ProductError::EmptyDescription)
        );
        assert_eq!(
            NewProduct::new("x".repeat(256), "d").normalized(),
            Err(ProductError::NameTooLong)
        );
        assert_eq!(
            NewProduct::new("x", "d")
                .with_category("c".repeat(101))
                .normalized(),
            Err(ProductError::CategoryTooLong)
        );
        assert_eq!(
            NewProduct::new("x", "d").with_price(-1.0).normalized(),
            Err(ProductError::InvalidPrice(-1.0))
        );
        assert!(NewProduct::new("x", "d")
            .with_price(f64::NAN)
            .normalized()
            .is_err());
    }

    #[test]
    fn test_zero_price_is_valid() {
        assert!(NewProduct::new("x", "d").with_price(0.0).normalized().is_ok());
    }
}
