use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_TOP_K: usize = 5;

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub has_text_embedding: bool,
    #[serde(default)]
    pub has_multimodal_embedding: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarSearchRequest {
    pub product_id: i32,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_true")]
    pub use_multimodal: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextSearchRequest {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub product: ProductResponse,
    pub similarity_score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Half-open `[lower, upper)` bucket; the last bucket also holds `upper`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_products: usize,
    pub with_text_embedding: usize,
    pub with_multimodal_embedding: usize,
    pub with_image: usize,
    pub uncategorized: usize,
    /// Sorted by count, largest first.
    pub categories: Vec<CategoryCount>,
    pub price: Option<PriceSummary>,
    pub price_histogram: Vec<PriceBucket>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrlResponse {
    pub url: String,
    pub expires_in: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    pub endpoints: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// OAuth2 client-credentials grant sent to the identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClientCredentialsRequest {
    pub client_id: String,
    pub client_secret: String,
    pub audience: String,
    pub grant_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<u64>,
    pub token_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_request_defaults() {
        let req: SimilarSearchRequest = serde_json::from_str(r#"{"product_id": 3}"#).unwrap();
        assert_eq!(req.top_k, DEFAULT_TOP_K);
        assert!(req.use_multimodal);

        let req: TextSearchRequest = serde_json::from_str(r#"{"query": "beds"}"#).unwrap();
        assert_eq!(req.top_k, 5);
    }

    #[test]
    fn test_product_response_tolerates_missing_flags() {
        let json = r#"{
            "id": 1, "name": "Mouse", "description": "Wireless",
            "image_url": null, "category": "Electronics", "price": 29.99,
            "created_at": "2024-01-01T00:00:00Z"
        }"#;
        let p: ProductResponse = serde_json::from_str(json).unwrap();
        assert!(!p.has_text_embedding);
        assert_eq!(p.category.as_deref(), Some("Electronics"));
    }
}
