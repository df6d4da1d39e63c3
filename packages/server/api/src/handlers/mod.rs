use crate::services::auth::AuthError;
use application::{CatalogError, SearchResult};
use axum::{
    extract::multipart::{Field, MultipartError},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use domain::Product;
use serde_json::json;
use shared::dto::{ProductResponse, SearchHit};

pub mod extract;
pub mod images;
pub mod products;
pub mod root;
pub mod search;
pub mod stats;

#[derive(Debug)]
pub enum ServiceError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    ServiceUnavailable(String),
    InternalError(String),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ServiceError::NotFound(e) => (StatusCode::NOT_FOUND, e),
            ServiceError::BadRequest(e) => (StatusCode::BAD_REQUEST, e),
            ServiceError::Unauthorized(e) => {
                return (
                    StatusCode::UNAUTHORIZED,
                    [(header::WWW_AUTHENTICATE, "Bearer")],
                    Json(json!({ "error": e })),
                )
                    .into_response();
            }
            ServiceError::ServiceUnavailable(e) => (StatusCode::SERVICE_UNAVAILABLE, e),
            ServiceError::InternalError(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

impl From<CatalogError> for ServiceError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound(_) | CatalogError::ImageNotFound(_) => {
                ServiceError::NotFound(e.to_string())
            }
            CatalogError::InvalidInput(_)
            | CatalogError::InvalidImage(_)
            | CatalogError::NoEmbeddingAvailable(_) => ServiceError::BadRequest(e.to_string()),
            CatalogError::EmbeddingUnavailable(_) => {
                ServiceError::ServiceUnavailable(e.to_string())
            }
            CatalogError::Similarity(_) | CatalogError::Repository(_) | CatalogError::Storage(_) => {
                ServiceError::InternalError(e.to_string())
            }
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        ServiceError::Unauthorized(e.to_string())
    }
}

impl From<MultipartError> for ServiceError {
    fn from(e: MultipartError) -> Self {
        ServiceError::BadRequest(format!("Invalid multipart body: {}", e))
    }
}

pub fn product_response(p: &Product) -> ProductResponse {
    ProductResponse {
        id: p.id,
        name: p.name.clone(),
        description: p.description.clone(),
        image_url: p.image_url().map(str::to_string),
        category: p.category.clone(),
        price: p.price,
        created_at: p.created_at,
        has_text_embedding: p.text_embedding.is_some(),
        has_multimodal_embedding: p.multimodal_embedding.is_some(),
    }
}

pub fn search_hits(results: Vec<SearchResult>) -> Vec<SearchHit> {
    results
        .into_iter()
        .map(|r| SearchHit {
            product: product_response(&r.product),
            similarity_score: r.score,
        })
        .collect()
}

/// A text form field, `None` when left blank.
pub(crate) async fn text_field(field: Field<'_>) -> Result<Option<String>, ServiceError> {
    let value = field.text().await?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

/// A file form field, `None` when the browser sent an empty file input.
pub(crate) async fn file_field(field: Field<'_>) -> Result<Option<Vec<u8>>, ServiceError> {
    let bytes = field.bytes().await?;
    Ok((!bytes.is_empty()).then(|| bytes.to_vec()))
}

pub(crate) fn parse_top_k(value: Option<String>) -> Result<usize, ServiceError> {
    match value {
        None => Ok(shared::dto::DEFAULT_TOP_K),
        Some(v) => v
            .parse()
            .map_err(|_| ServiceError::BadRequest(format!("top_k must be an integer, got '{}'", v))),
    }
}
