use super::extract::{Path, Query};
use super::{extract, file_field, product_response, text_field, ServiceError};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    Extension, Json,
};
use domain::ports::catalog_repository::DEFAULT_LIST_LIMIT;
use domain::{ListFilter, NewProduct, ProductId};
use serde::Deserialize;
use shared::dto::{CreateProductRequest, ImageUrlResponse, MessageResponse, ProductResponse};
use std::time::Duration;

const IMAGE_URL_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: usize,
    pub limit: Option<usize>,
    pub category: Option<String>,
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ProductResponse>>, ServiceError> {
    let filter = ListFilter {
        skip: query.skip,
        limit: query.limit.unwrap_or(DEFAULT_LIST_LIMIT),
        category: query.category,
    };
    let products = state.catalog.list_products(filter).await?;
    Ok(Json(products.iter().map(product_response).collect()))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductResponse>, ServiceError> {
    let product = state.catalog.get_product(id).await?;
    Ok(Json(product_response(&product)))
}

pub async fn create_text_only(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    extract::Json(req): extract::Json<CreateProductRequest>,
) -> Result<Json<ProductResponse>, ServiceError> {
    let new = NewProduct {
        name: req.name,
        description: req.description,
        category: req.category,
        price: req.price,
    };
    let product = state.catalog.create_product(new, None).await?;
    tracing::info!(user = %user.user_id, product_id = product.id, "Product created");
    Ok(Json(product_response(&product)))
}

/// Form fields `name`, `description`, `category`, `price` and an optional
/// `image` file.
pub async fn create_multipart(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<Json<ProductResponse>, ServiceError> {
    let mut new = NewProduct::default();
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "name" => new.name = text_field(field).await?.unwrap_or_default(),
            "description" => new.description = text_field(field).await?.unwrap_or_default(),
            "category" => new.category = text_field(field).await?,
            "price" => {
                new.price = match text_field(field).await? {
                    Some(p) => Some(p.parse::<f64>().map_err(|_| {
                        ServiceError::BadRequest(format!("price must be a number, got '{}'", p))
                    })?),
                    None => None,
                }
            }
            "image" => image = file_field(field).await?,
            other => tracing::debug!("Ignoring unknown form field '{}'", other),
        }
    }

    let product = state.catalog.create_product(new, image).await?;
    tracing::info!(user = %user.user_id, product_id = product.id, "Product created");
    Ok(Json(product_response(&product)))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<ProductId>,
) -> Result<Json<MessageResponse>, ServiceError> {
    state.catalog.delete_product(id).await?;
    tracing::info!(user = %user.user_id, product_id = id, "Product deleted");
    Ok(Json(MessageResponse {
        message: "Product deleted successfully".to_string(),
    }))
}

pub async fn image_url(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ImageUrlResponse>, ServiceError> {
    let url = state.catalog.image_url(id, IMAGE_URL_TTL).await?;
    Ok(Json(ImageUrlResponse {
        url,
        expires_in: IMAGE_URL_TTL.as_secs(),
    }))
}
