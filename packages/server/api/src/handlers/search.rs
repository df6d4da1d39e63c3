use super::{extract, file_field, parse_top_k, search_hits, text_field, ServiceError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use shared::dto::{SearchHit, SimilarSearchRequest, TextSearchRequest};

pub async fn similar(
    State(state): State<AppState>,
    extract::Json(req): extract::Json<SimilarSearchRequest>,
) -> Result<Json<Vec<SearchHit>>, ServiceError> {
    let results = state
        .catalog
        .search_similar(req.product_id, req.top_k, req.use_multimodal)
        .await?;
    Ok(Json(search_hits(results)))
}

pub async fn text(
    State(state): State<AppState>,
    extract::Json(req): extract::Json<TextSearchRequest>,
) -> Result<Json<Vec<SearchHit>>, ServiceError> {
    let results = state.catalog.search_text(&req.query, req.top_k).await?;
    Ok(Json(search_hits(results)))
}

struct SearchForm {
    image: Option<Vec<u8>>,
    query: Option<String>,
    top_k: usize,
}

async fn read_form(mut multipart: Multipart) -> Result<SearchForm, ServiceError> {
    let mut image = None;
    let mut query = None;
    let mut top_k = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => image = file_field(field).await?,
            "query" => query = text_field(field).await?,
            "top_k" => top_k = text_field(field).await?,
            _ => {}
        }
    }

    Ok(SearchForm {
        image,
        query,
        top_k: parse_top_k(top_k)?,
    })
}

/// Multipart `image` and optional `top_k`.
pub async fn image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Vec<SearchHit>>, ServiceError> {
    let form = read_form(multipart).await?;
    let image = form
        .image
        .ok_or_else(|| ServiceError::BadRequest("Missing 'image' field".to_string()))?;

    let results = state.catalog.search_image(image, form.top_k).await?;
    Ok(Json(search_hits(results)))
}

/// Multipart `image`, `query` and optional `top_k`.
pub async fn multimodal(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Vec<SearchHit>>, ServiceError> {
    let form = read_form(multipart).await?;
    let image = form
        .image
        .ok_or_else(|| ServiceError::BadRequest("Missing 'image' field".to_string()))?;
    let query = form
        .query
        .ok_or_else(|| ServiceError::BadRequest("Missing 'query' field".to_string()))?;

    let results = state
        .catalog
        .search_multimodal(&query, image, form.top_k)
        .await?;
    Ok(Json(search_hits(results)))
}
