use super::extract::Path;
use super::ServiceError;
use crate::state::AppState;
use application::images::JPEG_CONTENT_TYPE;
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};

/// Serves stored images, for stores that have no public URL of their own.
pub async fn get_image(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    if key.split('/').any(|part| part == ".." || part.is_empty()) {
        return Err(ServiceError::BadRequest("Invalid image key".to_string()));
    }

    let bytes = state.catalog.image(&key).await?;
    Ok((
        [
            (header::CONTENT_TYPE, JPEG_CONTENT_TYPE),
            (header::CACHE_CONTROL, "public, max-age=86400"),
        ],
        bytes,
    ))
}
