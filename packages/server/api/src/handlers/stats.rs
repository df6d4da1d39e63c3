use super::ServiceError;
use crate::state::AppState;
use axum::{extract::State, Json};
use shared::dto::CatalogStats;

pub async fn stats(State(state): State<AppState>) -> Result<Json<CatalogStats>, ServiceError> {
    Ok(Json(state.catalog.stats().await?))
}
