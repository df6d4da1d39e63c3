use crate::state::AppState;
use axum::{extract::State, Json};
use shared::dto::{HealthResponse, ServiceInfo};
use std::collections::BTreeMap;

pub async fn info() -> Json<ServiceInfo> {
    let endpoints = [
        ("products", "/products"),
        ("search_similar", "/search/similar"),
        ("search_text", "/search/text"),
        ("search_image", "/search/image"),
        ("search_multimodal", "/search/multimodal"),
        ("stats", "/stats"),
        ("health", "/health"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect::<BTreeMap<_, _>>();

    Json(ServiceInfo {
        message: "Welcome to Inventory.AI API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints,
    })
}

/// Always 200 while the process serves requests; the datastore status is
/// reported in the body.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.catalog.ping().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!("Health check: {}", e);
            "unavailable"
        }
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        database: database.to_string(),
    })
}
