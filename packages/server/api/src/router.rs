use crate::handlers::{images, products, root, search, stats};
use crate::middleware::auth::require_auth;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{self, HeaderValue},
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

fn cors(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::DELETE,
        ])
        .allow_headers([
            http::header::CONTENT_TYPE,
            http::header::AUTHORIZATION,
            http::header::ACCEPT,
        ]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(parsed))
        .allow_credentials(true)
}

pub fn app(state: AppState, cors_origins: &[String]) -> Router {
    let protected = Router::new()
        .route("/products/text-only", post(products::create_text_only))
        .route("/products/multipart", post(products::create_multipart))
        .route("/products/:id", delete(products::delete_product))
        .route("/products/:id/image-url", get(products::image_url))
        .route("/search/similar", post(search::similar))
        .route("/search/text", post(search::text))
        .route("/search/image", post(search::image))
        .route("/search/multimodal", post(search::multimodal))
        .route("/stats", get(stats::stats))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .route("/", get(root::info))
        .route("/health", get(root::health))
        .route("/products", get(products::list_products))
        .route("/products/:id", get(products::get_product))
        .route("/images/*key", get(images::get_image))
        .merge(protected)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors(cors_origins))
        .with_state(state)
}
