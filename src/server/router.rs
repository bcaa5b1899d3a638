use crate::server::handlers::{analyze_handler, server_status_handler};
use crate::server::types::AppState;
use crate::utils::constants::SERVER_REQUEST_BODY_LIMIT;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // the multipart extractor enforces this while streaming, so oversized
    // uploads surface as a JSON 413 from the handler
    let request_body_limit = DefaultBodyLimit::max(SERVER_REQUEST_BODY_LIMIT);

    Router::new()
        .route("/", get(server_status_handler))
        .route("/analyze", post(analyze_handler))
        .layer(request_body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
