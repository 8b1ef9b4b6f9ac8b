use axum::{Router, routing::get};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers, infra::app_state::AppState};

pub const STATUS: &str = "/status";
pub const METRICS: &str = "/metrics";
pub const BLEED_QUERY: &str = "/bleed/query";
pub const BLEED_HOST: &str = "/bleed/{*host}";
pub const BLEED_EMPTY_HOST: &str = "/bleed/";

/// Classification routes. Any origin may call them.
pub fn create_bleed_router() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([axum::http::Method::GET]);

    // `/bleed/query` is matched before the catch-all host route.
    Router::new()
        .route(BLEED_QUERY, get(handlers::bleed_query_handler))
        .route(BLEED_HOST, get(handlers::bleed_host_handler))
        // The catch-all needs at least one character; `/bleed/` is the empty host.
        .route(BLEED_EMPTY_HOST, get(handlers::bleed_host_handler))
        .layer(cors)
}

/// The full application: operational routes, classification routes, and the
/// redirect for everything else.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::redirect_handler))
        .route(STATUS, get(handlers::status_handler))
        .route(METRICS, get(handlers::metrics_handler))
        .merge(create_bleed_router())
        .fallback(handlers::redirect_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
