use axum::{
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::infra::app_state::AppState;

pub async fn status_handler() -> &'static str {
    "OK"
}

/// Sends `/` and every unrouted path to the configured landing page.
pub async fn redirect_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::FOUND,
        [(header::LOCATION, state.redirect_host().to_owned())],
    )
}
