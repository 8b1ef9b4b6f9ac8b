use axum::{Json, extract::State};
use serde_json::{Value, json};
use tracing::error;

use crate::infra::app_state::AppState;

/// `GET /metrics`: flat `{counter: value}` object, or `{}` if the snapshot
/// cannot be rendered.
pub async fn metrics_handler(State(state): State<AppState>) -> Json<Value> {
    match serde_json::to_value(state.metrics.snapshot()) {
        Ok(report) => Json(report),
        Err(err) => {
            error!(error = %err, "could not generate metrics report");
            Json(json!({}))
        }
    }
}
