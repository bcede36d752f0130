use axum::{extract::State, response::IntoResponse, Json};

use crate::AppState;

/// Hands queued toasts to the presentation layer; each is delivered once.
#[axum::debug_handler]
pub async fn drain_feedback(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.feedback.drain())
}
