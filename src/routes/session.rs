use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use tracing::{info, warn};

use crate::{
    dto::interview_dto::BoardQuery, error::Result, middleware::auth::bearer_token,
    routes::interviews::board_view, AppState,
};

/// Installs the caller's credential and loads the board with it.
#[axum::debug_handler]
pub async fn open_session(
    State(state): State<AppState>,
    Query(query): Query<BoardQuery>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let token = bearer_token(&headers)?;
    state.backend.set_token(Some(token));
    info!("Session credential installed");

    if let Err(err) = state.store.load().await {
        warn!("Initial load for new session failed: {}", err);
    }
    Ok(Json(board_view(&state, query.tab.unwrap_or_default()).await))
}

#[axum::debug_handler]
pub async fn close_session(State(state): State<AppState>) -> impl IntoResponse {
    state.backend.set_token(None);
    state.store.mark_unauthorized().await;
    info!("Session closed");
    StatusCode::NO_CONTENT
}
