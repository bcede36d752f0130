use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use tracing::warn;

use crate::{
    dto::interview_dto::{AcceptPayload, ActionResponse, BoardQuery, ReasonOption},
    error::Result,
    models::{
        application::ApplicationId,
        reason::{InterviewReason, ReasonForm},
    },
    services::view_projection::{project, BoardView, InterviewTab},
    AppState,
};

pub async fn board_view(state: &AppState, tab: InterviewTab) -> BoardView {
    let processing = state.dispatcher.processing_ids();
    project(&state.store.state().await, tab, &processing)
}

#[axum::debug_handler]
pub async fn get_board(
    State(state): State<AppState>,
    Query(query): Query<BoardQuery>,
) -> Result<impl IntoResponse> {
    Ok(Json(board_view(&state, query.tab.unwrap_or_default()).await))
}

/// Failures are part of the returned board, so this never errors itself.
#[axum::debug_handler]
pub async fn refresh_board(
    State(state): State<AppState>,
    Query(query): Query<BoardQuery>,
) -> Result<impl IntoResponse> {
    if let Err(err) = state.store.load().await {
        warn!("Refresh failed: {}", err);
    }
    Ok(Json(board_view(&state, query.tab.unwrap_or_default()).await))
}

#[axum::debug_handler]
pub async fn list_reasons() -> impl IntoResponse {
    let reasons: Vec<ReasonOption> = InterviewReason::ALL
        .into_iter()
        .map(ReasonOption::from)
        .collect();
    Json(reasons)
}

#[axum::debug_handler]
pub async fn accept_interview(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AcceptPayload>,
) -> Result<impl IntoResponse> {
    let id = ApplicationId::new(id);
    let message = state
        .dispatcher
        .accept_interview(&id, payload.choice)
        .await?;
    Ok(Json(ActionResponse {
        application_id: id.to_string(),
        action: "accept",
        message,
    }))
}

#[axum::debug_handler]
pub async fn reject_interview(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<ReasonForm>,
) -> Result<impl IntoResponse> {
    let id = ApplicationId::new(id);
    let message = state.dispatcher.reject_interview(&id, form).await?;
    Ok(Json(ActionResponse {
        application_id: id.to_string(),
        action: "reject",
        message,
    }))
}

#[axum::debug_handler]
pub async fn cancel_interview(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<ReasonForm>,
) -> Result<impl IntoResponse> {
    let id = ApplicationId::new(id);
    let message = state.dispatcher.cancel_interview(&id, form).await?;
    Ok(Json(ActionResponse {
        application_id: id.to_string(),
        action: "cancel",
        message,
    }))
}
