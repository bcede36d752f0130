pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::config::Config;
use crate::services::{
    action_dispatcher::ActionDispatcher, application_store::ApplicationStore,
    backend_client::HttpApplicationBackend, feedback::FeedbackQueue,
};

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<HttpApplicationBackend>,
    pub store: Arc<ApplicationStore<HttpApplicationBackend>>,
    pub dispatcher: Arc<ActionDispatcher<HttpApplicationBackend>>,
    pub feedback: Arc<FeedbackQueue>,
}

impl AppState {
    pub fn new(config: &Config) -> error::Result<Self> {
        let backend = HttpApplicationBackend::new(config.api_base_url.clone(), config.http_timeout)?;
        backend.set_token(config.api_token.clone());
        Ok(Self::with_backend(backend, config.applications_limit))
    }

    pub fn with_backend(backend: HttpApplicationBackend, applications_limit: usize) -> Self {
        let backend = Arc::new(backend);
        let store = Arc::new(ApplicationStore::new(backend.clone(), applications_limit));
        let feedback = Arc::new(FeedbackQueue::default());
        let dispatcher = Arc::new(ActionDispatcher::new(
            backend.clone(),
            store.clone(),
            feedback.clone(),
        ));

        Self {
            backend,
            store,
            dispatcher,
            feedback,
        }
    }
}

/// Routes of the local interview surface, without transport layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/api/session",
            post(routes::session::open_session).delete(routes::session::close_session),
        )
        .route("/api/interviews", get(routes::interviews::get_board))
        .route(
            "/api/interviews/refresh",
            post(routes::interviews::refresh_board),
        )
        .route(
            "/api/interviews/reasons",
            get(routes::interviews::list_reasons),
        )
        .route(
            "/api/interviews/:id/accept",
            post(routes::interviews::accept_interview),
        )
        .route(
            "/api/interviews/:id/reject",
            post(routes::interviews::reject_interview),
        )
        .route(
            "/api/interviews/:id/cancel",
            post(routes::interviews::cancel_interview),
        )
        .route("/api/feedback", get(routes::feedback::drain_feedback))
        .with_state(state)
}
