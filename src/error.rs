use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::models::application::{ApplicationId, InterviewChoice};
use crate::models::status::ApplicationStatus;
use crate::utils::validation::field_messages;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures talking to the coordination backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    #[error("not logged in")]
    Unauthorized,

    #[error("application not found")]
    NotFound,

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("backend error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, BackendError::Unauthorized)
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Network(err.to_string())
        }
    }
}

/// Why an interview action did not complete.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ActionError {
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("no proposed time for the {} choice", .0.as_str())]
    InvalidChoice(InterviewChoice),

    #[error("action is not available while the interview is {0}")]
    NotPermitted(ApplicationStatus),

    #[error("application {0} is not in the current list")]
    UnknownApplication(ApplicationId),

    #[error("an action for application {0} is already in progress")]
    InFlight(ApplicationId),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match self {
            Error::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Error::Action(ActionError::Validation(errors)) => {
                let body = Json(json!({
                    "error": "validation_failed",
                    "fields": field_messages(&errors),
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            Error::Action(err @ (ActionError::InvalidChoice(_) | ActionError::NotPermitted(_))) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Error::Action(err @ ActionError::UnknownApplication(_)) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            Error::Action(err @ ActionError::InFlight(_)) => (StatusCode::CONFLICT, err.to_string()),
            Error::Action(ActionError::Backend(err)) | Error::Backend(err) => {
                backend_status(&err)
            }
            Error::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

fn backend_status(err: &BackendError) -> (StatusCode, String) {
    let status = match err {
        BackendError::Unauthorized => StatusCode::UNAUTHORIZED,
        BackendError::NotFound => StatusCode::NOT_FOUND,
        BackendError::Rejected { .. } => StatusCode::CONFLICT,
        BackendError::Server { .. } | BackendError::Network(_) | BackendError::Decode(_) => {
            StatusCode::BAD_GATEWAY
        }
    };
    (status, err.to_string())
}
