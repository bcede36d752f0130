use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::models::application::InterviewChoice;
use crate::models::reason::{InterviewReason, ValidatedReason};
use crate::services::view_projection::InterviewTab;

// --- Backend wire ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInterviewRequest {
    pub selected_choice: InterviewChoice,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelInterviewRequest {
    pub reason: InterviewReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_detail: Option<String>,
}

impl From<ValidatedReason> for CancelInterviewRequest {
    fn from(value: ValidatedReason) -> Self {
        Self {
            reason: value.reason,
            reason_detail: value.detail,
        }
    }
}

/// `GET /applications/my` answers either with a bare array or with the list
/// wrapped in an envelope. Items stay raw so one bad record can be dropped
/// without failing the whole page.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApplicationListResponse {
    Bare(Vec<JsonValue>),
    Data { data: Vec<JsonValue> },
    Applications { applications: Vec<JsonValue> },
}

impl ApplicationListResponse {
    pub fn into_items(self) -> Vec<JsonValue> {
        match self {
            ApplicationListResponse::Bare(items)
            | ApplicationListResponse::Data { data: items }
            | ApplicationListResponse::Applications {
                applications: items,
            } => items,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl BackendErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .filter(|message| !message.trim().is_empty())
    }
}

// --- Interview surface ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardQuery {
    #[serde(default)]
    pub tab: Option<InterviewTab>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptPayload {
    pub choice: InterviewChoice,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReasonOption {
    pub code: InterviewReason,
    pub label: &'static str,
    pub requires_detail: bool,
}

impl From<InterviewReason> for ReasonOption {
    fn from(reason: InterviewReason) -> Self {
        Self {
            code: reason,
            label: reason.label(),
            requires_detail: reason.requires_detail(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse {
    pub application_id: String,
    pub action: &'static str,
    pub message: String,
}
