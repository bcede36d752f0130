use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::models::application::ApplicationId;
use crate::utils::time;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackLevel {
    Success,
    Error,
}

/// A toast for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feedback {
    pub level: FeedbackLevel,
    pub application_id: ApplicationId,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Feedback {
    pub fn success(application_id: &ApplicationId, message: impl Into<String>) -> Self {
        Self {
            level: FeedbackLevel::Success,
            application_id: application_id.clone(),
            message: message.into(),
            created_at: time::now(),
        }
    }

    pub fn error(application_id: &ApplicationId, message: impl Into<String>) -> Self {
        Self {
            level: FeedbackLevel::Error,
            application_id: application_id.clone(),
            message: message.into(),
            created_at: time::now(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait FeedbackSink: Send + Sync {
    fn notify(&self, feedback: Feedback);
}

/// Bounded in-memory toast queue drained by the surface.
pub struct FeedbackQueue {
    capacity: usize,
    items: Mutex<VecDeque<Feedback>>,
}

impl FeedbackQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            items: Mutex::new(VecDeque::new()),
        }
    }

    pub fn drain(&self) -> Vec<Feedback> {
        match self.items.lock() {
            Ok(mut items) => items.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Default for FeedbackQueue {
    fn default() -> Self {
        Self::new(50)
    }
}

impl FeedbackSink for FeedbackQueue {
    fn notify(&self, feedback: Feedback) {
        match feedback.level {
            FeedbackLevel::Success => info!(
                application_id = %feedback.application_id,
                "{}", feedback.message
            ),
            FeedbackLevel::Error => warn!(
                application_id = %feedback.application_id,
                "{}", feedback.message
            ),
        }

        let Ok(mut items) = self.items.lock() else {
            return;
        };
        if items.len() == self.capacity {
            items.pop_front();
        }
        items.push_back(feedback);
    }
}
