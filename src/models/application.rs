use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use tracing::warn;

use crate::models::status::{Actor, ApplicationStatus, StatusGroup};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl<'de> Deserialize<'de> for ApplicationId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrInt {
            String(String),
            Int(i64),
        }

        match StringOrInt::deserialize(deserializer)? {
            StringOrInt::String(s) if !s.trim().is_empty() => Ok(Self(s)),
            StringOrInt::String(_) => Err(serde::de::Error::custom("empty application id")),
            StringOrInt::Int(i) => Ok(Self(i.to_string())),
        }
    }
}

impl ApplicationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterviewMethod {
    Online,
    Offline,
}

/// Which of the proposed slots the applicant takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterviewChoice {
    First,
    Second,
}

impl InterviewChoice {
    pub const fn as_str(self) -> &'static str {
        match self {
            InterviewChoice::First => "FIRST",
            InterviewChoice::Second => "SECOND",
        }
    }
}

/// Client copy of one application. The backend owns every field; the client
/// only reads it and asks for transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub status: ApplicationStatus,
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub interview_method: Option<InterviewMethod>,
    pub interview_first_choice: Option<DateTime<Utc>>,
    pub interview_second_choice: Option<DateTime<Utc>>,
    pub proposed_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub proposed_by: Option<Actor>,
    pub interview_location: Option<String>,
    pub interview_link: Option<String>,
    pub interview_directions: Option<String>,
    pub interview_what_to_bring: Option<String>,
    pub cancel_reason: Option<String>,
    #[serde(default, deserialize_with = "lenient_enum")]
    pub cancelled_by: Option<Actor>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub result_notified_at: Option<DateTime<Utc>>,
    pub interview_note: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Descriptive enums (actor, method) the client does not recognise are read
/// as absent so the card is still shown. Only `status` is a closed set.
fn lenient_enum<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<JsonValue>::deserialize(deserializer)? {
        None | Some(JsonValue::Null) => Ok(None),
        Some(raw) => match serde_json::from_value(raw.clone()) {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                warn!(value = %raw, "Ignoring unrecognised value in application record");
                Ok(None)
            }
        },
    }
}

/// Venue of an interview, resolved from the method-dependent fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Venue {
    Online {
        link: Option<String>,
    },
    Offline {
        location: Option<String>,
        directions: Option<String>,
    },
}

impl Application {
    pub fn group(&self) -> StatusGroup {
        self.status.group()
    }

    pub fn proposed_choice(&self, choice: InterviewChoice) -> Option<DateTime<Utc>> {
        match choice {
            InterviewChoice::First => self.interview_first_choice,
            InterviewChoice::Second => self.interview_second_choice,
        }
    }

    pub fn venue(&self) -> Option<Venue> {
        match self.interview_method? {
            InterviewMethod::Online => Some(Venue::Online {
                link: self.interview_link.clone(),
            }),
            InterviewMethod::Offline => Some(Venue::Offline {
                location: self.interview_location.clone(),
                directions: self.interview_directions.clone(),
            }),
        }
    }

    /// Record-level invariants the backend is expected to hold. Returns a
    /// description of each one that is broken; the client only reports them.
    pub fn invariant_violations(&self) -> Vec<&'static str> {
        let mut violations = Vec::new();
        let group = self.group();

        let needs_proposed_time = matches!(group, StatusGroup::Confirmed | StatusGroup::Result);
        if needs_proposed_time && self.proposed_time.is_none() {
            violations.push("proposedTime missing for a confirmed interview");
        }
        if matches!(group, StatusGroup::AwaitingResponse) && self.proposed_time.is_some() {
            violations.push("proposedTime set before any choice was accepted");
        }

        let cancelled = self.status == ApplicationStatus::Cancelled;
        if cancelled != self.cancel_reason.is_some() || cancelled != self.cancelled_by.is_some() {
            violations.push("cancellation fields do not match the CANCELLED status");
        }

        if let Some(method) = self.interview_method {
            let has_location = self.interview_location.is_some();
            let has_link = self.interview_link.is_some();
            let consistent = match method {
                InterviewMethod::Online => has_link && !has_location,
                InterviewMethod::Offline => has_location && !has_link,
            };
            if !consistent {
                violations.push("venue fields do not match the interview method");
            }
        }

        violations
    }
}
