use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Reasons an applicant gives for declining a proposal or withdrawing from a
/// confirmed interview. Both actions share this vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterviewReason {
    PersonalReason,
    OtherJobAccepted,
    ScheduleConflict,
    Other,
}

impl InterviewReason {
    pub const ALL: [InterviewReason; 4] = [
        InterviewReason::PersonalReason,
        InterviewReason::OtherJobAccepted,
        InterviewReason::ScheduleConflict,
        InterviewReason::Other,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            InterviewReason::PersonalReason => "PERSONAL_REASON",
            InterviewReason::OtherJobAccepted => "OTHER_JOB_ACCEPTED",
            InterviewReason::ScheduleConflict => "SCHEDULE_CONFLICT",
            InterviewReason::Other => "OTHER",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            InterviewReason::PersonalReason => "Personal reasons",
            InterviewReason::OtherJobAccepted => "Accepted another job",
            InterviewReason::ScheduleConflict => "Schedule conflict",
            InterviewReason::Other => "Other",
        }
    }

    pub const fn requires_detail(self) -> bool {
        matches!(self, InterviewReason::Other)
    }
}

/// Which action a reason form is collected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonTarget {
    Reject,
    Cancel,
}

impl ReasonTarget {
    pub const fn verb(self) -> &'static str {
        match self {
            ReasonTarget::Reject => "reject",
            ReasonTarget::Cancel => "cancel",
        }
    }
}

/// Input of the reason dialog. Reject and cancel submit the same form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "detail_required_for_other", skip_on_field_errors = true))]
pub struct ReasonForm {
    #[validate(required(message = "A reason must be selected"))]
    pub reason: Option<InterviewReason>,
    #[serde(default)]
    pub reason_detail: Option<String>,
}

/// A reason that passed validation; the only shape the dispatcher sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedReason {
    pub reason: InterviewReason,
    pub detail: Option<String>,
}

fn detail_required_for_other(form: &ReasonForm) -> Result<(), ValidationError> {
    let needs_detail = form.reason.is_some_and(InterviewReason::requires_detail);
    let has_detail = form
        .reason_detail
        .as_deref()
        .is_some_and(|detail| !detail.trim().is_empty());

    if needs_detail && !has_detail {
        let mut err = ValidationError::new("reason_detail_required");
        err.message = Some("Please describe the reason".into());
        return Err(err);
    }
    Ok(())
}

impl ReasonForm {
    pub fn new(reason: InterviewReason, reason_detail: Option<&str>) -> Self {
        Self {
            reason: Some(reason),
            reason_detail: reason_detail.map(str::to_string),
        }
    }

    pub fn into_validated(self) -> Result<ValidatedReason, validator::ValidationErrors> {
        crate::utils::validation::validate(&self)?;
        let reason = self.reason.unwrap_or(InterviewReason::Other);
        let detail = self
            .reason_detail
            .map(|detail| detail.trim().to_string())
            .filter(|detail| !detail.is_empty());
        Ok(ValidatedReason { reason, detail })
    }
}
