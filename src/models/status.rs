use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an application as recorded by the backend.
///
/// `Pending` and `Reviewing` belong to the upstream submission flow and are
/// outside interview coordination; everything else is in scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    InterviewRequested,
    CoordinationNeeded,
    Confirmed,
    InterviewScheduled,
    Accepted,
    Rejected,
    Cancelled,
}

/// Statuses the client treats as interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusGroup {
    Upstream,
    AwaitingResponse,
    Confirmed,
    Result,
    Cancelled,
}

/// Who performs a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Actor {
    Employer,
    Applicant,
    System,
}

/// Transitions an application can take inside interview coordination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewAction {
    AcceptChoice,
    Reject,
    Cancel,
    RecordOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status: {0}")]
pub struct UnknownStatus(pub String);

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 9] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewing,
        ApplicationStatus::InterviewRequested,
        ApplicationStatus::CoordinationNeeded,
        ApplicationStatus::Confirmed,
        ApplicationStatus::InterviewScheduled,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Cancelled,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Reviewing => "REVIEWING",
            ApplicationStatus::InterviewRequested => "INTERVIEW_REQUESTED",
            ApplicationStatus::CoordinationNeeded => "COORDINATION_NEEDED",
            ApplicationStatus::Confirmed => "CONFIRMED",
            ApplicationStatus::InterviewScheduled => "INTERVIEW_SCHEDULED",
            ApplicationStatus::Accepted => "ACCEPTED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Cancelled => "CANCELLED",
        }
    }

    pub const fn group(self) -> StatusGroup {
        match self {
            ApplicationStatus::Pending | ApplicationStatus::Reviewing => StatusGroup::Upstream,
            ApplicationStatus::InterviewRequested | ApplicationStatus::CoordinationNeeded => {
                StatusGroup::AwaitingResponse
            }
            ApplicationStatus::Confirmed | ApplicationStatus::InterviewScheduled => {
                StatusGroup::Confirmed
            }
            ApplicationStatus::Accepted | ApplicationStatus::Rejected => StatusGroup::Result,
            ApplicationStatus::Cancelled => StatusGroup::Cancelled,
        }
    }

    pub const fn is_interview_related(self) -> bool {
        !matches!(self.group(), StatusGroup::Upstream)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self.group(), StatusGroup::Result | StatusGroup::Cancelled)
    }

    /// Whether `action` may start from this status.
    pub fn permits(self, action: InterviewAction) -> bool {
        !action.targets(self).is_empty()
    }

    /// Whether the backend moving a record from `self` to `next` is a known
    /// transition. Moves inside one group are backend-internal and legal.
    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        if self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        if self.group() == next.group() {
            return true;
        }
        if self.group() == StatusGroup::Upstream {
            return next.group() == StatusGroup::AwaitingResponse;
        }
        [
            InterviewAction::AcceptChoice,
            InterviewAction::Reject,
            InterviewAction::Cancel,
            InterviewAction::RecordOutcome,
        ]
        .iter()
        .any(|action| action.targets(self).contains(&next))
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim();
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl InterviewAction {
    /// Statuses reachable by this action from `from`; empty when the action
    /// is not legal there.
    pub fn targets(self, from: ApplicationStatus) -> &'static [ApplicationStatus] {
        use ApplicationStatus::*;

        match (self, from.group()) {
            (InterviewAction::AcceptChoice, StatusGroup::AwaitingResponse) => {
                &[Confirmed, InterviewScheduled]
            }
            (InterviewAction::Reject, StatusGroup::AwaitingResponse) => &[Cancelled],
            (InterviewAction::Cancel, StatusGroup::Confirmed) => &[Cancelled],
            (InterviewAction::RecordOutcome, StatusGroup::Confirmed) => &[Accepted, Rejected],
            _ => &[],
        }
    }

    pub fn is_performed_by(self, actor: Actor) -> bool {
        match self {
            InterviewAction::AcceptChoice | InterviewAction::Reject => actor == Actor::Applicant,
            InterviewAction::Cancel => matches!(actor, Actor::Applicant | Actor::Employer),
            InterviewAction::RecordOutcome => actor == Actor::System,
        }
    }
}
