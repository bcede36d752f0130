use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::application::{Application, ApplicationId, InterviewMethod, Venue};
use crate::models::status::{Actor, ApplicationStatus, InterviewAction, StatusGroup};
use crate::services::application_store::{LoadState, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewTab {
    #[default]
    All,
    Requested,
    Confirmed,
    Result,
    Cancelled,
}

impl InterviewTab {
    pub const ALL: [InterviewTab; 5] = [
        InterviewTab::All,
        InterviewTab::Requested,
        InterviewTab::Confirmed,
        InterviewTab::Result,
        InterviewTab::Cancelled,
    ];

    pub fn statuses(self) -> &'static [ApplicationStatus] {
        use ApplicationStatus::*;

        match self {
            InterviewTab::All => &[
                InterviewRequested,
                CoordinationNeeded,
                Confirmed,
                InterviewScheduled,
                Accepted,
                Rejected,
                Cancelled,
            ],
            InterviewTab::Requested => &[InterviewRequested, CoordinationNeeded],
            InterviewTab::Confirmed => &[Confirmed, InterviewScheduled],
            InterviewTab::Result => &[Accepted, Rejected],
            InterviewTab::Cancelled => &[Cancelled],
        }
    }

    pub fn contains(self, status: ApplicationStatus) -> bool {
        self.statuses().contains(&status)
    }
}

/// Badge counts. Always computed from a snapshot, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TabCounts {
    pub all: usize,
    pub requested: usize,
    pub confirmed: usize,
    pub result: usize,
    pub cancelled: usize,
}

impl TabCounts {
    pub fn from_applications<'a>(applications: impl IntoIterator<Item = &'a Application>) -> Self {
        let mut counts = TabCounts::default();
        for application in applications {
            match application.group() {
                StatusGroup::AwaitingResponse => counts.requested += 1,
                StatusGroup::Confirmed => counts.confirmed += 1,
                StatusGroup::Result => counts.result += 1,
                StatusGroup::Cancelled => counts.cancelled += 1,
                StatusGroup::Upstream => continue,
            }
            counts.all += 1;
        }
        counts
    }

    pub fn get(&self, tab: InterviewTab) -> usize {
        match tab {
            InterviewTab::All => self.all,
            InterviewTab::Requested => self.requested,
            InterviewTab::Confirmed => self.confirmed,
            InterviewTab::Result => self.result,
            InterviewTab::Cancelled => self.cancelled,
        }
    }
}

/// What a card shows for its status group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum RenderVariant {
    AwaitingResponse {
        first_choice: Option<DateTime<Utc>>,
        second_choice: Option<DateTime<Utc>>,
        method: Option<InterviewMethod>,
        proposed_by: Option<Actor>,
    },
    Confirmed {
        proposed_time: Option<DateTime<Utc>>,
        method: Option<InterviewMethod>,
        venue: Option<Venue>,
        what_to_bring: Option<String>,
    },
    Accepted {
        proposed_time: Option<DateTime<Utc>>,
        note: Option<String>,
    },
    Rejected {
        reason: Option<String>,
        notified_at: Option<DateTime<Utc>>,
    },
    Cancelled {
        reason: Option<String>,
        cancelled_by: Option<Actor>,
        cancelled_at: Option<DateTime<Utc>>,
    },
}

impl RenderVariant {
    pub fn for_application(application: &Application) -> Option<Self> {
        let variant = match application.status.group() {
            StatusGroup::Upstream => return None,
            StatusGroup::AwaitingResponse => RenderVariant::AwaitingResponse {
                first_choice: application.interview_first_choice,
                second_choice: application.interview_second_choice,
                method: application.interview_method,
                proposed_by: application.proposed_by,
            },
            StatusGroup::Confirmed => RenderVariant::Confirmed {
                proposed_time: application.proposed_time,
                method: application.interview_method,
                venue: application.venue(),
                what_to_bring: application.interview_what_to_bring.clone(),
            },
            StatusGroup::Result if application.status == ApplicationStatus::Accepted => {
                RenderVariant::Accepted {
                    proposed_time: application.proposed_time,
                    note: application.interview_note.clone(),
                }
            }
            StatusGroup::Result => RenderVariant::Rejected {
                reason: application.rejection_reason.clone(),
                notified_at: application.result_notified_at,
            },
            StatusGroup::Cancelled => RenderVariant::Cancelled {
                reason: application.cancel_reason.clone(),
                cancelled_by: application.cancelled_by,
                cancelled_at: application.cancelled_at,
            },
        };
        Some(variant)
    }
}

/// Controls the applicant can use on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailableAction {
    AcceptFirst,
    AcceptSecond,
    Reject,
    Cancel,
}

fn available_actions(application: &Application) -> Vec<AvailableAction> {
    let status = application.status;
    let mut actions = Vec::new();
    if status.permits(InterviewAction::AcceptChoice) {
        // A second slot is only meaningful next to a first one.
        if application.interview_first_choice.is_some() {
            actions.push(AvailableAction::AcceptFirst);
            if application.interview_second_choice.is_some() {
                actions.push(AvailableAction::AcceptSecond);
            }
        }
    }
    if status.permits(InterviewAction::Reject) {
        actions.push(AvailableAction::Reject);
    }
    if status.permits(InterviewAction::Cancel) {
        actions.push(AvailableAction::Cancel);
    }
    actions
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    pub application: Application,
    #[serde(flatten)]
    pub variant: RenderVariant,
    pub actions: Vec<AvailableAction>,
    /// Controls are disabled while an action for this id is in flight.
    pub processing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BoardView {
    Loading,
    NotLoggedIn,
    Failed {
        message: String,
    },
    Ready {
        active_tab: InterviewTab,
        counts: TabCounts,
        total: usize,
        generation: u64,
        fetched_at: DateTime<Utc>,
        items: Vec<ItemView>,
    },
}

pub fn project_snapshot(
    snapshot: &Snapshot,
    active_tab: InterviewTab,
    processing: &HashSet<ApplicationId>,
) -> BoardView {
    let counts = snapshot.counts();
    let items = snapshot
        .by_tab(active_tab)
        .filter_map(|application| {
            let variant = RenderVariant::for_application(application)?;
            Some(ItemView {
                application: application.clone(),
                variant,
                actions: available_actions(application),
                processing: processing.contains(&application.id),
            })
        })
        .collect();

    BoardView::Ready {
        active_tab,
        counts,
        total: counts.all,
        generation: snapshot.generation,
        fetched_at: snapshot.fetched_at,
        items,
    }
}

pub fn project(
    state: &LoadState,
    active_tab: InterviewTab,
    processing: &HashSet<ApplicationId>,
) -> BoardView {
    match state {
        LoadState::Loading => BoardView::Loading,
        LoadState::Unauthorized => BoardView::NotLoggedIn,
        LoadState::Failed { message } => BoardView::Failed {
            message: message.clone(),
        },
        LoadState::Ready(snapshot) => project_snapshot(snapshot, active_tab, processing),
    }
}
