use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::BackendError;
use crate::models::application::{Application, ApplicationId};
use crate::services::backend_client::ApplicationBackend;
use crate::services::view_projection::{InterviewTab, TabCounts};
use crate::utils::time;

/// One fetched copy of the interview-related applications, in backend order.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub applications: Vec<Application>,
    pub generation: u64,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(applications: Vec<Application>, generation: u64, fetched_at: DateTime<Utc>) -> Self {
        let applications = applications
            .into_iter()
            .filter(|a| a.status.is_interview_related())
            .collect();
        Self {
            applications,
            generation,
            fetched_at,
        }
    }

    pub fn by_tab(&self, tab: InterviewTab) -> impl Iterator<Item = &Application> + '_ {
        self.applications
            .iter()
            .filter(move |application| tab.contains(application.status))
    }

    pub fn counts(&self) -> TabCounts {
        TabCounts::from_applications(&self.applications)
    }

    pub fn get(&self, id: &ApplicationId) -> Option<&Application> {
        self.applications.iter().find(|application| &application.id == id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    /// Nothing fetched yet.
    Loading,
    Ready(Snapshot),
    /// The last fetch failed; the view offers a retry.
    Failed { message: String },
    Unauthorized,
}

impl LoadState {
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            LoadState::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

struct StoreInner {
    state: LoadState,
    generation: u64,
    applied_ticket: u64,
}

/// Client-side read model of the backend's applications. Every `load`
/// replaces the snapshot wholesale; nothing patches it in place.
pub struct ApplicationStore<B> {
    backend: Arc<B>,
    limit: usize,
    tickets: AtomicU64,
    inner: RwLock<StoreInner>,
}

impl<B: ApplicationBackend> ApplicationStore<B> {
    pub fn new(backend: Arc<B>, limit: usize) -> Self {
        Self {
            backend,
            limit: limit.max(1),
            tickets: AtomicU64::new(0),
            inner: RwLock::new(StoreInner {
                state: LoadState::Loading,
                generation: 0,
                applied_ticket: 0,
            }),
        }
    }

    pub async fn load(&self) -> Result<Snapshot, BackendError> {
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        let fetched = self.backend.list_my_applications(self.limit).await;

        let mut inner = self.inner.write().await;
        if ticket < inner.applied_ticket {
            // A load issued later has already landed; this response is older.
            debug!(ticket, "Discarding application list older than the current state");
            return match &inner.state {
                LoadState::Ready(current) => Ok(current.clone()),
                LoadState::Unauthorized => Err(BackendError::Unauthorized),
                LoadState::Failed { message } => Err(BackendError::Network(message.clone())),
                LoadState::Loading => fetched.map(|items| {
                    Snapshot::new(parse_records(items), inner.generation, time::now())
                }),
            };
        }
        inner.applied_ticket = ticket;

        match fetched {
            Ok(items) => {
                inner.generation += 1;
                let snapshot = Snapshot::new(parse_records(items), inner.generation, time::now());
                if let Some(previous) = inner.state.snapshot() {
                    audit_transitions(previous, &snapshot);
                }
                info!(
                    generation = snapshot.generation,
                    count = snapshot.applications.len(),
                    "Loaded interview applications"
                );
                inner.state = LoadState::Ready(snapshot.clone());
                Ok(snapshot)
            }
            Err(BackendError::Unauthorized) => {
                warn!("Application list refused: session is not logged in");
                inner.state = LoadState::Unauthorized;
                Err(BackendError::Unauthorized)
            }
            Err(err) => {
                warn!("Failed to load applications: {}", err);
                inner.state = LoadState::Failed {
                    message: err.to_string(),
                };
                Err(err)
            }
        }
    }

    /// Drops the snapshot. Loads issued before this call are discarded when
    /// they land, so they cannot bring the data back.
    pub async fn mark_unauthorized(&self) {
        let mut inner = self.inner.write().await;
        inner.applied_ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        inner.state = LoadState::Unauthorized;
    }

    pub async fn state(&self) -> LoadState {
        self.inner.read().await.state.clone()
    }

    pub async fn get(&self, id: &ApplicationId) -> Option<Application> {
        let inner = self.inner.read().await;
        inner.state.snapshot().and_then(|s| s.get(id)).cloned()
    }
}

/// Records that do not decode (an unknown status, a malformed timestamp) are
/// dropped with a warning rather than failing the whole list.
fn parse_records(items: Vec<JsonValue>) -> Vec<Application> {
    items
        .into_iter()
        .filter_map(|item| {
            let id = item.get("id").cloned().unwrap_or(JsonValue::Null);
            match serde_json::from_value::<Application>(item) {
                Ok(application) => {
                    for violation in application.invariant_violations() {
                        warn!(application_id = %application.id, "Data anomaly: {}", violation);
                    }
                    Some(application)
                }
                Err(e) => {
                    warn!(application_id = %id, "Dropping undecodable application record: {}", e);
                    None
                }
            }
        })
        .collect()
}

/// Status moves between two snapshots that the lifecycle does not allow are
/// reported. The new record is still shown: the backend is authoritative.
fn audit_transitions(previous: &Snapshot, next: &Snapshot) -> usize {
    let before: HashMap<&ApplicationId, &Application> = previous
        .applications
        .iter()
        .map(|application| (&application.id, application))
        .collect();

    let mut anomalies = 0;
    for application in &next.applications {
        let Some(old) = before.get(&application.id) else {
            continue;
        };
        if !old.status.can_transition_to(application.status) {
            anomalies += 1;
            warn!(
                application_id = %application.id,
                from = %old.status,
                to = %application.status,
                "Data anomaly: backend reported an illegal status transition"
            );
        }
    }
    anomalies
}
