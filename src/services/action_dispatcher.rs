use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::dto::interview_dto::{AcceptInterviewRequest, CancelInterviewRequest};
use crate::error::{ActionError, BackendError};
use crate::models::application::{Application, ApplicationId, InterviewChoice};
use crate::models::reason::{ReasonForm, ReasonTarget};
use crate::models::status::{Actor, InterviewAction};
use crate::services::application_store::ApplicationStore;
use crate::services::backend_client::ApplicationBackend;
use crate::services::feedback::{Feedback, FeedbackSink};
use crate::utils::time;

type InFlight = Arc<Mutex<HashSet<ApplicationId>>>;

/// Marks an application as processing for as long as it is alive.
struct ProcessingGuard {
    id: ApplicationId,
    in_flight: InFlight,
}

impl ProcessingGuard {
    fn acquire(in_flight: &InFlight, id: &ApplicationId) -> Option<Self> {
        let mut ids = in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !ids.insert(id.clone()) {
            return None;
        }
        Some(Self {
            id: id.clone(),
            in_flight: Arc::clone(in_flight),
        })
    }
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        let mut ids = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        ids.remove(&self.id);
    }
}

/// Runs the applicant's interview actions against the backend.
///
/// Each action validates locally, claims the application id, calls the
/// backend and then reloads the store. Status is never written locally: the
/// reload is the only way a transition becomes visible. Failures are reported
/// through the feedback sink, except validation errors (shown inline by the
/// caller), duplicate clicks while in flight, and a lost session (the store
/// switches to its not-logged-in state). Backend failures leave the store as
/// it was; actions refused against a stale card also reload it.
pub struct ActionDispatcher<B> {
    backend: Arc<B>,
    store: Arc<ApplicationStore<B>>,
    feedback: Arc<dyn FeedbackSink>,
    in_flight: InFlight,
}

impl<B: ApplicationBackend> ActionDispatcher<B> {
    pub fn new(
        backend: Arc<B>,
        store: Arc<ApplicationStore<B>>,
        feedback: Arc<dyn FeedbackSink>,
    ) -> Self {
        Self {
            backend,
            store,
            feedback,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn processing_ids(&self) -> HashSet<ApplicationId> {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_processing(&self, id: &ApplicationId) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(id)
    }

    pub async fn accept_interview(
        &self,
        id: &ApplicationId,
        choice: InterviewChoice,
    ) -> Result<String, ActionError> {
        let application = self.permitted(id, InterviewAction::AcceptChoice).await?;

        let has_first = application.interview_first_choice.is_some();
        let slot = application.proposed_choice(choice);
        let Some(slot) = slot.filter(|_| has_first) else {
            debug!(application_id = %id, choice = choice.as_str(), "No proposed time for choice");
            return Err(ActionError::InvalidChoice(choice));
        };

        let request = AcceptInterviewRequest {
            selected_choice: choice,
        };
        self.run(id, "accept", self.backend.accept_interview(id, request), || {
            format!("Interview confirmed for {}", time::format_slot(slot))
        })
        .await
    }

    pub async fn reject_interview(
        &self,
        id: &ApplicationId,
        form: ReasonForm,
    ) -> Result<String, ActionError> {
        self.submit_reason(id, ReasonTarget::Reject, form).await
    }

    pub async fn cancel_interview(
        &self,
        id: &ApplicationId,
        form: ReasonForm,
    ) -> Result<String, ActionError> {
        self.submit_reason(id, ReasonTarget::Cancel, form).await
    }

    /// Reject and cancel share one reason form and one endpoint; they differ
    /// only in which statuses allow them.
    pub async fn submit_reason(
        &self,
        id: &ApplicationId,
        target: ReasonTarget,
        form: ReasonForm,
    ) -> Result<String, ActionError> {
        let reason = form.into_validated()?;
        let action = match target {
            ReasonTarget::Reject => InterviewAction::Reject,
            ReasonTarget::Cancel => InterviewAction::Cancel,
        };
        self.permitted(id, action).await?;

        let request = CancelInterviewRequest::from(reason);
        let success = match target {
            ReasonTarget::Reject => "Interview proposal declined",
            ReasonTarget::Cancel => "Interview cancelled",
        };
        self.run(
            id,
            target.verb(),
            self.backend.cancel_interview(id, request),
            || success.to_string(),
        )
        .await
    }

    /// Client-side legality check against the current snapshot. The backend
    /// may still refuse if the record moved since the last load.
    ///
    /// A refusal here means the card the applicant acted on is out of date,
    /// so it is reported and the list is reloaded.
    async fn permitted(
        &self,
        id: &ApplicationId,
        action: InterviewAction,
    ) -> Result<Application, ActionError> {
        debug_assert!(action.is_performed_by(Actor::Applicant));

        let checked = match self.store.get(id).await {
            None => Err(ActionError::UnknownApplication(id.clone())),
            Some(application) if !application.status.permits(action) => {
                Err(ActionError::NotPermitted(application.status))
            }
            Some(application) => Ok(application),
        };

        if let Err(err) = &checked {
            warn!(application_id = %id, ?action, "Refusing interview action: {}", err);
            if let Err(load_err) = self.store.load().await {
                warn!(application_id = %id, "Refresh after refused action failed: {}", load_err);
            }
            let message = match err {
                ActionError::UnknownApplication(_) => "This application is no longer in your list",
                _ => "This interview has changed. The list has been refreshed.",
            };
            self.feedback.notify(Feedback::error(id, message));
        }
        checked
    }

    async fn run<F, M>(
        &self,
        id: &ApplicationId,
        verb: &'static str,
        call: F,
        success_message: M,
    ) -> Result<String, ActionError>
    where
        F: std::future::Future<Output = Result<(), BackendError>>,
        M: FnOnce() -> String,
    {
        let Some(_processing) = ProcessingGuard::acquire(&self.in_flight, id) else {
            debug!(application_id = %id, verb, "Suppressing duplicate action while in flight");
            return Err(ActionError::InFlight(id.clone()));
        };

        match call.await {
            Ok(()) => {
                info!(application_id = %id, verb, "Interview action accepted by backend");
                if let Err(err) = self.store.load().await {
                    warn!(application_id = %id, "Refresh after {} failed: {}", verb, err);
                }
                let message = success_message();
                self.feedback.notify(Feedback::success(id, message.clone()));
                Ok(message)
            }
            Err(BackendError::Unauthorized) => {
                warn!(application_id = %id, verb, "Session expired during interview action");
                self.store.mark_unauthorized().await;
                Err(BackendError::Unauthorized.into())
            }
            Err(err) => {
                warn!(application_id = %id, verb, "Interview action failed: {}", err);
                let message = match &err {
                    BackendError::Rejected { message, .. } => message.clone(),
                    BackendError::NotFound => "This application no longer exists".to_string(),
                    _ => format!("Could not {} the interview. Please try again.", verb),
                };
                self.feedback.notify(Feedback::error(id, message));
                Err(err.into())
            }
        }
    }
}
