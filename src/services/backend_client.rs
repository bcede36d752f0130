use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value as JsonValue;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::dto::interview_dto::{
    AcceptInterviewRequest, ApplicationListResponse, BackendErrorBody, CancelInterviewRequest,
};
use crate::error::BackendError;
use crate::models::application::ApplicationId;

/// The coordination backend as seen by this client. It is the only authority
/// on application status.
pub trait ApplicationBackend: Send + Sync + 'static {
    fn list_my_applications(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<JsonValue>, BackendError>> + Send;

    fn accept_interview(
        &self,
        id: &ApplicationId,
        request: AcceptInterviewRequest,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Used both to decline a proposal and to withdraw from a confirmed
    /// interview; the backend tells them apart by the current status.
    fn cancel_interview(
        &self,
        id: &ApplicationId,
        request: CancelInterviewRequest,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;
}

#[derive(Clone)]
pub struct HttpApplicationBackend {
    client: Client,
    base_url: Url,
    token: Arc<RwLock<Option<String>>>,
}

impl HttpApplicationBackend {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self {
            client,
            base_url,
            token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn set_token(&self, token: Option<String>) {
        let token = token.filter(|t| !t.trim().is_empty());
        info!(authenticated = token.is_some(), "Updating backend credential");
        if let Ok(mut guard) = self.token.write() {
            *guard = token;
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.read().map(|t| t.is_some()).unwrap_or(false)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::Network(format!("invalid API base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.token.read().ok().and_then(|t| t.clone());
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = self.authorized(request).send().await.map_err(|e| {
            error!("Backend request failed: {}", e);
            BackendError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<BackendErrorBody>(&body)
            .ok()
            .and_then(BackendErrorBody::into_message)
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                } else {
                    body.clone()
                }
            });

        warn!("Backend answered {}: {}", status, message);
        Err(classify(status, message))
    }
}

fn classify(status: StatusCode, message: String) -> BackendError {
    match status {
        StatusCode::UNAUTHORIZED => BackendError::Unauthorized,
        StatusCode::NOT_FOUND => BackendError::NotFound,
        s if s.is_client_error() => BackendError::Rejected {
            status: s.as_u16(),
            message,
        },
        s => BackendError::Server {
            status: s.as_u16(),
            message,
        },
    }
}

impl ApplicationBackend for HttpApplicationBackend {
    async fn list_my_applications(&self, limit: usize) -> Result<Vec<JsonValue>, BackendError> {
        let url = self.endpoint(&["applications", "my"])?;
        debug!("Fetching applications from: {}", url);

        let response = self
            .send(self.client.get(url).query(&[("limit", limit)]))
            .await?;
        let list = response
            .json::<ApplicationListResponse>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(list.into_items())
    }

    async fn accept_interview(
        &self,
        id: &ApplicationId,
        request: AcceptInterviewRequest,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&["applications", id.as_str(), "accept-interview"])?;
        info!(
            "Accepting interview for application {} with {} choice",
            id,
            request.selected_choice.as_str()
        );
        self.send(self.client.post(url).json(&request)).await?;
        Ok(())
    }

    async fn cancel_interview(
        &self,
        id: &ApplicationId,
        request: CancelInterviewRequest,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&["applications", id.as_str(), "cancel-interview-applicant"])?;
        info!(
            "Cancelling interview for application {} ({})",
            id,
            request.reason.code()
        );
        self.send(self.client.post(url).json(&request)).await?;
        Ok(())
    }
}
