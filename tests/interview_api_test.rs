use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use interview_coordinator::{router, services::backend_client::HttpApplicationBackend, AppState};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;
use url::Url;

const TOKEN: &str = "applicant-token";

#[derive(Clone, Default)]
struct StubBackend {
    records: Arc<Mutex<Vec<Value>>>,
    mutations: Arc<AtomicUsize>,
}

impl StubBackend {
    fn set_status(&self, id: &str, status: &str) {
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.iter_mut().find(|r| r["id"] == id) {
            record["status"] = json!(status);
        }
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN))
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Login required"})),
    )
}

async fn list_my(State(stub): State<StubBackend>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    let records = stub.records.lock().unwrap().clone();
    (StatusCode::OK, Json(json!({ "data": records })))
}

async fn accept(
    State(stub): State<StubBackend>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    stub.mutations.fetch_add(1, Ordering::SeqCst);
    let mut records = stub.records.lock().unwrap();
    let Some(record) = records.iter_mut().find(|r| r["id"] == id.as_str()) else {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "Not found"})));
    };
    if !matches!(
        record["status"].as_str(),
        Some("INTERVIEW_REQUESTED" | "COORDINATION_NEEDED")
    ) {
        return (
            StatusCode::CONFLICT,
            Json(json!({"message": "Interview can no longer be accepted"})),
        );
    }
    let key = match body["selectedChoice"].as_str() {
        Some("FIRST") => "interviewFirstChoice",
        Some("SECOND") => "interviewSecondChoice",
        _ => return (StatusCode::BAD_REQUEST, Json(json!({"error": "bad choice"}))),
    };
    let slot = record[key].clone();
    if slot.is_null() {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "no such slot"})));
    }
    record["status"] = json!("INTERVIEW_SCHEDULED");
    record["proposedTime"] = slot;
    record["interviewFirstChoice"] = Value::Null;
    record["interviewSecondChoice"] = Value::Null;
    (StatusCode::OK, Json(json!({"success": true})))
}

async fn cancel(
    State(stub): State<StubBackend>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return unauthorized();
    }
    stub.mutations.fetch_add(1, Ordering::SeqCst);
    let mut records = stub.records.lock().unwrap();
    let Some(record) = records.iter_mut().find(|r| r["id"] == id.as_str()) else {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "Not found"})));
    };
    let status = record["status"].as_str().unwrap_or_default().to_string();
    if !matches!(
        status.as_str(),
        "INTERVIEW_REQUESTED" | "COORDINATION_NEEDED" | "CONFIRMED" | "INTERVIEW_SCHEDULED"
    ) {
        return (
            StatusCode::CONFLICT,
            Json(json!({"message": format!("Interview is already {}", status)})),
        );
    }
    record["status"] = json!("CANCELLED");
    record["cancelReason"] = body["reason"].clone();
    record["cancelledBy"] = json!("APPLICANT");
    record["cancelledAt"] = json!(chrono::Utc::now());
    (StatusCode::OK, Json(json!({"success": true})))
}

async fn spawn_backend(records: Vec<Value>) -> (Url, StubBackend) {
    let stub = StubBackend {
        records: Arc::new(Mutex::new(records)),
        ..StubBackend::default()
    };
    let app = Router::new()
        .route("/api/applications/my", get(list_my))
        .route("/api/applications/:id/accept-interview", post(accept))
        .route(
            "/api/applications/:id/cancel-interview-applicant",
            post(cancel),
        )
        .with_state(stub.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub backend");
    });

    let base = Url::parse(&format!("http://{}/api/", addr)).expect("base url");
    (base, stub)
}

async fn setup_app(records: Vec<Value>) -> (Router, StubBackend) {
    let (base, stub) = spawn_backend(records).await;
    let backend = HttpApplicationBackend::new(base, Duration::from_secs(5)).expect("backend");
    let state = AppState::with_backend(backend, 100);
    (router(state), stub)
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn requested(id: &str, second: Option<&str>) -> Value {
    json!({
        "id": id,
        "status": "INTERVIEW_REQUESTED",
        "jobTitle": "Line cook",
        "companyName": "Harbor Diner",
        "interviewMethod": "ONLINE",
        "interviewLink": "https://meet.example.com/line-cook",
        "interviewFirstChoice": "2025-03-01T09:00:00Z",
        "interviewSecondChoice": second,
        "proposedBy": "EMPLOYER",
    })
}

fn confirmed(id: &str) -> Value {
    json!({
        "id": id,
        "status": "CONFIRMED",
        "jobTitle": "Barista",
        "companyName": "Bean There",
        "interviewMethod": "OFFLINE",
        "interviewLocation": "12 Harbor St",
        "proposedTime": "2025-03-02T14:00:00Z",
        "proposedBy": "EMPLOYER",
    })
}

fn pending(id: &str) -> Value {
    json!({"id": id, "status": "PENDING", "jobTitle": "Courier"})
}

#[tokio::test]
async fn accept_first_choice_confirms_interview() {
    let (app, stub) = setup_app(vec![requested("A1", None), pending("P1")]).await;

    let (status, board) = call(&app, "POST", "/api/session", Some(TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board["state"], "ready");
    assert_eq!(board["counts"]["all"], 1);
    assert_eq!(board["counts"]["requested"], 1);
    assert_eq!(board["items"][0]["variant"], "awaiting_response");
    assert_eq!(board["items"][0]["actions"], json!(["accept_first", "reject"]));

    let (status, body) = call(
        &app,
        "POST",
        "/api/interviews/A1/accept",
        None,
        Some(json!({"choice": "FIRST"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], "accept");
    assert!(body["message"].as_str().unwrap().contains("2025-03-01 09:00"));

    let (_, board) = call(&app, "GET", "/api/interviews?tab=confirmed", None, None).await;
    assert_eq!(board["counts"]["confirmed"], 1);
    assert_eq!(board["counts"]["requested"], 0);
    let item = &board["items"][0];
    assert_eq!(item["application"]["status"], "INTERVIEW_SCHEDULED");
    assert_eq!(item["application"]["proposedTime"], "2025-03-01T09:00:00Z");
    assert_eq!(item["variant"], "confirmed");
    assert_eq!(item["processing"], false);

    let (_, feedback) = call(&app, "GET", "/api/feedback", None, None).await;
    assert_eq!(feedback.as_array().unwrap().len(), 1);
    assert_eq!(feedback[0]["level"], "success");
    assert_eq!(stub.mutations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cancel_confirmed_interview_with_reason() {
    let (app, _stub) = setup_app(vec![confirmed("A2")]).await;
    call(&app, "POST", "/api/session", Some(TOKEN), None).await;

    let (status, _) = call(
        &app,
        "POST",
        "/api/interviews/A2/cancel",
        None,
        Some(json!({"reason": "SCHEDULE_CONFLICT"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, board) = call(&app, "GET", "/api/interviews?tab=cancelled", None, None).await;
    let item = &board["items"][0];
    assert_eq!(item["application"]["status"], "CANCELLED");
    assert_eq!(item["application"]["cancelledBy"], "APPLICANT");
    assert_eq!(item["application"]["cancelReason"], "SCHEDULE_CONFLICT");
    assert_eq!(item["variant"], "cancelled");
    assert_eq!(item["actions"], json!([]));
}

#[tokio::test]
async fn invalid_input_never_reaches_backend() {
    let (app, stub) = setup_app(vec![requested("A1", None), confirmed("A2")]).await;
    call(&app, "POST", "/api/session", Some(TOKEN), None).await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/interviews/A2/cancel",
        None,
        Some(json!({"reason": "OTHER", "reasonDetail": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_failed");
    assert!(body["fields"]["__all__"].is_array());

    let (status, body) = call(
        &app,
        "POST",
        "/api/interviews/A2/reject",
        None,
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["fields"]["reason"].is_array());

    let (status, _) = call(
        &app,
        "POST",
        "/api/interviews/A1/accept",
        None,
        Some(json!({"choice": "SECOND"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Form problems are shown inline, not as toasts.
    let (_, feedback) = call(&app, "GET", "/api/feedback", None, None).await;
    assert_eq!(feedback, json!([]));

    let (status, _) = call(
        &app,
        "POST",
        "/api/interviews/A2/accept",
        None,
        Some(json!({"choice": "FIRST"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(stub.mutations.load(Ordering::SeqCst), 0);
    let (_, feedback) = call(&app, "GET", "/api/feedback", None, None).await;
    assert_eq!(feedback.as_array().unwrap().len(), 1);
    assert_eq!(feedback[0]["level"], "error");
    assert_eq!(feedback[0]["application_id"], "A2");
}

#[tokio::test]
async fn backend_refusal_is_reported_and_resolved_by_refresh() {
    let (app, stub) = setup_app(vec![confirmed("A2")]).await;
    call(&app, "POST", "/api/session", Some(TOKEN), None).await;
    stub.set_status("A2", "CANCELLED");

    let (status, body) = call(
        &app,
        "POST",
        "/api/interviews/A2/cancel",
        None,
        Some(json!({"reason": "PERSONAL_REASON"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Interview is already CANCELLED");

    let (_, feedback) = call(&app, "GET", "/api/feedback", None, None).await;
    assert_eq!(feedback[0]["level"], "error");
    assert_eq!(feedback[0]["message"], "Interview is already CANCELLED");

    // The stale copy stays until the next load.
    let (_, board) = call(&app, "GET", "/api/interviews", None, None).await;
    assert_eq!(board["items"][0]["application"]["status"], "CONFIRMED");

    let (_, board) = call(&app, "POST", "/api/interviews/refresh", None, None).await;
    assert_eq!(board["counts"]["cancelled"], 1);
    assert_eq!(board["counts"]["confirmed"], 0);
}

#[tokio::test]
async fn missing_or_rejected_credential_shows_logged_out() {
    let (app, _stub) = setup_app(vec![confirmed("A2")]).await;

    let (_, board) = call(&app, "GET", "/api/interviews", None, None).await;
    assert_eq!(board["state"], "loading");

    let (_, board) = call(&app, "POST", "/api/interviews/refresh", None, None).await;
    assert_eq!(board["state"], "not_logged_in");

    let (status, _) = call(&app, "POST", "/api/session", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, board) = call(&app, "POST", "/api/session", Some("expired"), None).await;
    assert_eq!(board["state"], "not_logged_in");

    let (_, board) = call(&app, "POST", "/api/session", Some(TOKEN), None).await;
    assert_eq!(board["state"], "ready");

    let (status, _) = call(&app, "DELETE", "/api/session", None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, board) = call(&app, "GET", "/api/interviews", None, None).await;
    assert_eq!(board["state"], "not_logged_in");

    let (status, _) = call(
        &app,
        "POST",
        "/api/interviews/A2/cancel",
        None,
        Some(json!({"reason": "PERSONAL_REASON"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lists_reason_vocabulary() {
    let (app, _stub) = setup_app(vec![]).await;

    let (status, reasons) = call(&app, "GET", "/api/interviews/reasons", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let reasons = reasons.as_array().unwrap();
    assert_eq!(reasons.len(), 4);
    assert_eq!(reasons[3]["code"], "OTHER");
    assert_eq!(reasons[3]["requires_detail"], true);
    assert!(reasons[..3].iter().all(|r| r["requires_detail"] == false));

    let (status, health) = call(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["session"], false);
}
