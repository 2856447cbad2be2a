use std::time::Duration;

use bookdash_client::{
    ChannelSettings, ControlAction, ControlOutcome, HttpApi, PollError, ReportStatus, SnapshotApi,
    StartError,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> HttpApi {
    HttpApi::new(ChannelSettings {
        base_url: server.uri(),
        ..ChannelSettings::default()
    })
    .expect("build client")
}

#[tokio::test]
async fn start_download_returns_task_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/start"))
        .and(body_json(serde_json::json!({ "url": "http://example.com/book" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "task_id": "T1"
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let task_id = api.start_download("http://example.com/book").await.unwrap();
    assert_eq!(task_id, "T1");
}

#[tokio::test]
async fn start_download_surfaces_remote_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/start"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "URL is required"
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = api.start_download("").await.unwrap_err();
    assert_eq!(err, StartError::Rejected("URL is required".to_string()));
}

#[tokio::test]
async fn poll_download_parses_a_full_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/progress/T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "percent": 30,
            "current": 3,
            "total": 10,
            "success": 2,
            "fail": 1,
            "log": "Chapter 3",
            "control": "paused",
            "filename": "partial.txt",
            "has_failed": true
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let report = api.poll_download("T1").await.unwrap();
    assert_eq!(report.status, ReportStatus::Running);
    assert!(report.paused);
    assert_eq!(report.percent, 30);
    assert_eq!(report.current, 3);
    assert_eq!(report.total, 10);
    assert_eq!(report.success, 2);
    assert_eq!(report.fail, 1);
    assert_eq!(report.log.as_deref(), Some("Chapter 3"));
    assert_eq!(report.filename.as_deref(), Some("partial.txt"));
    assert!(report.has_failed);
    assert!(!report.is_terminal());
}

#[tokio::test]
async fn poll_download_defaults_absent_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/progress/T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "done",
            "filename": "book.txt"
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let report = api.poll_download("T1").await.unwrap();
    assert_eq!(report.status, ReportStatus::Done);
    assert!(report.is_terminal());
    assert_eq!(report.percent, 0);
    assert!(!report.paused);
    assert!(!report.has_failed);
}

#[tokio::test]
async fn poll_download_maps_unknown_task_to_task_gone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/progress/GHOST"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": "Task not found"
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = api.poll_download("GHOST").await.unwrap_err();
    assert_eq!(err, PollError::TaskGone("Task not found".to_string()));
}

#[tokio::test]
async fn poll_download_maps_transport_failure_to_network() {
    // Nothing listens on this port.
    let api = HttpApi::new(ChannelSettings {
        base_url: "http://127.0.0.1:9".to_string(),
        connect_timeout: Duration::from_millis(200),
        request_timeout: Duration::from_millis(200),
    })
    .expect("build client");

    let err = api.poll_download("T1").await.unwrap_err();
    assert!(matches!(err, PollError::Network(_)));
}

#[tokio::test]
async fn control_round_trip_acknowledges_pause_and_resume() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/control/pause"))
        .and(body_json(serde_json::json!({ "task_id": "T1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "paused"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/control/resume"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "resumed"
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let paused = api.control("T1", ControlAction::Pause).await.unwrap();
    assert_eq!(paused, ControlOutcome::Paused);
    let resumed = api.control("T1", ControlAction::Resume).await.unwrap();
    assert_eq!(resumed, ControlOutcome::Resumed);
}

#[tokio::test]
async fn retry_failed_accepts_plain_acknowledgement() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/retry_failed/T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok"
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    api.retry_failed("T1").await.unwrap();
}

#[tokio::test]
async fn search_round_trip_parses_records() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/search/start"))
        .and(body_json(serde_json::json!({ "keyword": "three body" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "task_id": "S1"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/search/progress/S1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "done",
            "logs": ["Probing source A", "Found 2 hits"],
            "results": [
                {
                    "title": "Book One",
                    "author": "Someone",
                    "source": "source-a",
                    "is_completed": true,
                    "latest": "Chapter 99",
                    "url": "http://source-a.example/book1"
                },
                {
                    "title": "",
                    "url": "http://source-b.example/verify",
                    "is_captcha": true,
                    "snippet": "verify"
                }
            ]
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let task_id = api.start_search("three body").await.unwrap();
    assert_eq!(task_id, "S1");

    let report = api.poll_search("S1").await.unwrap();
    assert!(report.done);
    assert_eq!(report.logs.len(), 2);
    assert_eq!(report.results.len(), 2);
    assert_eq!(report.results[0].title, "Book One");
    assert_eq!(report.results[0].author.as_deref(), Some("Someone"));
    assert!(report.results[0].is_completed);
    assert!(!report.results[0].is_captcha);
    assert!(report.results[1].is_captcha);
    assert_eq!(report.results[1].snippet.as_deref(), Some("verify"));
}

#[tokio::test]
async fn fetch_artifact_returns_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/download/book.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"content".to_vec(), "text/plain"))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let bytes = api.fetch_artifact("book.txt").await.unwrap();
    assert_eq!(bytes, b"content");
}
