//! HTTP API driven through the router without a socket.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use septago_server::{AppState, router};
use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;
use tower::ServiceExt;

const SAMPLE: &str = include_str!("../../../puzzles/septago-001.json");

fn puzzle_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("septago-001.json"), SAMPLE).unwrap();
    let broken = r#"{"schema_version": "puzzlefile.v2"}"#;
    std::fs::write(dir.path().join("broken.json"), broken).unwrap();
    dir
}

fn app(dir: &Path) -> Router {
    router(AppState::new(dir))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create(app: &Router) -> (String, Value) {
    let (status, body) = send(
        app,
        Method::POST,
        "/sessions",
        Some(json!({"puzzle": "septago-001.json"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["session_id"].as_str().unwrap().to_string();
    (id, body["props"].clone())
}

fn cell<'a>(props: &'a Value, id: &str) -> &'a Value {
    props["grid"]["cells"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"] == id)
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let dir = puzzle_dir();
    let (status, body) = send(&app(dir.path()), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_list_puzzles_by_file_name() {
    let dir = puzzle_dir();
    std::fs::write(dir.path().join("notes.txt"), "not a puzzle").unwrap();
    std::fs::write(dir.path().join("garbage.json"), "{").unwrap();
    let (status, body) = send(&app(dir.path()), Method::GET, "/puzzles", None).await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["filename"], "broken.json");
    assert_eq!(list[0]["id"], "broken");
    assert_eq!(list[1]["id"], "septago-001");
    assert_eq!(list[1]["title"], "Septago No. 1");
}

#[tokio::test]
async fn test_create_session_returns_initial_props() {
    let dir = puzzle_dir();
    let app = app(dir.path());
    let (_, props) = create(&app).await;
    assert_eq!(props["schema_version"], "crossword.v2.props");
    assert_eq!(props["sync"]["puzzle_id"], "septago-001");
    assert_eq!(props["sync"]["last_client_seq"], 0);
    assert_eq!(props["focus"]["active"]["bar_id"], "h1");
    assert_eq!(props["focus"]["active"]["index"], 0);
    assert_eq!(props["status"]["complete"], false);
}

#[tokio::test]
async fn test_create_session_errors() {
    let dir = puzzle_dir();
    let app = app(dir.path());

    let create = |puzzle: &str| Some(json!({ "puzzle": puzzle }));

    let (status, body) = send(&app, Method::POST, "/sessions", create("../x.json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::POST, "/sessions", create("missing.json")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::POST, "/sessions", create("broken.json")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_events_update_props() {
    let dir = puzzle_dir();
    let app = app(dir.path());
    let (id, _) = create(&app).await;
    let uri = format!("/sessions/{id}/events");

    let event = json!({
        "schema_version": "crossword.v2",
        "event_id": "e1",
        "type": "INPUT_LETTER",
        "payload": {"letter": "p", "client_seq": 4}
    });
    let (status, body) = send(&app, Method::POST, &uri, Some(event.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "applied");
    assert_eq!(cell(&body["props"], "1,0")["letter"], "P");
    assert_eq!(body["props"]["sync"]["last_client_seq"], 4);
    assert_eq!(body["props"]["focus"]["active"]["index"], 1);

    let (_, body) = send(&app, Method::POST, &uri, Some(event)).await;
    assert_eq!(body["outcome"], "duplicate");
    assert_eq!(body["props"]["focus"]["active"]["index"], 1);

    let old = json!({"schema_version": "crossword.v1", "type": "MOVE_NEXT"});
    let (_, body) = send(&app, Method::POST, &uri, Some(old)).await;
    assert_eq!(body["outcome"], "wrong_schema");

    let anonymous = json!({"schema_version": "crossword.v2", "type": "MOVE_NEXT"});
    let (_, body) = send(&app, Method::POST, &uri, Some(anonymous)).await;
    assert_eq!(body["outcome"], "missing_event_id");
    assert_eq!(body["props"]["focus"]["active"]["index"], 1);

    let (status, props) = send(&app, Method::GET, &format!("/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cell(&props, "1,0")["letter"], "P");
}

#[tokio::test]
async fn test_unknown_event_type_is_applied_as_noop() {
    let dir = puzzle_dir();
    let app = app(dir.path());
    let (id, before) = create(&app).await;

    let event = json!({
        "schema_version": "crossword.v2",
        "event_id": "d1",
        "type": "DANCE",
        "payload": null
    });
    let uri = format!("/sessions/{id}/events");
    let (status, body) = send(&app, Method::POST, &uri, Some(event)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "applied");
    assert_eq!(body["props"]["grid"], before["grid"]);
    assert_eq!(body["props"]["focus"], before["focus"]);
}

#[tokio::test]
async fn test_check_then_reset() {
    let dir = puzzle_dir();
    let app = app(dir.path());
    let (id, before) = create(&app).await;
    send(
        &app,
        Method::POST,
        &format!("/sessions/{id}/events"),
        Some(json!({
            "schema_version": "crossword.v2",
            "event_id": "x1",
            "type": "INPUT_LETTER",
            "payload": {"letter": "X"}
        })),
    )
    .await;

    let (status, props) = send(
        &app,
        Method::POST,
        &format!("/sessions/{id}/check"),
        Some(json!({"target": "word"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(props["marks"]["grid"]["1,0"], "wrong");
    assert_eq!(props["marks"]["grid"].as_object().unwrap().len(), 7);

    let (_, props) = send(
        &app,
        Method::POST,
        &format!("/sessions/{id}/check"),
        Some(json!({"target": "puzzle"})),
    )
    .await;
    assert_eq!(props["marks"]["grid"].as_object().unwrap().len(), 33);
    assert_eq!(props["marks"]["hidden"].as_object().unwrap().len(), 2);

    let (status, props) = send(&app, Method::POST, &format!("/sessions/{id}/reset"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cell(&props, "1,0")["letter"], "");
    assert!(props["marks"]["grid"].as_object().unwrap().is_empty());
    assert_ne!(props["sync"]["state_id"], before["sync"]["state_id"]);
}

#[tokio::test]
async fn test_delete_session() {
    let dir = puzzle_dir();
    let app = app(dir.path());
    let (id, _) = create(&app).await;
    let uri = format!("/sessions/{id}");

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], format!("Session not found: {id}"));

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
