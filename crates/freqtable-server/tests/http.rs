//! HTTP boundary tests, driven through the router without a socket.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono::DateTime;
use freqtable::{
    CreateFrequencyTableUsecase, Error, FrequencyMap, InMemoryRepository, RetrievalError,
    WordCountExtractor,
};
use freqtable_server::{AppState, router};
use serde_json::Value;
use tower::ServiceExt;

const URL: &str = "http://github.com/eroatta/freqtable";

/// Serves canned extractions; unknown locators fail like an unreachable remote.
struct StubExtractor {
    extractions: HashMap<String, FrequencyMap>,
}

impl WordCountExtractor for StubExtractor {
    fn extract(&self, url: &str) -> freqtable::Result<FrequencyMap> {
        self.extractions
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Retrieval {
                url: url.to_string(),
                source: RetrievalError::RepositoryNotFound(url.to_string()),
            })
    }
}

fn app() -> Router {
    app_with(HashMap::new())
}

fn app_with(extractions: HashMap<String, FrequencyMap>) -> Router {
    let tables = Arc::new(InMemoryRepository::new());
    let create = Arc::new(CreateFrequencyTableUsecase::new(
        Arc::new(StubExtractor { extractions }),
        tables.clone(),
    ));
    router(AppState::new(create, tables))
}

async fn send(app: Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .expect("request should build");

    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, json)
}

fn assert_validation_error(status: StatusCode, body: &Value, detail: &str) {
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["name"], "validation_error");
    assert_eq!(body["message"], "missing or invalid data");
    assert_eq!(body["details"][0], detail);
}

#[tokio::test]
async fn ping_answers_pong() {
    let (status, body) = send(app(), Method::GET, "/ping", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "message": "pong" }));
}

#[tokio::test]
async fn post_without_body_is_an_invalid_request() {
    let (status, body) = send(app(), Method::POST, "/frequency-tables", None).await;

    assert_validation_error(status, &body, "invalid request");
}

#[tokio::test]
async fn post_with_empty_object_reports_missing_repository() {
    let (status, body) = send(app(), Method::POST, "/frequency-tables", Some("{}")).await;

    assert_validation_error(
        status,
        &body,
        "invalid field 'repository' with value null or empty",
    );
}

#[tokio::test]
async fn post_with_empty_repository_reports_missing_repository() {
    let (status, body) = send(
        app(),
        Method::POST,
        "/frequency-tables",
        Some(r#"{"repository": ""}"#),
    )
    .await;

    assert_validation_error(
        status,
        &body,
        "invalid field 'repository' with value null or empty",
    );
}

#[tokio::test]
async fn post_with_wrong_type_reports_decoder_message() {
    let (status, body) = send(
        app(),
        Method::POST,
        "/frequency-tables",
        Some(r#"{"repository": 123}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["name"], "validation_error");
    let detail = body["details"][0].as_str().expect("detail is a string");
    assert!(
        detail.starts_with("invalid type: integer `123`, expected a string"),
        "unexpected detail: {detail}"
    );
}

#[tokio::test]
async fn post_with_malformed_json_is_rejected() {
    let (status, body) = send(app(), Method::POST, "/frequency-tables", Some("{")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["name"], "validation_error");
    assert_eq!(body["details"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn post_with_relative_url_reports_the_value() {
    let (status, body) = send(
        app(),
        Method::POST,
        "/frequency-tables",
        Some(r#"{"repository": "./github.com/eroatta/freqtable"}"#),
    )
    .await;

    assert_validation_error(
        status,
        &body,
        "invalid field 'repository' with value ./github.com/eroatta/freqtable",
    );
}

#[tokio::test]
async fn extraction_failure_is_an_internal_error() {
    let body_json = format!(r#"{{"repository": "{URL}"}}"#);

    let (status, body) = send(app(), Method::POST, "/frequency-tables", Some(&body_json)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["name"], "internal_error");
    assert_eq!(body["message"], "internal server error");
    assert_eq!(
        body["details"],
        serde_json::json!([format!("error cloning repository {URL}")])
    );
}

#[tokio::test]
async fn created_table_is_returned_and_can_be_fetched() {
    let app = app_with(HashMap::from([(
        URL.to_string(),
        FrequencyMap::from([("frequency".to_string(), 2), ("table".to_string(), 3)]),
    )]));
    let body_json = format!(r#"{{"repository": "{URL}"}}"#);

    let (status, created) = send(
        app.clone(),
        Method::POST,
        "/frequency-tables",
        Some(&body_json),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 1);
    assert_eq!(created["name"], URL);
    let date_created = created["date_created"].as_str().expect("date_created");
    assert!(DateTime::parse_from_rfc3339(date_created).is_ok());
    assert!(created.get("last_updated").is_none());
    assert!(created.get("values").is_none());

    let (status, fetched) = send(app, Method::GET, "/frequency-tables/1", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], 1);
    assert_eq!(fetched["date_created"], created["date_created"]);
    assert_eq!(
        fetched["values"],
        serde_json::json!({ "frequency": 2, "table": 3 })
    );
}

#[tokio::test]
async fn unknown_table_is_not_found() {
    let (status, body) = send(app(), Method::GET, "/frequency-tables/99", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["name"], "not_found");
    assert_eq!(body["details"][0], "frequency table 99 not found");
}

#[tokio::test]
async fn non_numeric_id_is_rejected() {
    let (status, body) = send(app(), Method::GET, "/frequency-tables/abc", None).await;

    assert_validation_error(status, &body, "invalid field 'id' with value abc");
}
