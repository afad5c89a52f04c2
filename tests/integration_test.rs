//! Integration tests for the URL shortener API
//!
//! These tests verify the entire application stack including:
//! - HTTP routing
//! - Request/response handling
//! - Database operations
//! - Error handling

use std::collections::HashSet;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::NamedTempFile;
use tower::ServiceExt;

use tinyurl::auth::{basic_header, UserDirectory};
use tinyurl::config::{parse_users, DEFAULT_USERS};
use tinyurl::model::{ErrorDetails, Record, Statistics};
use tinyurl::route::create_app;
use tinyurl::state::AppState;
use tinyurl::store::RecordStore;

/// Helper function to create a test application with a temporary database
fn setup_test_app() -> (Router, NamedTempFile) {
    let temp_db = NamedTempFile::new().expect("Failed to create temp file");
    let store = RecordStore::open(temp_db.path().to_str().unwrap())
        .expect("Failed to initialize test database");
    let users = UserDirectory::new(parse_users(DEFAULT_USERS).unwrap());

    (create_app(AppState::new(store, users)), temp_db)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();
    (status, bytes.to_vec())
}

fn post_url(user: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/tinyurl")
        .header(header::AUTHORIZATION, basic_header(user, user))
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_as(user: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, basic_header(user, user))
        .body(Body::empty())
        .unwrap()
}

async fn create(app: &Router, user: &str, url: &str) -> Record {
    let (status, body) = send(app, post_url(user, url)).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).expect("Failed to parse record")
}

async fn statistics(app: &Router, user: &str, uri: &str) -> HashSet<Statistics> {
    let (status, body) = send(app, get_as(user, uri)).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice::<Vec<Statistics>>(&body)
        .expect("Failed to parse statistics")
        .into_iter()
        .collect()
}

fn stats(url: &str, creation_count: u64, call_count: u64) -> Statistics {
    Statistics {
        url: url.to_string(),
        creation_count,
        call_count,
    }
}

#[tokio::test]
async fn test_create_returns_record_json() {
    let (app, _temp_db) = setup_test_app();

    let (status, body) = send(&app, post_url("user", "https://www.testo.com")).await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(!body["id"].as_str().unwrap().is_empty());
    assert_eq!(body["userId"], "user");
    assert_eq!(body["url"], "https://www.testo.com");
    assert_eq!(body["creationCount"], 1);
    assert_eq!(body["callCount"], 0);
}

#[tokio::test]
async fn test_create_twice_bumps_creation_count() {
    let (app, _temp_db) = setup_test_app();

    let first = create(&app, "admin", "http://www.gmail.com/").await;
    let second = create(&app, "admin", "http://www.gmail.com/").await;

    assert_eq!(second.id, first.id);
    assert_eq!(second.creation_count, 2);
}

#[tokio::test]
async fn test_create_trims_body() {
    let (app, _temp_db) = setup_test_app();

    let record = create(&app, "user", "  http://news.google.de/\n").await;
    assert_eq!(record.url, "http://news.google.de/");

    let again = create(&app, "user", "http://news.google.de/").await;
    assert_eq!(again.id, record.id);
    assert_eq!(again.creation_count, 2);
}

#[tokio::test]
async fn test_create_invalid_url() {
    let (app, _temp_db) = setup_test_app();

    for input in ["abcde", "www.google.com", "ftp://files.example.com", "   "] {
        let (status, body) = send(&app, post_url("user", input)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "input {input:?}");

        let error: ErrorDetails = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.kind, "Bad Request");
        assert_eq!(error.description, "Request has invalid parameters");
        assert_eq!(error.more_info, format!("Invalid URL - {}", input));
    }
}

#[tokio::test]
async fn test_create_without_body() {
    let (app, _temp_db) = setup_test_app();

    let (status, body) = send(&app, post_url("user", "")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let error: ErrorDetails = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.kind, "Internal Server Error");
    assert_eq!(error.description, "Please contact support team");
    assert!(error.more_info.contains("Required request body is missing"));
}

#[tokio::test]
async fn test_resolve_returns_plain_url() {
    let (app, _temp_db) = setup_test_app();
    let record = create(&app, "user", "http://www.google.com/").await;

    let response = app
        .clone()
        .oneshot(get_as("user", &format!("/api/tinyurl/{}", record.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"http://www.google.com/");
}

#[tokio::test]
async fn test_resolve_counts_calls() {
    let (app, _temp_db) = setup_test_app();
    let record = create(&app, "user", "http://b.com").await;

    for _ in 0..3 {
        let (status, _) = send(&app, get_as("user", &format!("/api/tinyurl/{}", record.id))).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(
        statistics(&app, "user", "/api/tinyurl/user/statistics").await,
        HashSet::from([stats("http://b.com", 1, 3)])
    );
}

#[tokio::test]
async fn test_resolve_other_users_id_is_not_found() {
    let (app, _temp_db) = setup_test_app();
    let record = create(&app, "user", "http://private.com").await;

    let (status, body) = send(&app, get_as("admin", &format!("/api/tinyurl/{}", record.id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let error: ErrorDetails = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        error.more_info,
        format!("No URL available for the userid admin id {}", record.id)
    );
}

#[tokio::test]
async fn test_resolve_blank_id() {
    let (app, _temp_db) = setup_test_app();

    let (status, body) = send(&app, get_as("user", "/api/tinyurl/%20")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let error: ErrorDetails = serde_json::from_slice(&body).unwrap();
    assert!(error.more_info.starts_with("Invalid Tiny URL - "));
}

#[tokio::test]
async fn test_all_statistics_merge_users() {
    let (app, _temp_db) = setup_test_app();

    create(&app, "user", "http://a.com").await;
    create(&app, "user", "http://a.com").await;
    let b = create(&app, "admin", "http://b.com").await;
    create(&app, "admin", "http://a.com").await;
    send(&app, get_as("admin", &format!("/api/tinyurl/{}", b.id))).await;

    assert_eq!(
        statistics(&app, "admin", "/api/tinyurl/statistics").await,
        HashSet::from([stats("http://a.com", 3, 0), stats("http://b.com", 1, 1)])
    );
    assert_eq!(
        statistics(&app, "user", "/api/tinyurl/user/statistics").await,
        HashSet::from([stats("http://a.com", 2, 0)])
    );
    assert_eq!(
        statistics(&app, "admin", "/api/tinyurl/user/statistics").await,
        HashSet::from([stats("http://a.com", 1, 0), stats("http://b.com", 1, 1)])
    );
}

#[tokio::test]
async fn test_admin_reads_other_users_statistics() {
    let (app, _temp_db) = setup_test_app();
    create(&app, "user", "https://koblenz-bringts.de/").await;

    assert_eq!(
        statistics(&app, "admin", "/api/tinyurl/user/user/statistics").await,
        HashSet::from([stats("https://koblenz-bringts.de/", 1, 0)])
    );
    assert!(statistics(&app, "admin", "/api/tinyurl/user/nobody/statistics")
        .await
        .is_empty());
}

#[tokio::test]
async fn test_admin_statistics_blank_user() {
    let (app, _temp_db) = setup_test_app();

    let (status, body) = send(&app, get_as("admin", "/api/tinyurl/user/%20/statistics")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let error: ErrorDetails = serde_json::from_slice(&body).unwrap();
    assert!(error.more_info.starts_with("Invalid userId - "));
}

#[tokio::test]
async fn test_statistics_of_empty_store() {
    let (app, _temp_db) = setup_test_app();

    assert!(statistics(&app, "admin", "/api/tinyurl/statistics").await.is_empty());
    assert!(statistics(&app, "user", "/api/tinyurl/user/statistics").await.is_empty());
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let temp_db = NamedTempFile::new().unwrap();
    let path = temp_db.path().to_str().unwrap().to_string();
    let users = || UserDirectory::new(parse_users(DEFAULT_USERS).unwrap());

    let record = {
        let app = create_app(AppState::new(RecordStore::open(&path).unwrap(), users()));
        create(&app, "user", "https://www.amazon.de").await
    };

    let app = create_app(AppState::new(RecordStore::open(&path).unwrap(), users()));
    let (status, body) = send(&app, get_as("user", &format!("/api/tinyurl/{}", record.id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"https://www.amazon.de");
}

#[tokio::test]
async fn test_resolve_trims_id() {
    let (app, _temp_db) = setup_test_app();
    let record = create(&app, "user", "http://www.google.com/").await;

    let (status, body) = send(&app, get_as("user", &format!("/api/tinyurl/%20{}%20", record.id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"http://www.google.com/");
}

#[tokio::test]
async fn test_non_utf8_body_returns_error_json() {
    let (app, _temp_db) = setup_test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/tinyurl")
        .header(header::AUTHORIZATION, basic_header("user", "user"))
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(vec![0xff, 0xfe, 0xfd]))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let error: ErrorDetails = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.kind, "Bad Request");
    assert_eq!(error.description, "Request has invalid parameters");
    assert!(error.more_info.contains("UTF-8"), "{}", error.more_info);
}

#[tokio::test]
async fn test_non_utf8_path_returns_error_json() {
    let (app, _temp_db) = setup_test_app();

    for (user, uri) in [
        ("user", "/api/tinyurl/%FF"),
        ("admin", "/api/tinyurl/user/%FF/statistics"),
    ] {
        let (status, body) = send(&app, get_as(user, uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");

        let error: ErrorDetails = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.description, "Request has invalid parameters");
        assert!(error.more_info.contains("UTF-8"), "{}", error.more_info);
    }
}
