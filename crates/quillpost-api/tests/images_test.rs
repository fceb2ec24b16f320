#[allow(dead_code)]
mod helpers;

use axum::http::StatusCode;
use helpers::fixtures::NOT_FOUND_PLACEHOLDER;
use helpers::{setup_test_app, TestAppBuilder};
use serde_json::Value;
use std::time::Duration;

#[tokio::test]
async fn test_get_existing_image_returns_bytes_and_content_type() {
    let app = setup_test_app();
    app.storage.seed("photo.png", b"png-bytes");

    let response = app.server.get("/uploads/photo.png").await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "image/png");
    assert_eq!(response.as_bytes().as_ref(), b"png-bytes");
}

#[tokio::test]
async fn test_reserved_characters_are_rejected_before_storage() {
    let app = setup_test_app();

    for name in [
        "..%2Fetc%2Fpasswd",
        "a%5Cb.png",
        "what%3F.png",
        "star%2A.png",
        "pipe%7C.png",
        "quote%22.png",
        "%3Ctag%3E.png",
        "c%3A.png",
    ] {
        let response = app
            .server
            .get(&format!("/uploads/{}", name))
            .expect_failure()
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_INPUT", "name: {}", name);
    }

    assert_eq!(app.storage.get_calls(), 0);
}

#[tokio::test]
async fn test_cdn_redirects_without_touching_storage() {
    let app = TestAppBuilder::new()
        .settings(|s| {
            s.cdn.enabled = true;
            s.cdn.endpoint = "https://cdn.example.com/blog/".to_string();
        })
        .build();

    let response = app.server.get("/uploads/photo.png").await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(
        response.header("location"),
        "https://cdn.example.com/blog/photo.png"
    );
    assert_eq!(app.storage.get_calls(), 0);
}

#[tokio::test]
async fn test_cdn_still_rejects_reserved_characters() {
    let app = TestAppBuilder::new()
        .settings(|s| {
            s.cdn.enabled = true;
            s.cdn.endpoint = "https://cdn.example.com".to_string();
        })
        .build();

    let response = app
        .server
        .get("/uploads/a%7Cb.png")
        .expect_failure()
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cache_hit_within_window_skips_storage() {
    let app = setup_test_app();
    app.storage.seed("photo.png", b"png-bytes");

    for _ in 0..3 {
        app.server.get("/uploads/photo.png").await.assert_status_ok();
    }

    assert_eq!(app.storage.get_calls(), 1);
}

#[tokio::test]
async fn test_idle_entry_is_fetched_again_after_window() {
    let app = TestAppBuilder::new()
        .cache_window(Duration::from_millis(200))
        .build();
    app.storage.seed("photo.png", b"png-bytes");

    app.server.get("/uploads/photo.png").await.assert_status_ok();
    tokio::time::sleep(Duration::from_millis(500)).await;
    app.server.get("/uploads/photo.png").await.assert_status_ok();

    assert_eq!(app.storage.get_calls(), 2);
}

#[tokio::test]
async fn test_missing_image_serves_friendly_placeholder() {
    let app = setup_test_app();

    let response = app.server.get("/uploads/nope.png").await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "image/png");
    assert_eq!(response.as_bytes().as_ref(), NOT_FOUND_PLACEHOLDER);
}

#[tokio::test]
async fn test_missing_image_is_404_when_placeholder_disabled() {
    let app = TestAppBuilder::new()
        .settings(|s| s.content.use_friendly_not_found_image = false)
        .build();

    let response = app
        .server
        .get("/uploads/nope.png")
        .expect_failure()
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_missing_image_is_cached_within_window() {
    let app = setup_test_app();

    app.server.get("/uploads/nope.png").await.assert_status_ok();
    app.server.get("/uploads/nope.png").await.assert_status_ok();

    assert_eq!(app.storage.get_calls(), 1);
}

#[tokio::test]
async fn test_backend_failure_serves_placeholder_and_is_cached() {
    let app = setup_test_app();
    app.storage.seed("photo.png", b"png-bytes");
    app.storage.break_reads();

    for _ in 0..2 {
        let response = app.server.get("/uploads/photo.png").await;
        response.assert_status_ok();
        assert_eq!(response.as_bytes().as_ref(), NOT_FOUND_PLACEHOLDER);
    }

    assert_eq!(app.storage.get_calls(), 1);
}

#[tokio::test]
async fn test_backend_failure_is_404_when_placeholder_disabled() {
    let app = TestAppBuilder::new()
        .settings(|s| s.content.use_friendly_not_found_image = false)
        .build();
    app.storage.break_reads();

    let response = app
        .server
        .get("/uploads/photo.png")
        .expect_failure()
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
    assert!(!body["error"].as_str().unwrap().contains("connection reset"));
}

#[tokio::test]
async fn test_panicking_storage_becomes_generic_500() {
    let app = setup_test_app();
    app.storage.panic_on_get();

    let response = app
        .server
        .get("/uploads/photo.png")
        .expect_failure()
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["code"], "INTERNAL_ERROR");
}
