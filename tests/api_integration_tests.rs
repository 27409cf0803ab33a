//! Integration Tests for Admin API Endpoints
//!
//! Tests full request/response cycle for each endpoint against a cache
//! that is populated the same way the proxy workers populate it.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use caching_proxy::{api::create_router, cache::CacheStore, AppState};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app(capacity: usize) -> (Router, Arc<CacheStore>) {
    let cache = Arc::new(CacheStore::new(capacity));
    let app = create_router(AppState::new(cache.clone()));
    (app, cache)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let (app, cache) = create_test_app(100);

    cache.insert("example.com:80/a", b"0123456789").unwrap();
    assert!(cache.lookup("example.com:80/a").is_some());
    assert!(cache.lookup("example.com:80/missing").is_none());

    let (status, json) = send(&app, "GET", "/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["hits"].as_u64().unwrap(), 1);
    assert_eq!(json["misses"].as_u64().unwrap(), 1);
    assert_eq!(json["insertions"].as_u64().unwrap(), 1);
    assert_eq!(json["total_entries"].as_u64().unwrap(), 1);
    assert_eq!(json["used_bytes"].as_u64().unwrap(), 10);
    assert_eq!(json["remaining_bytes"].as_u64().unwrap(), 90);
    assert_eq!(json["capacity"].as_u64().unwrap(), 100);
    assert!((json["hit_rate"].as_f64().unwrap() - 0.5).abs() < 0.001);
}

#[tokio::test]
async fn test_stats_track_evictions_and_rejections() {
    let (app, cache) = create_test_app(30);

    for key in ["/a", "/b", "/c", "/d"] {
        cache.insert(key, &[0u8; 10]).unwrap();
    }
    assert!(cache.insert("/huge", &[0u8; 31]).is_err());

    let (status, json) = send(&app, "GET", "/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["evictions"].as_u64().unwrap(), 1);
    assert_eq!(json["rejections"].as_u64().unwrap(), 1);
    assert_eq!(json["total_entries"].as_u64().unwrap(), 3);
    assert_eq!(json["remaining_bytes"].as_u64().unwrap(), 0);
}

// == ENTRIES Endpoint Tests ==

#[tokio::test]
async fn test_entries_endpoint_lists_lru_first() {
    let (app, cache) = create_test_app(100);

    cache.insert("/a", b"aaaa").unwrap();
    cache.insert("/b", b"bb").unwrap();
    cache.insert("/c", b"c").unwrap();
    // Hit on /a moves it to the most recently used end
    assert!(cache.lookup("/a").is_some());

    let (status, json) = send(&app, "GET", "/entries").await;
    assert_eq!(status, StatusCode::OK);

    let entries = json["entries"].as_array().unwrap();
    let keys: Vec<&str> = entries.iter().map(|e| e["key"].as_str().unwrap()).collect();
    assert_eq!(keys, vec!["/b", "/c", "/a"]);
    assert_eq!(entries[2]["size"].as_u64().unwrap(), 4);
    assert!(entries[0].get("cached_at").is_some());

    // Listing is not a hit
    assert_eq!(cache.stats().hits, 1);
}

#[tokio::test]
async fn test_entries_endpoint_empty() {
    let (app, _cache) = create_test_app(100);

    let (status, json) = send(&app, "GET", "/entries").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["entries"].as_array().unwrap().is_empty());
}

// == DELETE Endpoint Tests ==

#[tokio::test]
async fn test_remove_endpoint_success() {
    let (app, cache) = create_test_app(100);
    cache.insert("example.com:80/page", b"payload").unwrap();

    let (status, json) = send(&app, "DELETE", "/entries?key=example.com%3A80%2Fpage").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"].as_str().unwrap(), "example.com:80/page");
    assert!(!cache.contains("example.com:80/page"));
    assert_eq!(cache.remaining_capacity(), 100);

    // Removing again reports it missing
    let (status, json) = send(&app, "DELETE", "/entries?key=example.com%3A80%2Fpage").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_remove_endpoint_not_found() {
    let (app, _cache) = create_test_app(100);

    let (status, json) = send(&app, "DELETE", "/entries?key=nonexistent").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("nonexistent"));
}

#[tokio::test]
async fn test_remove_endpoint_empty_key() {
    let (app, _cache) = create_test_app(100);

    let (status, json) = send(&app, "DELETE", "/entries?key=").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_purge_endpoint() {
    let (app, cache) = create_test_app(100);
    cache.insert("/a", b"1").unwrap();
    cache.insert("/b", b"2").unwrap();

    let (status, json) = send(&app, "DELETE", "/entries/all").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"].as_u64().unwrap(), 2);
    assert!(cache.is_empty());
    assert_eq!(cache.remaining_capacity(), 100);
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _cache) = create_test_app(100);

    let (status, json) = send(&app, "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"].as_str().unwrap(), "healthy");
    assert!(json.get("timestamp").is_some());
}
