//! Integration Tests for the Proxy
//!
//! Runs the real accept loop against a scripted origin on an ephemeral port
//! and drives it with an HTTP client configured to use it as a proxy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use caching_proxy::{api::create_router, proxy, AppState, CacheStore, ProxyContext};
use reqwest::StatusCode;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

// == Helper Functions ==

/// Origin answering every request with a small page that names the path.
async fn spawn_origin() -> (u16, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = requests.clone();

    tokio::spawn(async move {
        loop {
            let (mut stream, _) = listener.accept().await.unwrap();
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut buf).await.unwrap();
                    if n == 0 {
                        return;
                    }
                    request.extend_from_slice(&buf[..n]);
                }

                let text = String::from_utf8_lossy(&request);
                let path = text.split_whitespace().nth(1).unwrap_or("/").to_string();
                let body = format!("origin says {path}");
                let response = format!(
                    "HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\r\n{}",
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.unwrap();
            });
        }
    });

    (port, requests)
}

struct TestProxy {
    port: u16,
    cache: Arc<CacheStore>,
    stop: oneshot::Sender<()>,
    server: JoinHandle<()>,
}

impl TestProxy {
    async fn start(capacity: usize, max_object_size: usize) -> Self {
        let cache = Arc::new(CacheStore::new(capacity));
        let ctx = ProxyContext::new(cache.clone(), max_object_size, Duration::from_secs(2));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (stop, stopped) = oneshot::channel::<()>();
        let server = tokio::spawn(proxy::serve(listener, ctx, async {
            let _ = stopped.await;
        }));

        Self {
            port,
            cache,
            stop,
            server,
        }
    }

    fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .proxy(reqwest::Proxy::http(format!("http://127.0.0.1:{}", self.port)).unwrap())
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    async fn shutdown(self) {
        self.stop.send(()).unwrap();
        self.server.await.unwrap();
    }
}

// == Caching Tests ==

#[tokio::test]
async fn test_repeat_request_served_from_cache() {
    let (origin_port, origin_requests) = spawn_origin().await;
    let proxy = TestProxy::start(4096, 1024).await;
    let client = proxy.client();
    let url = format!("http://127.0.0.1:{origin_port}/index.html");

    let first = client.get(&url).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.text().await.unwrap(), "origin says /index.html");

    let second = client.get(&url).send().await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(second.text().await.unwrap(), "origin says /index.html");

    assert_eq!(origin_requests.load(Ordering::SeqCst), 1);
    let stats = proxy.cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.total_entries, 1);

    proxy.shutdown().await;
}

#[tokio::test]
async fn test_distinct_paths_cached_separately() {
    let (origin_port, origin_requests) = spawn_origin().await;
    let proxy = TestProxy::start(4096, 1024).await;
    let client = proxy.client();

    for path in ["/a", "/b", "/a", "/b"] {
        let url = format!("http://127.0.0.1:{origin_port}{path}");
        let body = client.get(&url).send().await.unwrap().text().await.unwrap();
        assert_eq!(body, format!("origin says {path}"));
    }

    assert_eq!(origin_requests.load(Ordering::SeqCst), 2);
    assert_eq!(proxy.cache.len(), 2);

    proxy.shutdown().await;
}

#[tokio::test]
async fn test_oversized_response_forwarded_but_not_cached() {
    let (origin_port, origin_requests) = spawn_origin().await;
    // Every response from the origin is larger than 16 bytes
    let proxy = TestProxy::start(4096, 16).await;
    let client = proxy.client();
    let url = format!("http://127.0.0.1:{origin_port}/big");

    for _ in 0..2 {
        let body = client.get(&url).send().await.unwrap().text().await.unwrap();
        assert_eq!(body, "origin says /big");
    }

    assert_eq!(origin_requests.load(Ordering::SeqCst), 2);
    assert!(proxy.cache.is_empty());

    proxy.shutdown().await;
}

#[tokio::test]
async fn test_lru_eviction_through_proxy() {
    let (origin_port, origin_requests) = spawn_origin().await;
    const PAGE: &str =
        "HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 14\r\n\r\norigin says /a";
    // Room for exactly two responses of this shape
    let proxy = TestProxy::start(PAGE.len() * 2, 1024).await;
    let client = proxy.client();

    for path in ["/a", "/b", "/a", "/c"] {
        let url = format!("http://127.0.0.1:{origin_port}{path}");
        client.get(&url).send().await.unwrap().text().await.unwrap();
    }

    // The hit on /a made /b the least recently used entry
    let keys: Vec<String> = proxy.cache.entries().into_iter().map(|e| e.key).collect();
    assert_eq!(
        keys,
        vec![
            format!("127.0.0.1:{origin_port}/a"),
            format!("127.0.0.1:{origin_port}/c"),
        ]
    );
    assert_eq!(origin_requests.load(Ordering::SeqCst), 3);
    assert_eq!(proxy.cache.stats().evictions, 1);

    proxy.shutdown().await;
}

// == Error Page Tests ==

#[tokio::test]
async fn test_non_get_method_rejected() {
    let (origin_port, origin_requests) = spawn_origin().await;
    let proxy = TestProxy::start(4096, 1024).await;
    let client = proxy.client();

    let response = client
        .post(format!("http://127.0.0.1:{origin_port}/form"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    assert_eq!(origin_requests.load(Ordering::SeqCst), 0);

    proxy.shutdown().await;
}

#[tokio::test]
async fn test_unreachable_origin_gets_bad_gateway() {
    // Reserve a port and release it so nothing is listening there
    let closed_port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let proxy = TestProxy::start(4096, 1024).await;
    let client = proxy.client();

    let response = client
        .get(format!("http://127.0.0.1:{closed_port}/"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(proxy.cache.is_empty());

    proxy.shutdown().await;
}

// == Admin API Tests ==

#[tokio::test]
async fn test_admin_api_reflects_proxy_traffic() {
    let (origin_port, _) = spawn_origin().await;
    let proxy = TestProxy::start(4096, 1024).await;

    let admin_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let admin_port = admin_listener.local_addr().unwrap().port();
    let app = create_router(AppState::new(proxy.cache.clone()));
    let admin = tokio::spawn(async move {
        axum::serve(admin_listener, app).await.unwrap();
    });

    let client = proxy.client();
    let url = format!("http://127.0.0.1:{origin_port}/stats-page");
    for _ in 0..3 {
        client.get(&url).send().await.unwrap().text().await.unwrap();
    }

    let direct = reqwest::Client::builder().no_proxy().build().unwrap();
    let stats: Value = direct
        .get(format!("http://127.0.0.1:{admin_port}/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(stats["hits"].as_u64().unwrap(), 2);
    assert_eq!(stats["misses"].as_u64().unwrap(), 1);
    assert_eq!(stats["total_entries"].as_u64().unwrap(), 1);

    let purge: Value = direct
        .delete(format!("http://127.0.0.1:{admin_port}/entries/all"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(purge["removed"].as_u64().unwrap(), 1);
    assert!(proxy.cache.is_empty());

    admin.abort();
    proxy.shutdown().await;
}
