//! Common test utilities for in-process API testing.
//!
//! This module provides a test fixture that builds the router over a
//! temporary SQLite history store, the in-process cache and a scripted
//! prober, so no live peers are needed.

// Each test binary uses a different subset of the fixture.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use seedwatch_core::{
    config::{AnnounceConfig, DatabaseConfig, HistoryConfig, HitRunConfig},
    history::{HistoryStore, SqliteHistoryStore},
    testing::MockProber,
    Config, MemoryCache,
};

/// Re-export fixtures for test convenience
pub use seedwatch_core::testing::fixtures;

/// Test fixture for API tests.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_history() {
///     let fixture = TestFixture::new();
///     fixture.seed(fixtures::torrent(1, "A"), fixtures::session(7, 1));
///
///     let response = fixture.get("/api/v1/users/7/history").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// History store behind the router - seed rows here
    pub store: Arc<SqliteHistoryStore>,
    /// Probe results cache
    pub cache: Arc<MemoryCache>,
    /// Scripted prober - control connectability outcomes
    pub prober: Arc<MockProber>,
    /// Keeps the temporary database directory alive
    _temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a fixture with hit-and-run enforcement (200s, 50% buffer)
    /// and a prober that reports every peer connectable.
    pub fn new() -> Self {
        Self::with_prober(MockProber::connectable())
    }

    pub fn with_prober(prober: MockProber) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let config = Config {
            database: DatabaseConfig { path: db_path.clone() },
            hitrun: HitRunConfig {
                enabled: true,
                seedtime: 200,
                buffer: 0.5,
            },
            announce: AnnounceConfig {
                connectable_check: true,
                connectable_check_interval: 600,
                max_concurrent_probes: 4,
            },
            history: HistoryConfig {
                default_per_page: 10,
                max_per_page: 20,
                query_timeout_secs: 5,
            },
            ..Default::default()
        };

        let store = Arc::new(
            SqliteHistoryStore::new(&db_path).expect("Failed to create history store"),
        );
        let cache = Arc::new(MemoryCache::new());
        let prober = Arc::new(prober);

        let state = Arc::new(seedwatch_server::state::AppState::new(
            config,
            Arc::clone(&store) as Arc<dyn HistoryStore>,
            cache.clone(),
            prober.clone(),
        ));

        let router = seedwatch_server::api::create_router(state);

        Self {
            router,
            store,
            cache,
            prober,
            _temp_dir: temp_dir,
        }
    }

    /// Insert a torrent and one session record against it.
    pub fn seed(
        &self,
        torrent: seedwatch_core::TorrentSummary,
        record: seedwatch_core::SessionRecord,
    ) {
        self.store
            .upsert_torrent(&torrent)
            .expect("Failed to insert torrent");
        self.store
            .upsert_session(&record)
            .expect("Failed to insert session");
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}
