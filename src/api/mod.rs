//! Financial Health gateway API
//!
//! HTTP layer in front of the UI, built with Axum. It serves localized
//! content out of the shared cache and normalizes pillar scores so every
//! view renders the same numbers.
//!
//! # Endpoints
//!
//! ## Content
//! - `GET /api/v1/content/:type/:lang` - All content of a type in a language
//! - `GET /api/v1/content/:type/:lang/:id` - One content item
//! - `GET /api/v1/translations/:lang` - UI string table
//! - `POST /api/v1/content/invalidate` - Drop cached entries
//! - `DELETE /api/v1/content/cache` - Clear the cache
//! - `POST /api/v1/content/preload` - Warm the cache
//! - `GET /api/v1/content/stats` - Cache statistics
//!
//! ## Scores
//! - `POST /api/v1/scores/display` - Pillar display data
//! - `POST /api/v1/scores/history` - History chart series
//! - `POST /api/v1/admin/pillar-histogram` - Admin score distribution
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use finhealth::api::{serve, ApiConfig, AppState};
//! use finhealth::client::{BackendClient, BackendConfig};
//! use finhealth::localization::{ContentLoader, LoaderConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = BackendClient::new(BackendConfig::default())?;
//!
//!     // The loader retries on its own, so its client makes a single attempt
//!     let content_client = BackendClient::new(BackendConfig {
//!         max_retries: 1,
//!         ..BackendConfig::default()
//!     })?;
//!     let loader = Arc::new(ContentLoader::new(Arc::new(content_client), LoaderConfig::default()));
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::with_backend(loader, backend, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Build the gateway router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Content routes
        .route("/content/stats", get(routes::content::cache_stats))
        .route("/content/invalidate", post(routes::content::invalidate_content))
        .route("/content/preload", post(routes::content::preload_content))
        .route("/content/cache", delete(routes::content::clear_cache))
        .route("/content/:type/:lang", get(routes::content::get_content_by_type))
        .route("/content/:type/:lang/:id", get(routes::content::get_content_item))
        .route("/translations/:lang", get(routes::content::get_translations))
        // Score routes
        .route("/scores/display", post(routes::scores::display_scores))
        .route("/scores/history", post(routes::scores::score_history))
        .route(
            "/admin/pillar-histogram",
            post(routes::scores::admin_pillar_histogram),
        )
        .layer(DefaultBodyLimit::max(state.config.max_body_size));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.cors_origins);
    let timeout = Duration::from_millis(state.config.request_timeout_ms);

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the gateway server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Financial Health gateway listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Financial Health gateway shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::localization::{
        ContentError, ContentLoader, ContentSource, ContentType, Language, LoaderConfig,
        LocalizedContent, RetryPolicy,
    };
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::util::ServiceExt;

    /// Serves UI strings in English; every other request fails
    struct TestSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ContentSource for TestSource {
        async fn fetch_content(
            &self,
            content_type: ContentType,
            language: Language,
        ) -> Result<Vec<LocalizedContent>, ContentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match (content_type, language) {
                (ContentType::Ui, Language::En) => Ok(vec![
                    LocalizedContent::new(ContentType::Ui, "survey.next", Language::En, "Continue"),
                    LocalizedContent::new(ContentType::Ui, "app.title", Language::En, "Financial Health"),
                ]),
                _ => Err(ContentError::Client(ClientError::Unavailable)),
            }
        }
    }

    fn create_test_app() -> (Router, Arc<TestSource>) {
        let source = Arc::new(TestSource {
            calls: AtomicUsize::new(0),
        });
        let loader_config = LoaderConfig {
            retry: RetryPolicy {
                max_attempts: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        let loader = Arc::new(ContentLoader::new(source.clone(), loader_config));
        let state = AppState::new(loader, ApiConfig::default());
        (build_router(state), source)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let (app, _) = create_test_app();
        let response = app.oneshot(get("/health/live")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready_with_fallback() {
        let (app, _) = create_test_app();
        let response = app.oneshot(get("/health/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let (app, _) = create_test_app();
        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["backend"], "not_configured");
    }

    #[tokio::test]
    async fn test_content_then_cache_hit() {
        let (app, source) = create_test_app();

        let response = app.clone().oneshot(get("/api/v1/content/ui/en")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["origin"], "network");
        assert_eq!(body["total"], 2);
        assert_eq!(body["direction"], "ltr");

        let response = app.oneshot(get("/api/v1/content/ui/en")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["origin"], "cache");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_content_falls_back_for_arabic() {
        let (app, _) = create_test_app();
        let response = app.oneshot(get("/api/v1/content/ui/ar")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["origin"], "fallback");
        assert_eq!(body["direction"], "rtl");
        assert!(body["total"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_content_without_fallback_is_bad_gateway() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(get("/api/v1/content/question/en"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "CONTENT_UNAVAILABLE");
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_unsupported_language() {
        let (app, _) = create_test_app();
        let response = app.oneshot(get("/api/v1/content/ui/fr")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_content_item() {
        let (app, _) = create_test_app();

        let response = app
            .clone()
            .oneshot(get("/api/v1/content/ui/en/survey.next"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["text"], "Continue");

        let response = app
            .oneshot(get("/api/v1/content/ui/en/missing.key"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_translations_merge_bundled_strings() {
        let (app, _) = create_test_app();
        let response = app.oneshot(get("/api/v1/translations/en")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["strings"]["survey.next"], "Continue");
        assert!(body["strings"]["survey.back"].is_string());
    }

    #[tokio::test]
    async fn test_invalidate_and_stats() {
        let (app, source) = create_test_app();

        app.clone().oneshot(get("/api/v1/content/ui/en")).await.unwrap();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/content/invalidate",
                serde_json::json!({ "language": "en" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["removed"], 1);

        app.clone().oneshot(get("/api/v1/content/ui/en")).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        let response = app.oneshot(get("/api/v1/content/stats")).await.unwrap();
        let body = body_json(response).await;
        assert_eq!(body["entries"], 1);
        assert_eq!(body["misses"], 2);
    }

    #[tokio::test]
    async fn test_invalidate_requires_filter() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(post_json("/api/v1/content/invalidate", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_clear_cache() {
        let (app, _) = create_test_app();
        app.clone().oneshot(get("/api/v1/content/ui/en")).await.unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/v1/content/cache")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.oneshot(get("/api/v1/content/stats")).await.unwrap();
        assert_eq!(body_json(response).await["entries"], 0);
    }

    #[tokio::test]
    async fn test_preload() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(post_json(
                "/api/v1/content/preload",
                serde_json::json!({ "content_types": ["ui", "question"] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        // ui/en from network, ui/ar bundled, question has no bundled table
        assert_eq!(body["loaded"].as_array().unwrap().len(), 1);
        assert_eq!(body["fallback"].as_array().unwrap().len(), 1);
        assert_eq!(body["failed"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_score_display() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(post_json(
                "/api/v1/scores/display",
                serde_json::json!({
                    "pillar_scores": [
                        { "pillar": "budgeting", "score": 3.75, "max_score": 5 },
                        { "pillar": "savings_habit", "score": 2, "percentage": 85 },
                        { "pillar": "debt_management", "score": 3 },
                        { "pillar": "broken", "score": null },
                        null
                    ],
                    "total_score": 45,
                    "max_possible_score": 60
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let pillars = body["pillars"].as_array().unwrap();
        assert_eq!(pillars.len(), 3);
        assert_eq!(pillars[0]["percentage"], 75.0);
        assert_eq!(pillars[1]["percentage"], 85.0);
        assert_eq!(pillars[2]["percentage"], 60.0);
        assert_eq!(body["skipped"], 2);
        assert_eq!(body["overall_percentage"], 75.0);
    }

    #[tokio::test]
    async fn test_score_display_invalid_json() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/scores/display")
                    .header("Content-Type", "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_score_history() {
        let (app, _) = create_test_app();
        let response = app
            .oneshot(post_json(
                "/api/v1/scores/history",
                serde_json::json!({
                    "results": [
                        {
                            "id": 2, "total_score": 40, "max_possible_score": 50,
                            "created_at": "2026-02-01T09:00:00Z",
                            "pillar_scores": [{ "pillar": "budgeting", "score": 4 }]
                        },
                        {
                            "id": 1, "total_score": 30, "max_possible_score": 50,
                            "created_at": "2026-01-01T09:00:00Z",
                            "pillar_scores": [{ "pillar": "budgeting", "score": 2 }]
                        }
                    ]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["total_results"], 2);
        assert_eq!(body["series"][0]["pillar"], "overall");
        assert_eq!(body["series"][0]["points"][0]["percentage"], 60.0);
        assert_eq!(body["series"][1]["points"][1]["percentage"], 80.0);
        assert_eq!(body["averages"]["budgeting"], 60.0);
    }

    #[tokio::test]
    async fn test_admin_histogram() {
        let (app, _) = create_test_app();
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/admin/pillar-histogram",
                serde_json::json!({
                    "bucket_width": 25,
                    "rows": [
                        { "pillar": "budgeting", "score": 5 },
                        { "pillar": "budgeting", "score": 1 },
                        { "pillar": "budgeting", "score": "n/a" }
                    ]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["unparsed"], 1);
        let buckets = body["pillars"][0]["buckets"].as_array().unwrap();
        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets[0]["count"], 1);
        assert_eq!(buckets[3]["count"], 1);

        let response = app
            .oneshot(post_json(
                "/api/v1/admin/pillar-histogram",
                serde_json::json!({ "bucket_width": 0, "rows": [] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_same_pillar_same_percentage_on_every_surface() {
        let (app, _) = create_test_app();
        let pillar = serde_json::json!({ "name": "budgeting", "score": 5, "maxScore": 10 });

        let display = body_json(
            app.clone()
                .oneshot(post_json(
                    "/api/v1/scores/display",
                    serde_json::json!({ "pillar_scores": [pillar.clone()] }),
                ))
                .await
                .unwrap(),
        )
        .await;

        let history = body_json(
            app.clone()
                .oneshot(post_json(
                    "/api/v1/scores/history",
                    serde_json::json!({
                        "results": [{
                            "id": 1, "total_score": 5, "max_possible_score": 10,
                            "created_at": "2026-03-01T09:00:00Z",
                            "pillar_scores": [pillar.clone()]
                        }]
                    }),
                ))
                .await
                .unwrap(),
        )
        .await;

        let histogram = body_json(
            app.oneshot(post_json(
                "/api/v1/admin/pillar-histogram",
                serde_json::json!({ "bucket_width": 10, "rows": [pillar] }),
            ))
            .await
            .unwrap(),
        )
        .await;

        assert_eq!(display["pillars"][0]["pillar"], "budgeting");
        assert_eq!(display["pillars"][0]["percentage"], 50.0);
        assert_eq!(history["series"][1]["pillar"], "budgeting");
        assert_eq!(history["series"][1]["points"][0]["percentage"], 50.0);
        assert_eq!(history["averages"]["budgeting"], 50.0);
        assert_eq!(histogram["pillars"][0]["mean"], 50.0);
        assert_eq!(histogram["pillars"][0]["buckets"][5]["count"], 1);
    }
}
