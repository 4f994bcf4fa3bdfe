//! Application State
//!
//! Shared state accessible by all gateway handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::client::BackendClient;
use crate::localization::ContentLoader;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Cache-first localized content loader
    pub loader: Arc<ContentLoader>,
    /// Backend client, used for readiness checks
    pub backend: Option<BackendClient>,
    /// Gateway configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state without a backend health target
    pub fn new(loader: Arc<ContentLoader>, config: ApiConfig) -> Self {
        Self {
            loader,
            backend: None,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Create state that reports backend reachability on health checks
    pub fn with_backend(loader: Arc<ContentLoader>, backend: BackendClient, config: ApiConfig) -> Self {
        Self {
            backend: Some(backend),
            ..Self::new(loader, config)
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// Gateway server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
    /// Default admin histogram bucket width in percentage points
    pub histogram_bucket_width: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8090,
            request_timeout_ms: 30_000,
            max_body_size: 10 * 1024 * 1024, // 10MB
            cors_origins: Vec::new(),
            histogram_bucket_width: 10,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&crate::config::GatewayConfig> for ApiConfig {
    fn from(config: &crate::config::GatewayConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            request_timeout_ms: config.request_timeout_secs * 1000,
            cors_origins: config.cors_origins.clone(),
            ..Default::default()
        }
    }
}
