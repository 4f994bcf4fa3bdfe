//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `FINHEALTH_*` environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::OtpConfig;
use crate::client::BackendConfig;
use crate::localization::{CacheConfig, Language, LoaderConfig, RetryPolicy};
use crate::storage::{LocalStorage, MemoryStore, SqliteStore, StorageResult};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend REST API connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    #[serde(default = "default_backend_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_backend_retries")]
    pub max_retries: u32,

    #[serde(default = "default_backend_retry_delay")]
    pub retry_delay_ms: u64,
}

fn default_backend_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_backend_timeout() -> u64 {
    10_000
}

fn default_backend_retries() -> u32 {
    3
}

fn default_backend_retry_delay() -> u64 {
    1000
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            request_timeout_ms: default_backend_timeout(),
            max_retries: default_backend_retries(),
            retry_delay_ms: default_backend_retry_delay(),
        }
    }
}

impl BackendSettings {
    pub fn client_config(&self) -> BackendConfig {
        BackendConfig {
            base_url: self.base_url.clone(),
            request_timeout_ms: self.request_timeout_ms,
            max_retries: self.max_retries,
            retry_delay_ms: self.retry_delay_ms,
        }
    }
}

/// Front-end gateway server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Localized content cache and fetch policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    #[serde(default = "default_max_memory_mb")]
    pub max_memory_mb: usize,

    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,

    #[serde(default = "default_retry_multiplier")]
    pub retry_multiplier: f64,

    #[serde(default = "default_retry_max_delay")]
    pub retry_max_delay_ms: u64,

    #[serde(default = "default_true")]
    pub use_fallback: bool,

    /// Languages to warm on gateway startup
    #[serde(default = "default_preload")]
    pub preload_languages: Vec<Language>,
}

fn default_ttl() -> u64 {
    300
}

fn default_max_entries() -> usize {
    50
}

fn default_max_memory_mb() -> usize {
    5
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_base_delay() -> u64 {
    1000
}

fn default_retry_multiplier() -> f64 {
    2.0
}

fn default_retry_max_delay() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}

fn default_preload() -> Vec<Language> {
    Language::ALL.to_vec()
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            max_entries: default_max_entries(),
            max_memory_mb: default_max_memory_mb(),
            retry_attempts: default_retry_attempts(),
            retry_base_delay_ms: default_retry_base_delay(),
            retry_multiplier: default_retry_multiplier(),
            retry_max_delay_ms: default_retry_max_delay(),
            use_fallback: default_true(),
            preload_languages: default_preload(),
        }
    }
}

impl ContentConfig {
    /// Backoff multiplier, raised to 1.0 when the configured value would
    /// shrink delays or is not a number
    pub fn retry_multiplier(&self) -> f64 {
        if self.retry_multiplier.is_finite() && self.retry_multiplier >= 1.0 {
            self.retry_multiplier
        } else {
            tracing::warn!(
                multiplier = self.retry_multiplier,
                "Invalid retry multiplier, using 1.0"
            );
            1.0
        }
    }

    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            cache: CacheConfig {
                ttl: Duration::from_secs(self.ttl_secs),
                max_entries: self.max_entries,
                max_memory_bytes: self.max_memory_mb * 1024 * 1024,
            },
            retry: RetryPolicy {
                max_attempts: self.retry_attempts,
                base_delay: Duration::from_millis(self.retry_base_delay_ms),
                multiplier: self.retry_multiplier(),
                max_delay: Duration::from_millis(self.retry_max_delay_ms),
            },
            use_fallback: self.use_fallback,
        }
    }
}

/// Local storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Keep local storage on disk; when false everything lives in memory
    #[serde(default = "default_true")]
    pub persistent: bool,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("finhealth").to_string_lossy().to_string())
        .unwrap_or_else(|| "./finhealth_data".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            persistent: default_true(),
        }
    }
}

impl StorageConfig {
    /// Data directory with a leading `~/` expanded
    pub fn resolved_data_dir(&self) -> PathBuf {
        match (self.data_dir.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(&self.data_dir),
        }
    }

    /// Open the configured local storage
    pub fn open(&self) -> StorageResult<LocalStorage> {
        if self.persistent {
            let store = SqliteStore::open(self.resolved_data_dir())?;
            Ok(LocalStorage::new(Arc::new(store)))
        } else {
            Ok(LocalStorage::new(Arc::new(MemoryStore::new())))
        }
    }
}

/// OTP login timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_otp_validity")]
    pub otp_validity_secs: u64,

    #[serde(default = "default_resend_cooldown")]
    pub resend_cooldown_secs: u64,
}

fn default_otp_validity() -> u64 {
    600
}

fn default_resend_cooldown() -> u64 {
    60
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            otp_validity_secs: default_otp_validity(),
            resend_cooldown_secs: default_resend_cooldown(),
        }
    }
}

impl AuthConfig {
    pub fn otp_config(&self) -> OtpConfig {
        OtpConfig {
            code_validity: Duration::from_secs(self.otp_validity_secs),
            resend_cooldown: Duration::from_secs(self.resend_cooldown_secs),
            ..OtpConfig::default()
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Install the global tracing subscriber
    ///
    /// `RUST_LOG` wins over the configured level. `format = "json"` switches
    /// stdout to JSON lines; a configured file always receives JSON.
    pub fn init(&self, crate_filter: &str) -> Result<(), ConfigError> {
        use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| format!("{}={}", crate_filter, self.level).into());

        let json = self.format.eq_ignore_ascii_case("json");
        let json_layer = json.then(|| fmt::layer().json());
        let pretty_layer = (!json).then(fmt::layer);

        let file_layer = match &self.file {
            Some(path) => {
                let file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| ConfigError::Io {
                        path: PathBuf::from(path),
                        error: e.to_string(),
                    })?;
                Some(
                    fmt::layer()
                        .json()
                        .with_ansi(false)
                        .with_writer(std::sync::Mutex::new(file)),
                )
            }
            None => None,
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .with(pretty_layer)
            .with(file_layer)
            .init();

        Ok(())
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("finhealth").join("config.toml")),
            Some(PathBuf::from("/etc/finhealth/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply `FINHEALTH_*` overrides read through `var`
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Backend overrides
        if let Some(url) = var("FINHEALTH_BACKEND_URL") {
            self.backend.base_url = url;
        }
        if let Some(timeout) = var("FINHEALTH_BACKEND_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.backend.request_timeout_ms = timeout;
        }

        // Gateway overrides
        if let Some(host) = var("FINHEALTH_GATEWAY_HOST") {
            self.gateway.host = host;
        }
        if let Some(port) = var("FINHEALTH_GATEWAY_PORT").and_then(|v| v.parse().ok()) {
            self.gateway.port = port;
        }

        // Content overrides
        if let Some(ttl) = var("FINHEALTH_CONTENT_TTL_SECS").and_then(|v| v.parse().ok()) {
            self.content.ttl_secs = ttl;
        }

        // Storage overrides
        if let Some(data_dir) = var("FINHEALTH_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        // Logging overrides
        if let Some(level) = var("FINHEALTH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("FINHEALTH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Financial Health Configuration
#
# Environment variables override these settings:
# - FINHEALTH_BACKEND_URL
# - FINHEALTH_BACKEND_TIMEOUT_MS
# - FINHEALTH_GATEWAY_HOST
# - FINHEALTH_GATEWAY_PORT
# - FINHEALTH_CONTENT_TTL_SECS
# - FINHEALTH_DATA_DIR
# - FINHEALTH_LOG_LEVEL
# - FINHEALTH_LOG_FORMAT

[backend]
# Backend REST API, including the version prefix
base_url = "http://localhost:8000/api/v1"

# Per-request timeout (ms)
request_timeout_ms = 10000

# Attempts per request on connection errors, 429 and 502-504
max_retries = 3
retry_delay_ms = 1000

[gateway]
# Gateway server host
host = "0.0.0.0"

# Gateway server port
port = 8090

# Allowed CORS origins
cors_origins = ["http://localhost:3000", "http://127.0.0.1:3000"]

# Request timeout in seconds
request_timeout_secs = 30

[content]
# How long localized content stays cached (seconds)
ttl_secs = 300

# Cache limits
max_entries = 50
max_memory_mb = 5

# Fetch retry: attempts, first delay, growth factor, delay cap
retry_attempts = 3
retry_base_delay_ms = 1000
retry_multiplier = 2.0
retry_max_delay_ms = 10000

# Serve bundled English/Arabic strings when the backend is unreachable
use_fallback = true

# Languages warmed when the gateway starts
preload_languages = ["en", "ar"]

[storage]
# Directory for the local storage database
data_dir = "~/.local/share/finhealth"

# Set to false to keep local storage in memory only
persistent = true

[auth]
# How long an emailed login code stays valid (seconds)
otp_validity_secs = 600

# Minimum wait before requesting another code (seconds)
resend_cooldown_secs = 60

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/finhealth/finhealth.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.gateway.port, 8090);
        assert_eq!(config.content.ttl_secs, 300);
        assert_eq!(config.content.preload_languages, vec![Language::En, Language::Ar]);
        assert_eq!(config.auth.resend_cooldown_secs, 60);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [backend]
            base_url = "https://api.example.ae/api/v1"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.base_url, "https://api.example.ae/api/v1");
        assert_eq!(config.backend.max_retries, 3);
        assert!(config.content.use_fallback);
    }

    #[test]
    fn test_loader_config_conversion() {
        let loader = ContentConfig::default().loader_config();
        assert_eq!(loader.cache.ttl, Duration::from_secs(300));
        assert_eq!(loader.cache.max_memory_bytes, 5 * 1024 * 1024);
        assert_eq!(loader.retry.max_attempts, 3);
        assert_eq!(loader.retry.max_delay, Duration::from_secs(10));
    }

    #[test]
    fn test_retry_multiplier_below_one_is_raised() {
        let config: Config = toml::from_str(
            r#"
            [content]
            retry_multiplier = -2.0
            "#,
        )
        .unwrap();

        let retry = config.content.loader_config().retry;
        assert_eq!(retry.multiplier, 1.0);
        assert_eq!(retry.delay_for(3), Duration::from_secs(1));

        let content = ContentConfig {
            retry_multiplier: f64::NAN,
            ..ContentConfig::default()
        };
        assert_eq!(content.retry_multiplier(), 1.0);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("FINHEALTH_BACKEND_URL", "http://backend:8000/api/v1"),
            ("FINHEALTH_GATEWAY_PORT", "9000"),
            ("FINHEALTH_CONTENT_TTL_SECS", "not-a-number"),
            ("FINHEALTH_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.backend.base_url, "http://backend:8000/api/v1");
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.content.ttl_secs, 300);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[gateway]\nport = 8123\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.gateway.port, 8123);

        std::fs::write(&path, "[gateway\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_data_dir_expansion() {
        let config = StorageConfig {
            data_dir: "/var/lib/finhealth".to_string(),
            persistent: true,
        };
        assert_eq!(config.resolved_data_dir(), PathBuf::from("/var/lib/finhealth"));

        if let Some(home) = dirs::home_dir() {
            let config = StorageConfig {
                data_dir: "~/.local/share/finhealth".to_string(),
                persistent: true,
            };
            assert_eq!(config.resolved_data_dir(), home.join(".local/share/finhealth"));
        }
    }

    #[test]
    fn test_in_memory_storage() {
        let storage = StorageConfig {
            persistent: false,
            ..Default::default()
        }
        .open()
        .unwrap();
        storage.set_string("k", "v").unwrap();
        assert_eq!(storage.get_string("k").as_deref(), Some("v"));
    }
}
