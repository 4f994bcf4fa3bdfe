//! Financial Health gateway
//!
//! Run with: cargo run --bin finhealth
//!
//! Serves cached localized content and display-normalized scores to UI
//! clients. Configuration comes from `config.toml` (see `finhealth-cli config`)
//! with `FINHEALTH_*` environment overrides; `RUST_LOG` overrides the log level.

use finhealth::api::{serve, ApiConfig, AppState};
use finhealth::client::{BackendClient, BackendConfig};
use finhealth::config::Config;
use finhealth::localization::{ContentKey, ContentLoader, ContentType};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_default();
    config.logging.init("finhealth")?;

    tracing::info!("Starting Financial Health gateway v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Backend: {}", config.backend.base_url);

    let backend = BackendClient::new(config.backend.client_config())?;

    // The loader retries content fetches itself
    let content_client = BackendClient::new(BackendConfig {
        max_retries: 1,
        ..config.backend.client_config()
    })?;
    let loader = Arc::new(ContentLoader::new(
        Arc::new(content_client),
        config.content.loader_config(),
    ));

    match backend.health_check().await {
        Ok(()) => tracing::info!("Backend connection verified"),
        Err(e) => tracing::warn!("Backend not available: {} (serving bundled content)", e),
    }

    if !config.content.preload_languages.is_empty() {
        let keys: Vec<ContentKey> = config
            .content
            .preload_languages
            .iter()
            .flat_map(|&language| {
                ContentType::ALL
                    .into_iter()
                    .map(move |content_type| ContentKey::new(content_type, language))
            })
            .collect();
        let loader = Arc::clone(&loader);
        tokio::spawn(async move {
            loader.preload(&keys).await;
        });
    }

    let api_config = ApiConfig::from(&config.gateway);
    let state = AppState::with_backend(loader, backend, api_config.clone());

    serve(state, &api_config).await?;

    tracing::info!("Financial Health gateway stopped");
    Ok(())
}
