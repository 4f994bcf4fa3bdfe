//! # Financial Health
//!
//! UAE Financial Health assessment: survey flow, pillar scoring, bilingual
//! content and the REST backend client, plus a small content gateway.
//!
//! ## Features
//!
//! - **Consistent scoring**: one normalization rule for every pillar percentage
//! - **Bilingual content**: English and Arabic with a TTL/LRU cache and bundled fallback
//! - **Guest first**: take the survey without an account, keep results after login
//! - **PDPL consent**: consent is recorded before any answers are sent
//!
//! ## Modules
//!
//! - [`scoring`]: Pillar percentages, display data and aggregates
//! - [`localization`]: Content cache, loader and translation context
//! - [`survey`]: Stepped questionnaire state
//! - [`auth`]: Email code login and guest data migration
//! - [`consent`]: PDPL consent records
//! - [`client`]: Backend REST client
//! - [`api`]: Content gateway with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use finhealth::client::{BackendClient, BackendConfig};
//! use finhealth::localization::{ContentLoader, ContentType, Language, LoaderConfig};
//! use finhealth::scoring::get_pillar_display_data;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = BackendClient::new(BackendConfig::default())?;
//!     let loader = ContentLoader::new(Arc::new(backend.clone()), LoaderConfig::default());
//!
//!     // Served from cache after the first call, bundled strings if offline
//!     let ui = loader.load_content_by_type(ContentType::Ui, Language::Ar).await?;
//!     println!("{} strings ({:?})", ui.items.len(), ui.origin);
//!
//!     for result in backend.with_token("token").survey_history().await? {
//!         for pillar in &result.pillar_scores {
//!             let data = get_pillar_display_data(pillar);
//!             println!("{}: {}%", data.display_name, data.rounded_percentage);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod clinic;
pub mod config;
pub mod consent;
pub mod localization;
pub mod scoring;
pub mod storage;
pub mod survey;

// Re-export top-level types for convenience
pub use scoring::{
    calculate_pillar_percentage, get_pillar_display_data, is_valid_pillar_score,
    parse_pillar_score, Interpretation, PillarDisplayData, PillarScore, ScoreCalculation,
};

pub use localization::{
    ContentError, ContentLoader, ContentType, Language, LocalizationContext, LocalizedContent,
};

pub use survey::{SurveyError, SurveyFlow};

pub use auth::{AuthError, AuthStore, OtpLogin};

pub use consent::{ConsentError, ConsentManager};

pub use client::{BackendClient, BackendConfig, ClientError};

pub use storage::{LocalStorage, StorageError, StorageResult};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{Config, ConfigError, LoggingConfig};
