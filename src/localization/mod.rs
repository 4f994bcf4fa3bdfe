//! Localization
//!
//! Translated UI strings, questions and recommendations, fetched from the
//! backend per (content type, language) and kept in a TTL cache.
//!
//! ## Architecture
//!
//! - **ContentSource**: where content comes from (the backend in production)
//! - **ContentCache**: TTL + LRU cache with a memory estimate
//! - **ContentLoader**: cache-first loading with retry and bundled fallback
//! - **LocalizationContext**: the active language and string lookup
//!
//! ## Data Flow
//!
//! 1. A view asks the context for a string in the active language
//! 2. The loader serves UI content from cache while it is fresh
//! 3. On a miss it fetches with exponential backoff
//! 4. If every attempt fails the bundled table answers instead

mod cache;
mod context;
mod error;
mod fallback;
mod loader;
mod types;

pub use cache::{CacheConfig, CacheStats, CacheWeight, ContentCache};
pub use context::{load_translations, LocalizationContext, TranslationTable};
pub use error::ContentError;
pub use fallback::{bundled_content, bundled_string, bundled_strings};
pub use loader::{
    ContentLoader, ContentOrigin, ContentSource, LoadedContent, LoaderConfig, PreloadReport,
    RetryPolicy,
};
pub use types::{ContentKey, ContentOption, ContentType, Language, LocalizedContent, TextDirection};
