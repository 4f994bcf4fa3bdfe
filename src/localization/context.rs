//! Localization Context
//!
//! Holds the active language and answers string lookups for it. The
//! language choice persists under `preferred_language`.

use super::error::ContentError;
use super::fallback::bundled_string;
use super::loader::{ContentLoader, ContentOrigin};
use super::types::{ContentType, Language, TextDirection};
use crate::storage::{keys, LocalStorage};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// UI strings for one language, keyed by content id
#[derive(Debug, Clone, Serialize)]
pub struct TranslationTable {
    pub language: Language,
    pub direction: TextDirection,
    pub origin: ContentOrigin,
    pub strings: HashMap<String, String>,
}

/// Load the UI string table for a language
///
/// Bundled strings fill in any key the loaded content does not cover.
pub async fn load_translations(
    loader: &ContentLoader,
    language: Language,
) -> Result<TranslationTable, ContentError> {
    let loaded = loader
        .load_content_by_type(ContentType::Ui, language)
        .await?;

    let mut strings: HashMap<String, String> = super::fallback::bundled_strings(language)
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    strings.extend(
        loaded
            .items
            .iter()
            .map(|c| (c.content_id.clone(), c.text.clone())),
    );

    Ok(TranslationTable {
        language,
        direction: language.direction(),
        origin: loaded.origin,
        strings,
    })
}

struct ContextState {
    language: Language,
    strings: HashMap<String, String>,
}

/// Active language and string lookup for one user
pub struct LocalizationContext {
    loader: Arc<ContentLoader>,
    storage: LocalStorage,
    state: RwLock<ContextState>,
}

impl LocalizationContext {
    /// Create a context using the stored language preference (English if unset)
    pub fn new(loader: Arc<ContentLoader>, storage: LocalStorage) -> Self {
        let language = storage
            .get_string(keys::PREFERRED_LANGUAGE)
            .and_then(|code| code.parse().ok())
            .unwrap_or_default();

        Self {
            loader,
            storage,
            state: RwLock::new(ContextState {
                language,
                strings: HashMap::new(),
            }),
        }
    }

    /// Load strings for the active language
    pub async fn initialize(&self) -> Result<ContentOrigin, ContentError> {
        self.reload().await
    }

    pub fn language(&self) -> Language {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .language
    }

    pub fn direction(&self) -> TextDirection {
        self.language().direction()
    }

    pub fn is_rtl(&self) -> bool {
        self.direction() == TextDirection::Rtl
    }

    /// Switch language, persist the choice and load its strings
    pub async fn set_language(&self, language: Language) -> Result<ContentOrigin, ContentError> {
        if let Err(e) = self
            .storage
            .set_string(keys::PREFERRED_LANGUAGE, language.code())
        {
            tracing::warn!(error = %e, "Could not persist language preference");
        }

        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .language = language;

        tracing::info!(language = %language, "Language changed");
        self.reload().await
    }

    /// Re-read strings for the active language through the loader
    pub async fn reload(&self) -> Result<ContentOrigin, ContentError> {
        let language = self.language();
        let table = load_translations(&self.loader, language).await?;

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        // The language may have changed while loading
        if state.language == language {
            state.strings = table.strings;
        }
        Ok(table.origin)
    }

    /// Translate `key`: loaded string, then bundled string, then the key itself
    pub fn t(&self, key: &str) -> String {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .strings
            .get(key)
            .cloned()
            .or_else(|| bundled_string(state.language, key).map(str::to_string))
            .unwrap_or_else(|| key.to_string())
    }

    /// Translate `key` and substitute `{name}` placeholders
    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        params
            .iter()
            .fold(self.t(key), |text, (name, value)| {
                text.replace(&format!("{{{}}}", name), value)
            })
    }

    /// Loader backing this context
    pub fn loader(&self) -> &Arc<ContentLoader> {
        &self.loader
    }
}
