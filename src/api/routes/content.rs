//! Content Routes
//!
//! Localized content served from the gateway cache.
//!
//! - GET /api/v1/content/:type/:lang - All content of a type
//! - GET /api/v1/content/:type/:lang/:id - One content item
//! - GET /api/v1/translations/:lang - Merged UI string table
//! - POST /api/v1/content/invalidate - Drop matching cache entries
//! - DELETE /api/v1/content/cache - Drop the whole cache
//! - POST /api/v1/content/preload - Warm the cache
//! - GET /api/v1/content/stats - Cache statistics

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{
    CacheStatsResponse, ContentResponse, InvalidateRequest, InvalidateResponse, PreloadRequest,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::localization::{
    load_translations, ContentKey, ContentType, Language, LocalizedContent, PreloadReport,
    TranslationTable,
};

/// GET /api/v1/content/:type/:lang
pub async fn get_content_by_type(
    State(state): State<Arc<AppState>>,
    Path((content_type, language)): Path<(String, String)>,
) -> ApiResult<Json<ContentResponse>> {
    let content_type: ContentType = content_type.parse()?;
    let language: Language = language.parse()?;

    let loaded = state
        .loader
        .load_content_by_type(content_type, language)
        .await?;

    Ok(Json(ContentResponse {
        content_type,
        language,
        direction: language.direction(),
        origin: loaded.origin,
        total: loaded.items.len(),
        items: loaded.items.as_ref().clone(),
    }))
}

/// GET /api/v1/content/:type/:lang/:id
pub async fn get_content_item(
    State(state): State<Arc<AppState>>,
    Path((content_type, language, content_id)): Path<(String, String, String)>,
) -> ApiResult<Json<LocalizedContent>> {
    let content_type: ContentType = content_type.parse()?;
    let language: Language = language.parse()?;

    state
        .loader
        .get_content(content_type, &content_id, language)
        .await?
        .map(Json)
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "Content '{}' ({}/{}) not found",
                content_id, content_type, language
            ))
        })
}

/// GET /api/v1/translations/:lang
pub async fn get_translations(
    State(state): State<Arc<AppState>>,
    Path(language): Path<String>,
) -> ApiResult<Json<TranslationTable>> {
    let language: Language = language.parse()?;
    Ok(Json(load_translations(&state.loader, language).await?))
}

/// POST /api/v1/content/invalidate
///
/// Admin hook called after translations change on the backend.
pub async fn invalidate_content(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InvalidateRequest>,
) -> ApiResult<Json<InvalidateResponse>> {
    let removed = match (req.content_type, req.language) {
        (Some(content_type), Some(language)) => {
            usize::from(state.loader.invalidate(content_type, language).await)
        }
        (Some(content_type), None) => state.loader.invalidate_type(content_type).await,
        (None, Some(language)) => state.loader.invalidate_language(language).await,
        (None, None) => {
            return Err(ApiError::Validation(
                "content_type or language is required; use DELETE /api/v1/content/cache to clear everything"
                    .to_string(),
            ))
        }
    };

    tracing::info!(
        content_type = ?req.content_type,
        language = ?req.language,
        removed,
        "Content cache invalidated"
    );

    Ok(Json(InvalidateResponse { removed }))
}

/// DELETE /api/v1/content/cache
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> StatusCode {
    state.loader.clear().await;
    StatusCode::NO_CONTENT
}

/// POST /api/v1/content/preload
pub async fn preload_content(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PreloadRequest>,
) -> ApiResult<Json<PreloadReport>> {
    let languages = req.languages.unwrap_or_else(|| Language::ALL.to_vec());
    let content_types = req.content_types.unwrap_or_else(|| ContentType::ALL.to_vec());

    if languages.is_empty() || content_types.is_empty() {
        return Err(ApiError::Validation(
            "Nothing to preload: languages and content_types must not be empty".to_string(),
        ));
    }

    let keys: Vec<ContentKey> = languages
        .iter()
        .flat_map(|&language| {
            content_types
                .iter()
                .map(move |&content_type| ContentKey::new(content_type, language))
        })
        .collect();

    Ok(Json(state.loader.preload(&keys).await))
}

/// GET /api/v1/content/stats
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStatsResponse> {
    Json(state.loader.stats().await.into())
}
