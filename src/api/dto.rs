//! Data Transfer Objects
//!
//! Request and response types for the gateway endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::localization::{
    CacheStats, ContentOrigin, ContentType, Language, LocalizedContent, TextDirection,
};
use crate::scoring::{HistorySeries, PillarDisplayData, PillarHistogram, ScoreCalculation};

// ============================================
// CONTENT DTOs
// ============================================

/// Localized content for one (type, language) pair
#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub content_type: ContentType,
    pub language: Language,
    pub direction: TextDirection,
    /// Where the content came from: cache, network or fallback
    pub origin: ContentOrigin,
    pub total: usize,
    pub items: Vec<LocalizedContent>,
}

/// Cache invalidation request; omitted fields match everything
#[derive(Debug, Default, Deserialize)]
pub struct InvalidateRequest {
    #[serde(default)]
    pub content_type: Option<ContentType>,
    #[serde(default)]
    pub language: Option<Language>,
}

/// Cache invalidation response
#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    /// Number of cache entries dropped
    pub removed: usize,
}

/// Preload request; omitted fields mean every language / content type
#[derive(Debug, Default, Deserialize)]
pub struct PreloadRequest {
    #[serde(default)]
    pub languages: Option<Vec<Language>>,
    #[serde(default)]
    pub content_types: Option<Vec<ContentType>>,
}

/// Cache statistics
#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub entries: usize,
    pub memory_bytes: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            entries: stats.entries,
            memory_bytes: stats.memory_bytes,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
        }
    }
}

// ============================================
// SCORE DTOs
// ============================================

/// Pillar scores to normalize for display
///
/// Scores are taken as raw JSON so rows with a missing or non-numeric score
/// are skipped instead of failing the whole request.
#[derive(Debug, Deserialize)]
pub struct ScoreDisplayRequest {
    pub pillar_scores: Vec<serde_json::Value>,
    #[serde(default)]
    pub total_score: Option<f64>,
    #[serde(default)]
    pub max_possible_score: Option<f64>,
}

/// Display-ready pillar data
#[derive(Debug, Serialize)]
pub struct ScoreDisplayResponse {
    pub pillars: Vec<PillarDisplayData>,
    /// Overall percentage, when total and max were supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_percentage: Option<f64>,
    /// Number of rows that were not valid pillar scores
    pub skipped: usize,
}

/// Results to chart over time
#[derive(Debug, Deserialize)]
pub struct ScoreHistoryRequest {
    pub results: Vec<ScoreCalculation>,
}

/// Time series per pillar plus averages
#[derive(Debug, Serialize)]
pub struct ScoreHistoryResponse {
    pub series: Vec<HistorySeries>,
    pub averages: BTreeMap<String, f64>,
    pub total_results: usize,
}

/// Admin pillar score rows to bucket
#[derive(Debug, Deserialize)]
pub struct HistogramRequest {
    pub rows: Vec<serde_json::Value>,
    #[serde(default)]
    pub bucket_width: Option<u32>,
}

/// Admin histogram response
#[derive(Debug, Serialize)]
pub struct HistogramResponse {
    pub bucket_width: u32,
    pub pillars: Vec<PillarHistogram>,
    /// Rows that could not be read as pillar scores at all
    pub unparsed: usize,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, degraded
    pub status: String,
    /// Backend reachability: ok, unreachable, not_configured
    pub backend: String,
    /// Number of cached content entries
    pub cached_content: usize,
    pub uptime_seconds: u64,
    pub version: String,
}
