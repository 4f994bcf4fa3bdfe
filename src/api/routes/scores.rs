//! Score Routes
//!
//! Display normalization for every surface that renders pillar scores.
//! Scoring itself happens on the backend; these endpoints only turn stored
//! scores into percentages, labels and chart data.
//!
//! - POST /api/v1/scores/display - Results page pillar data
//! - POST /api/v1/scores/history - Score history chart series
//! - POST /api/v1/admin/pillar-histogram - Admin score distribution

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{
    HistogramRequest, HistogramResponse, ScoreDisplayRequest, ScoreDisplayResponse,
    ScoreHistoryRequest, ScoreHistoryResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::scoring::{
    get_pillar_display_data, history_series, overall_percentage, parse_pillar_score,
    pillar_averages, pillar_histogram, PillarScore,
};

/// POST /api/v1/scores/display
pub async fn display_scores(
    Json(req): Json<ScoreDisplayRequest>,
) -> ApiResult<Json<ScoreDisplayResponse>> {
    let parsed: Vec<PillarScore> = req.pillar_scores.iter().filter_map(parse_pillar_score).collect();
    let skipped = req.pillar_scores.len() - parsed.len();

    if skipped > 0 {
        tracing::debug!(skipped, "Skipped invalid pillar scores");
    }

    let overall = match (req.total_score, req.max_possible_score) {
        (Some(total), Some(max)) => Some(overall_percentage(total, max)),
        _ => None,
    };

    Ok(Json(ScoreDisplayResponse {
        pillars: parsed.iter().map(get_pillar_display_data).collect(),
        overall_percentage: overall,
        skipped,
    }))
}

/// POST /api/v1/scores/history
pub async fn score_history(
    Json(req): Json<ScoreHistoryRequest>,
) -> ApiResult<Json<ScoreHistoryResponse>> {
    Ok(Json(ScoreHistoryResponse {
        series: history_series(&req.results),
        averages: pillar_averages(&req.results),
        total_results: req.results.len(),
    }))
}

/// POST /api/v1/admin/pillar-histogram
pub async fn admin_pillar_histogram(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HistogramRequest>,
) -> ApiResult<Json<HistogramResponse>> {
    let bucket_width = req
        .bucket_width
        .unwrap_or(state.config.histogram_bucket_width);
    if bucket_width == 0 || bucket_width > 100 {
        return Err(ApiError::Validation(format!(
            "bucket_width must be between 1 and 100, got {}",
            bucket_width
        )));
    }

    let scores: Vec<PillarScore> = req.rows.iter().filter_map(parse_pillar_score).collect();
    let unparsed = req.rows.len() - scores.len();

    Ok(Json(HistogramResponse {
        bucket_width,
        pillars: pillar_histogram(&scores, bucket_width),
        unparsed,
    }))
}
