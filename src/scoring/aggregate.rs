//! Score aggregation for charts and the admin dashboard
//!
//! Percentages here always come from [`calculate_pillar_percentage`], the
//! same function the results page uses.

use crate::scoring::display::{calculate_pillar_percentage, is_valid_pillar_score, pillar_display_name};
use crate::scoring::types::{PillarScore, ScoreCalculation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Series key used for the overall score
pub const OVERALL_SERIES: &str = "overall";

/// One point on a score history chart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryPoint {
    pub created_at: DateTime<Utc>,
    pub percentage: f64,
}

/// Percentages of one pillar across submissions, oldest first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistorySeries {
    pub pillar: String,
    pub display_name: String,
    pub points: Vec<HistoryPoint>,
}

impl HistorySeries {
    fn new(pillar: &str) -> Self {
        let display_name = if pillar == OVERALL_SERIES {
            "Overall".to_string()
        } else {
            pillar_display_name(pillar)
        };
        Self {
            pillar: pillar.to_string(),
            display_name,
            points: Vec::new(),
        }
    }

    /// Change between the first and last point
    pub fn trend(&self) -> Option<f64> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) if self.points.len() > 1 => {
                Some(last.percentage - first.percentage)
            }
            _ => None,
        }
    }
}

/// Build chart series from a user's past results
///
/// The first series is always the overall score. Pillar series follow in
/// the order pillars first appear. Invalid pillar scores are skipped.
pub fn history_series(calculations: &[ScoreCalculation]) -> Vec<HistorySeries> {
    let mut ordered: Vec<&ScoreCalculation> = calculations.iter().collect();
    ordered.sort_by_key(|c| c.created_at);

    let mut overall = HistorySeries::new(OVERALL_SERIES);
    let mut pillars: Vec<HistorySeries> = Vec::new();

    for calc in ordered {
        overall.points.push(HistoryPoint {
            created_at: calc.created_at,
            percentage: calc.overall_percentage(),
        });

        for score in &calc.pillar_scores {
            if !is_valid_pillar_score(Some(score)) {
                continue;
            }

            let idx = match pillars.iter().position(|s| s.pillar == score.pillar) {
                Some(idx) => idx,
                None => {
                    pillars.push(HistorySeries::new(&score.pillar));
                    pillars.len() - 1
                }
            };

            pillars[idx].points.push(HistoryPoint {
                created_at: calc.created_at,
                percentage: calculate_pillar_percentage(score),
            });
        }
    }

    std::iter::once(overall).chain(pillars).collect()
}

/// Mean percentage per pillar across submissions
pub fn pillar_averages(calculations: &[ScoreCalculation]) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();

    for score in calculations.iter().flat_map(|c| c.pillar_scores.iter()) {
        if !is_valid_pillar_score(Some(score)) {
            continue;
        }
        let entry = sums.entry(score.pillar.clone()).or_insert((0.0, 0));
        entry.0 += calculate_pillar_percentage(score);
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(pillar, (sum, count))| (pillar, sum / count as f64))
        .collect()
}

/// One histogram bar covering `[start, end)` (the last bar includes 100)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistogramBucket {
    pub start: u32,
    pub end: u32,
    pub count: usize,
}

/// Distribution of percentages for one pillar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PillarHistogram {
    pub pillar: String,
    pub display_name: String,
    pub buckets: Vec<HistogramBucket>,
    pub total: usize,
    pub mean: f64,
    /// Rows dropped because their score was not a finite number
    pub skipped: usize,
}

/// Bucket pillar percentages for the admin dashboard
///
/// `bucket_width` is clamped to 1..=100. Output is sorted by pillar key.
pub fn pillar_histogram(scores: &[PillarScore], bucket_width: u32) -> Vec<PillarHistogram> {
    let width = bucket_width.clamp(1, 100);
    let bucket_count = 100u32.div_ceil(width) as usize;

    let mut by_pillar: BTreeMap<&str, PillarHistogram> = BTreeMap::new();

    for score in scores {
        let histogram = by_pillar
            .entry(score.pillar.as_str())
            .or_insert_with(|| PillarHistogram {
                pillar: score.pillar.clone(),
                display_name: pillar_display_name(&score.pillar),
                buckets: (0..bucket_count as u32)
                    .map(|i| HistogramBucket {
                        start: i * width,
                        end: ((i + 1) * width).min(100),
                        count: 0,
                    })
                    .collect(),
                total: 0,
                mean: 0.0,
                skipped: 0,
            });

        if !is_valid_pillar_score(Some(score)) {
            histogram.skipped += 1;
            continue;
        }

        let percentage = calculate_pillar_percentage(score);
        let idx = ((percentage / width as f64) as usize).min(bucket_count - 1);
        histogram.buckets[idx].count += 1;
        // Running sum; divided once all rows are in
        histogram.mean += percentage;
        histogram.total += 1;
    }

    by_pillar
        .into_values()
        .map(|mut h| {
            if h.total > 0 {
                h.mean /= h.total as f64;
            }
            h
        })
        .collect()
}
