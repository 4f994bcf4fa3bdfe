//! Pillar Scoring
//!
//! Survey results and the rules that turn raw pillar scores into the
//! percentages shown to users and admins.
//!
//! - **types**: `ScoreCalculation`, `PillarScore`, `CustomerProfile`
//! - **display**: percentage normalization and display data
//! - **aggregate**: history series, averages and admin histograms
//!
//! Every surface that shows a pillar percentage (results page, score
//! history, admin histograms) goes through [`calculate_pillar_percentage`],
//! so a given `PillarScore` always renders as the same number.
//!
//! # Example
//!
//! ```rust
//! use finhealth::scoring::{calculate_pillar_percentage, PillarScore};
//!
//! let savings = PillarScore::new("savings_habit", 3.75).max_score(5.0);
//! assert_eq!(calculate_pillar_percentage(&savings), 75.0);
//!
//! let reported = savings.clone().percentage(85.0);
//! assert_eq!(calculate_pillar_percentage(&reported), 85.0);
//! ```

pub mod aggregate;
pub mod display;
pub mod types;

pub use aggregate::{
    history_series, pillar_averages, pillar_histogram, HistogramBucket, HistoryPoint,
    HistorySeries, PillarHistogram,
};
pub use display::{
    calculate_pillar_percentage, get_pillar_display_data, interpretation_for, is_valid_pillar_score,
    overall_percentage, parse_pillar_score, pillar_display_name, PillarDisplayData, ScoreBand,
    DEFAULT_MAX_SCORE,
};
pub use types::{CustomerProfile, Interpretation, PillarScore, ScoreCalculation};
