//! Pillar percentage normalization
//!
//! The one place that decides what percentage a pillar score shows.
//! Results, history charts and admin histograms all call into here.

use crate::scoring::types::{Interpretation, PillarScore};
use serde::{Deserialize, Serialize};

/// Max raw score assumed when a pillar does not carry one
pub const DEFAULT_MAX_SCORE: f64 = 5.0;

/// Percentage of a pillar score, always in [0, 100]
///
/// A finite backend `percentage` takes priority (clamped). Otherwise the
/// percentage is `score / max_score * 100` with `max_score` defaulting to
/// [`DEFAULT_MAX_SCORE`]. A non-positive max or non-finite score yields 0.
pub fn calculate_pillar_percentage(pillar: &PillarScore) -> f64 {
    if let Some(percentage) = pillar.percentage.filter(|p| p.is_finite()) {
        return percentage.clamp(0.0, 100.0);
    }

    let max_score = pillar
        .max_score
        .filter(|m| m.is_finite())
        .unwrap_or(DEFAULT_MAX_SCORE);

    if max_score <= 0.0 || !pillar.score.is_finite() {
        return 0.0;
    }

    // Multiply first so exact inputs like 3/5 stay exact
    (pillar.score * 100.0 / max_score).clamp(0.0, 100.0)
}

/// Whether a pillar score can be displayed at all
pub fn is_valid_pillar_score(pillar: Option<&PillarScore>) -> bool {
    match pillar {
        Some(p) => p.score.is_finite(),
        None => false,
    }
}

/// Total score as a percentage of the maximum, in [0, 100]
///
/// Non-finite input or a non-positive maximum gives 0.
pub fn overall_percentage(total: f64, max: f64) -> f64 {
    if !total.is_finite() || !max.is_finite() || max <= 0.0 {
        return 0.0;
    }
    (total * 100.0 / max).clamp(0.0, 100.0)
}

/// Parse a pillar score out of an untyped JSON payload
///
/// Accepts both snake_case and camelCase field names. Returns `None` for
/// null, non-objects and rows whose score is missing or not a number.
pub fn parse_pillar_score(value: &serde_json::Value) -> Option<PillarScore> {
    let obj = value.as_object()?;

    let score = obj.get("score")?.as_f64()?;
    let pillar = obj
        .get("pillar")
        .or_else(|| obj.get("name"))
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let number = |snake: &str, camel: &str| {
        obj.get(snake)
            .or_else(|| obj.get(camel))
            .and_then(|v| v.as_f64())
    };

    let interpretation = obj
        .get("interpretation")
        .and_then(|v| serde_json::from_value::<Interpretation>(v.clone()).ok());

    let parsed = PillarScore {
        pillar,
        score,
        max_score: number("max_score", "maxScore"),
        percentage: number("percentage", "percentage"),
        interpretation,
    };

    is_valid_pillar_score(Some(&parsed)).then_some(parsed)
}

/// Interpretation label for a percentage
pub fn interpretation_for(percentage: f64) -> Interpretation {
    if percentage >= 80.0 {
        Interpretation::Excellent
    } else if percentage >= 60.0 {
        Interpretation::Good
    } else if percentage >= 40.0 {
        Interpretation::NeedsImprovement
    } else {
        Interpretation::AtRisk
    }
}

/// Color band used by charts and progress bars
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Green,
    Blue,
    Amber,
    Red,
}

impl ScoreBand {
    pub fn hex(&self) -> &'static str {
        match self {
            ScoreBand::Green => "#16a34a",
            ScoreBand::Blue => "#2563eb",
            ScoreBand::Amber => "#d97706",
            ScoreBand::Red => "#dc2626",
        }
    }
}

impl From<Interpretation> for ScoreBand {
    fn from(interpretation: Interpretation) -> Self {
        match interpretation {
            Interpretation::Excellent => ScoreBand::Green,
            Interpretation::Good => ScoreBand::Blue,
            Interpretation::NeedsImprovement => ScoreBand::Amber,
            Interpretation::AtRisk => ScoreBand::Red,
        }
    }
}

/// Everything a view needs to render one pillar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PillarDisplayData {
    pub pillar: String,
    pub display_name: String,
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub rounded_percentage: u32,
    pub interpretation: Interpretation,
    pub band: ScoreBand,
}

/// Build display data for a pillar score
///
/// The backend interpretation label is kept when present; otherwise it is
/// derived from the normalized percentage.
pub fn get_pillar_display_data(pillar: &PillarScore) -> PillarDisplayData {
    let percentage = calculate_pillar_percentage(pillar);
    let interpretation = pillar
        .interpretation
        .unwrap_or_else(|| interpretation_for(percentage));

    PillarDisplayData {
        pillar: pillar.pillar.clone(),
        display_name: pillar_display_name(&pillar.pillar),
        score: pillar.score,
        max_score: pillar.max_score.unwrap_or(DEFAULT_MAX_SCORE),
        percentage,
        rounded_percentage: percentage.round() as u32,
        interpretation,
        band: interpretation.into(),
    }
}

/// English display name for a pillar key
///
/// Unknown keys are title-cased ("cash_flow" becomes "Cash Flow").
pub fn pillar_display_name(pillar: &str) -> String {
    let known = match pillar {
        "budgeting" => Some("Budgeting"),
        "savings_habit" => Some("Savings Habit"),
        "debt_management" => Some("Debt Management"),
        "financial_planning" => Some("Financial Planning"),
        "investment_knowledge" => Some("Investment Knowledge"),
        "retirement_planning" => Some("Retirement Planning"),
        "protection" => Some("Financial Protection"),
        "income_stream" => Some("Income Stream"),
        _ => None,
    };

    if let Some(name) = known {
        return name.to_string();
    }

    pillar
        .split(['_', '-', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
