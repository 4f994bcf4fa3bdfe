//! Core survey result types
//!
//! Field names serialize in the backend's snake_case JSON form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative label attached to a pillar percentage
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Interpretation {
    Excellent,
    Good,
    #[serde(rename = "Needs Improvement", alias = "needs_improvement")]
    NeedsImprovement,
    #[serde(rename = "At Risk", alias = "at_risk")]
    AtRisk,
}

impl Interpretation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interpretation::Excellent => "Excellent",
            Interpretation::Good => "Good",
            Interpretation::NeedsImprovement => "Needs Improvement",
            Interpretation::AtRisk => "At Risk",
        }
    }

    /// Key used to look up the localized label
    pub fn translation_key(&self) -> &'static str {
        match self {
            Interpretation::Excellent => "interpretation.excellent",
            Interpretation::Good => "interpretation.good",
            Interpretation::NeedsImprovement => "interpretation.needs_improvement",
            Interpretation::AtRisk => "interpretation.at_risk",
        }
    }
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score for one financial health pillar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PillarScore {
    /// Pillar key, e.g. "savings_habit"
    #[serde(alias = "name")]
    pub pillar: String,
    /// Raw score
    pub score: f64,
    /// Maximum raw score (5 when absent)
    #[serde(default, alias = "maxScore", skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    /// Percentage computed by the backend; wins over `score / max_score`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<Interpretation>,
}

impl PillarScore {
    pub fn new(pillar: impl Into<String>, score: f64) -> Self {
        Self {
            pillar: pillar.into(),
            score,
            max_score: None,
            percentage: None,
            interpretation: None,
        }
    }

    /// Builder method: set max score
    pub fn max_score(mut self, max_score: f64) -> Self {
        self.max_score = Some(max_score);
        self
    }

    /// Builder method: set backend percentage
    pub fn percentage(mut self, percentage: f64) -> Self {
        self.percentage = Some(percentage);
        self
    }

    /// Builder method: set interpretation label
    pub fn interpretation(mut self, interpretation: Interpretation) -> Self {
        self.interpretation = Some(interpretation);
        self
    }
}

/// Demographic profile collected before the survey
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomerProfile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emirate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub household_size: Option<u32>,
    #[serde(default)]
    pub children: u32,
}

impl CustomerProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Result of one survey submission
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreCalculation {
    pub id: i64,
    /// Absent for guest submissions
    #[serde(default)]
    pub user_id: Option<i64>,
    pub total_score: f64,
    pub max_possible_score: f64,
    #[serde(default)]
    pub pillar_scores: Vec<PillarScore>,
    #[serde(default)]
    pub advice: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub profile: Option<CustomerProfile>,
}

impl ScoreCalculation {
    /// Total score as a percentage of the maximum, in [0, 100]
    pub fn overall_percentage(&self) -> f64 {
        super::display::overall_percentage(self.total_score, self.max_possible_score)
    }

    pub fn is_guest(&self) -> bool {
        self.user_id.is_none()
    }

    pub fn pillar(&self, name: &str) -> Option<&PillarScore> {
        self.pillar_scores.iter().find(|p| p.pillar == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ScoreCalculation {
        ScoreCalculation {
            id: 7,
            user_id: None,
            total_score: 60.0,
            max_possible_score: 80.0,
            pillar_scores: vec![PillarScore::new("budgeting", 4.0)],
            advice: vec!["Track your spending".to_string()],
            created_at: Utc::now(),
            profile: None,
        }
    }

    #[test]
    fn test_overall_percentage() {
        assert_eq!(sample().overall_percentage(), 75.0);

        let mut zero = sample();
        zero.max_possible_score = 0.0;
        assert_eq!(zero.overall_percentage(), 0.0);

        let mut over = sample();
        over.total_score = 120.0;
        assert_eq!(over.overall_percentage(), 100.0);
    }

    #[test]
    fn test_interpretation_serde_labels() {
        let json = serde_json::to_string(&Interpretation::NeedsImprovement).unwrap();
        assert_eq!(json, r#""Needs Improvement""#);

        let parsed: Interpretation = serde_json::from_str(r#""at_risk""#).unwrap();
        assert_eq!(parsed, Interpretation::AtRisk);
    }

    #[test]
    fn test_deserialize_backend_payload() {
        let json = r#"{
            "id": 12,
            "total_score": 52.5,
            "max_possible_score": 75,
            "pillar_scores": [
                {"pillar": "savings_habit", "score": 3.75, "max_score": 5, "percentage": 75.0, "interpretation": "Good"},
                {"pillar": "debt_management", "score": 2}
            ],
            "advice": [],
            "created_at": "2026-03-01T10:00:00Z"
        }"#;

        let calc: ScoreCalculation = serde_json::from_str(json).unwrap();
        assert!(calc.is_guest());
        assert_eq!(calc.pillar_scores.len(), 2);
        assert_eq!(
            calc.pillar("savings_habit").unwrap().interpretation,
            Some(Interpretation::Good)
        );
        assert_eq!(calc.pillar("debt_management").unwrap().max_score, None);
    }

    #[test]
    fn test_full_name() {
        let profile = CustomerProfile {
            first_name: "Mariam".to_string(),
            ..Default::default()
        };
        assert_eq!(profile.full_name(), "Mariam");
    }
}
