//! Financial Clinic types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::localization::Language;
use crate::scoring::{PillarScore, PillarDisplayData, get_pillar_display_data};

/// Profile collected at the start of a clinic assessment
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FinancialClinicProfile {
    pub name: String,
    pub email: String,
    /// Company whose branded link the user came through
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
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
    #[serde(default)]
    pub children: u32,
}

/// Score for one clinic category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryScore {
    pub score: f64,
    pub max_possible: f64,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub status_level: Option<String>,
}

/// Advice for one category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicInsight {
    pub category: String,
    pub text: String,
    #[serde(default)]
    pub priority: u8,
}

/// Product suggested on the clinic results page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductRecommendation {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Scored clinic assessment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialClinicResult {
    pub total_score: f64,
    /// Overall band label, e.g. "Good"
    pub status_band: String,
    #[serde(default)]
    pub category_scores: BTreeMap<String, CategoryScore>,
    #[serde(default)]
    pub insights: Vec<ClinicInsight>,
    #[serde(default)]
    pub products: Vec<ProductRecommendation>,
}

impl FinancialClinicResult {
    /// Category scores as display data, in category order
    pub fn display_data(&self) -> Vec<PillarDisplayData> {
        self.category_scores
            .iter()
            .map(|(name, score)| get_pillar_display_data(&category_as_pillar(name, score)))
            .collect()
    }

    /// Insights sorted by priority, highest first
    pub fn prioritized_insights(&self) -> Vec<&ClinicInsight> {
        let mut insights: Vec<&ClinicInsight> = self.insights.iter().collect();
        insights.sort_by(|a, b| b.priority.cmp(&a.priority));
        insights
    }
}

/// Treat a clinic category as a pillar so it normalizes like one
pub fn category_as_pillar(category: &str, score: &CategoryScore) -> PillarScore {
    PillarScore {
        pillar: category.to_string(),
        score: score.score,
        max_score: Some(score.max_possible),
        percentage: score.percentage,
        interpretation: None,
    }
}

/// Clinic answers sent for scoring
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicSubmission {
    pub answers: BTreeMap<String, i32>,
    pub profile: FinancialClinicProfile,
    pub language: Language,
    /// Company link slug the assessment was opened from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_url: Option<String>,
}
