//! Question and submission types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::localization::Language;
use crate::scoring::CustomerProfile;

/// One selectable answer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerOption {
    pub value: i32,
    pub label: String,
}

/// A survey question as served by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: String,
    pub text: String,
    /// Pillar this question scores towards
    pub pillar: String,
    pub options: Vec<AnswerOption>,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl Question {
    pub fn new(id: impl Into<String>, pillar: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            pillar: pillar.into(),
            options: Vec::new(),
            required: true,
        }
    }

    /// Builder method: five-point scale with values 1..=5
    pub fn likert(mut self) -> Self {
        self.options = [
            "Strongly disagree",
            "Disagree",
            "Neutral",
            "Agree",
            "Strongly agree",
        ]
        .iter()
        .enumerate()
        .map(|(i, label)| AnswerOption {
            value: i as i32 + 1,
            label: label.to_string(),
        })
        .collect();
        self
    }

    /// Builder method: mark as optional
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn accepts(&self, value: i32) -> bool {
        self.options.iter().any(|o| o.value == value)
    }

    pub fn option_label(&self, value: i32) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
    }
}

/// Payload sent to the backend for scoring
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurveySubmission {
    /// question id → selected option value
    pub responses: BTreeMap<String, i32>,
    #[serde(default)]
    pub profile: Option<CustomerProfile>,
    pub language: Language,
    /// Links the submission to the PDPL consent record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_session_id: Option<String>,
}
