//! Localized content types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::cache::CacheWeight;
use super::error::ContentError;

/// Supported UI languages
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Ar];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    pub fn direction(&self) -> TextDirection {
        match self {
            Language::En => TextDirection::Ltr,
            Language::Ar => TextDirection::Rtl,
        }
    }

    /// Name of the language in that language
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ar => "العربية",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "en-us" | "en-gb" | "english" => Ok(Language::En),
            "ar" | "ar-ae" | "arabic" => Ok(Language::Ar),
            other => Err(ContentError::UnsupportedLanguage(other.to_string())),
        }
    }
}

/// Text direction for layout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }
}

/// Kind of translated content
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Interface labels and messages
    Ui,
    /// Survey questions and their options
    Question,
    /// Advice shown on the results page
    Recommendation,
    /// Pillar names and descriptions
    Pillar,
    /// Email report templates
    Email,
}

impl ContentType {
    pub const ALL: [ContentType; 5] = [
        ContentType::Ui,
        ContentType::Question,
        ContentType::Recommendation,
        ContentType::Pillar,
        ContentType::Email,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Ui => "ui",
            ContentType::Question => "question",
            ContentType::Recommendation => "recommendation",
            ContentType::Pillar => "pillar",
            ContentType::Email => "email",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|ct| ct.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| ContentError::UnknownContentType(s.to_string()))
    }
}

/// Cache key: one entry per (content type, language)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ContentKey {
    pub content_type: ContentType,
    pub language: Language,
}

impl ContentKey {
    pub fn new(content_type: ContentType, language: Language) -> Self {
        Self {
            content_type,
            language,
        }
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.content_type, self.language)
    }
}

/// Answer option attached to question content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentOption {
    pub value: serde_json::Value,
    pub label: String,
}

/// A single translation unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalizedContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub content_type: ContentType,
    pub content_id: String,
    pub language: Language,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<ContentOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<serde_json::Value>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_active() -> bool {
    true
}

impl LocalizedContent {
    pub fn new(
        content_type: ContentType,
        content_id: impl Into<String>,
        language: Language,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            content_type,
            content_id: content_id.into(),
            language,
            text: text.into(),
            title: None,
            options: None,
            extra_data: None,
            version: default_version(),
            is_active: true,
        }
    }

    /// Builder method: set title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder method: set options
    pub fn options(mut self, options: Vec<ContentOption>) -> Self {
        self.options = Some(options);
        self
    }
}

impl CacheWeight for LocalizedContent {
    fn estimated_size(&self) -> usize {
        let options: usize = self
            .options
            .iter()
            .flatten()
            .map(|o| o.label.len() + o.value.to_string().len() + 32)
            .sum();
        let extra = self
            .extra_data
            .as_ref()
            .map(|v| v.to_string().len())
            .unwrap_or(0);

        // Fixed fields plus the heap-allocated strings
        64 + self.content_id.len()
            + self.text.len()
            + self.title.as_ref().map(|t| t.len()).unwrap_or(0)
            + self.version.len()
            + options
            + extra
    }
}
