//! Survey error types

use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur while filling in a survey
#[derive(Error, Debug)]
pub enum SurveyError {
    #[error("Survey has no questions")]
    NoQuestions,

    #[error("Questions per step must be at least 1")]
    InvalidStepSize,

    #[error("Unknown question: {0}")]
    UnknownQuestion(String),

    #[error("Value {value} is not an option for question {question_id}")]
    InvalidOption { question_id: String, value: i32 },

    #[error("Step incomplete, unanswered: {}", .missing.join(", "))]
    StepIncomplete { missing: Vec<String> },

    #[error("Survey incomplete: {missing} required questions unanswered")]
    Incomplete { missing: usize },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
