//! Survey Flow
//!
//! Multi-step questionnaire state: questions grouped into steps, the
//! answers given so far, and navigation that only moves forward once every
//! required question on the current step is answered.

mod error;
mod flow;
mod question;

pub use error::SurveyError;
pub use flow::{Navigation, SurveyFlow, SurveyProgress};
pub use question::{AnswerOption, Question, SurveySubmission};
