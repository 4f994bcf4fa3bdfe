//! Survey step state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::SurveyError;
use super::question::{Question, SurveySubmission};
use crate::localization::Language;
use crate::scoring::CustomerProfile;
use crate::storage::LocalStorage;

/// Result of moving forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Moved to the given (0-based) step
    Moved(usize),
    /// Already on the last step with everything answered
    ReadyToSubmit,
}

/// Saved position and answers, restorable after a restart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurveyProgress {
    pub current_step: usize,
    pub answers: BTreeMap<String, i32>,
    pub saved_at: DateTime<Utc>,
}

/// Multi-step survey state
#[derive(Debug, Clone)]
pub struct SurveyFlow {
    steps: Vec<Vec<Question>>,
    current_step: usize,
    answers: BTreeMap<String, i32>,
}

impl SurveyFlow {
    /// Split questions into steps of `per_step`, keeping their order
    pub fn new(questions: Vec<Question>, per_step: usize) -> Result<Self, SurveyError> {
        if questions.is_empty() {
            return Err(SurveyError::NoQuestions);
        }
        if per_step == 0 {
            return Err(SurveyError::InvalidStepSize);
        }

        let steps = questions
            .chunks(per_step)
            .map(|chunk| chunk.to_vec())
            .collect();

        Ok(Self::from_steps(steps))
    }

    /// One step per pillar, in the order pillars first appear
    pub fn by_pillar(questions: Vec<Question>) -> Result<Self, SurveyError> {
        if questions.is_empty() {
            return Err(SurveyError::NoQuestions);
        }

        let mut steps: Vec<Vec<Question>> = Vec::new();
        for question in questions {
            match steps
                .iter_mut()
                .find(|step| step[0].pillar == question.pillar)
            {
                Some(step) => step.push(question),
                None => steps.push(vec![question]),
            }
        }

        Ok(Self::from_steps(steps))
    }

    fn from_steps(steps: Vec<Vec<Question>>) -> Self {
        Self {
            steps,
            current_step: 0,
            answers: BTreeMap::new(),
        }
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn current_questions(&self) -> &[Question] {
        &self.steps[self.current_step]
    }

    pub fn is_first_step(&self) -> bool {
        self.current_step == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step + 1 == self.steps.len()
    }

    fn questions(&self) -> impl Iterator<Item = &Question> {
        self.steps.iter().flatten()
    }

    fn find_question(&self, question_id: &str) -> Option<&Question> {
        self.questions().find(|q| q.id == question_id)
    }

    /// Record an answer; the value must be one of the question's options
    pub fn answer(&mut self, question_id: &str, value: i32) -> Result<(), SurveyError> {
        let question = self
            .find_question(question_id)
            .ok_or_else(|| SurveyError::UnknownQuestion(question_id.to_string()))?;

        if !question.accepts(value) {
            return Err(SurveyError::InvalidOption {
                question_id: question_id.to_string(),
                value,
            });
        }

        self.answers.insert(question_id.to_string(), value);
        Ok(())
    }

    pub fn clear_answer(&mut self, question_id: &str) {
        self.answers.remove(question_id);
    }

    pub fn answer_for(&self, question_id: &str) -> Option<i32> {
        self.answers.get(question_id).copied()
    }

    pub fn answers(&self) -> &BTreeMap<String, i32> {
        &self.answers
    }

    /// Required questions on the current step that have no answer yet
    pub fn unanswered_in_current_step(&self) -> Vec<&Question> {
        self.current_questions()
            .iter()
            .filter(|q| q.required && !self.answers.contains_key(&q.id))
            .collect()
    }

    pub fn can_go_next(&self) -> bool {
        self.unanswered_in_current_step().is_empty()
    }

    /// Move forward, refusing while the current step has unanswered questions
    pub fn next(&mut self) -> Result<Navigation, SurveyError> {
        let missing: Vec<String> = self
            .unanswered_in_current_step()
            .into_iter()
            .map(|q| q.id.clone())
            .collect();
        if !missing.is_empty() {
            return Err(SurveyError::StepIncomplete { missing });
        }

        if self.is_last_step() {
            // Earlier steps can still be missing answers after a restore
            return Ok(match self.first_incomplete_step() {
                Some(step) => {
                    self.current_step = step;
                    Navigation::Moved(step)
                }
                None => Navigation::ReadyToSubmit,
            });
        }

        self.current_step += 1;
        Ok(Navigation::Moved(self.current_step))
    }

    /// Move back one step; answers are kept. Returns false on the first step.
    pub fn back(&mut self) -> bool {
        if self.is_first_step() {
            return false;
        }
        self.current_step -= 1;
        true
    }

    fn required_count(&self) -> usize {
        self.questions().filter(|q| q.required).count()
    }

    fn required_answered(&self) -> usize {
        self.questions()
            .filter(|q| q.required && self.answers.contains_key(&q.id))
            .count()
    }

    /// Share of required questions answered, in [0, 100]
    pub fn progress(&self) -> f64 {
        let required = self.required_count();
        if required == 0 {
            return 100.0;
        }
        self.required_answered() as f64 * 100.0 / required as f64
    }

    /// First step with an unanswered required question
    pub fn first_incomplete_step(&self) -> Option<usize> {
        self.steps.iter().position(|step| {
            step.iter()
                .any(|q| q.required && !self.answers.contains_key(&q.id))
        })
    }

    pub fn is_complete(&self) -> bool {
        self.required_answered() == self.required_count()
    }

    /// Build the backend payload; fails while required answers are missing
    pub fn submission(
        &self,
        profile: Option<CustomerProfile>,
        language: Language,
        consent_session_id: Option<String>,
    ) -> Result<SurveySubmission, SurveyError> {
        if !self.is_complete() {
            return Err(SurveyError::Incomplete {
                missing: self.required_count() - self.required_answered(),
            });
        }

        Ok(SurveySubmission {
            responses: self.answers.clone(),
            profile,
            language,
            consent_session_id,
        })
    }

    pub fn snapshot(&self) -> SurveyProgress {
        SurveyProgress {
            current_step: self.current_step,
            answers: self.answers.clone(),
            saved_at: Utc::now(),
        }
    }

    /// Restore a snapshot taken against a possibly different question set
    ///
    /// Answers to unknown questions or with values no longer offered are
    /// dropped. The step index is clamped to the available steps and never
    /// lands past a step that still needs answers.
    pub fn restore(&mut self, progress: &SurveyProgress) {
        let answers: BTreeMap<String, i32> = progress
            .answers
            .iter()
            .filter(|(id, value)| {
                self.find_question(id)
                    .map(|q| q.accepts(**value))
                    .unwrap_or(false)
            })
            .map(|(id, value)| (id.clone(), *value))
            .collect();

        let dropped = progress.answers.len() - answers.len();
        if dropped > 0 {
            tracing::debug!(dropped, "Dropped stale answers from saved progress");
        }

        self.answers = answers;
        let saved_step = progress.current_step.min(self.steps.len() - 1);
        self.current_step = match self.first_incomplete_step() {
            Some(step) => step.min(saved_step),
            None => saved_step,
        };
    }

    /// Persist progress under `key` (`surveyProgress` for the main survey)
    pub fn save_progress(&self, storage: &LocalStorage, key: &str) -> Result<(), SurveyError> {
        storage.set_json(key, &self.snapshot())?;
        Ok(())
    }

    /// Restore progress saved earlier; returns false when none was usable
    pub fn load_progress(&mut self, storage: &LocalStorage, key: &str) -> bool {
        match storage.get_json::<SurveyProgress>(key) {
            Some(progress) => {
                self.restore(&progress);
                true
            }
            None => false,
        }
    }

    /// Forget saved progress (after submission or on retake)
    pub fn clear_progress(storage: &LocalStorage, key: &str) -> Result<(), SurveyError> {
        storage.remove(key)?;
        Ok(())
    }
}
