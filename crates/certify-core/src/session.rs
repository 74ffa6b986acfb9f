//! Per-user test session.
//!
//! One session per user: created from a generated test, answered
//! incrementally, submitted once. Generating a new test replaces the
//! session wholesale.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::QuizError;
use crate::generator::{GeneratedTest, Notice, QuestionSource};
use crate::model::{OptionLabel, QuestionRecord};
use crate::scoring::{score, Answers, Results};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub source: QuestionSource,
    pub questions: Vec<QuestionRecord>,
    #[serde(default)]
    pub notices: Vec<Notice>,
    /// Topics reported in the results, including those with no question.
    #[serde(default)]
    pub topic_universe: Vec<String>,
    #[serde(default)]
    answers: Answers,
    #[serde(default)]
    results: Option<Results>,
}

impl TestSession {
    pub fn new(test: GeneratedTest) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            source: test.source,
            questions: test.questions,
            notices: test.notices,
            topic_universe: test.topic_universe,
            answers: Answers::new(),
            results: None,
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn results(&self) -> Option<&Results> {
        self.results.as_ref()
    }

    pub fn is_submitted(&self) -> bool {
        self.results.is_some()
    }

    /// Record the selected option text for question `index`.
    ///
    /// A later answer for the same question replaces the earlier one.
    pub fn answer(&mut self, index: usize, text: impl Into<String>) -> Result<(), QuizError> {
        if self.is_submitted() {
            return Err(QuizError::AlreadySubmitted);
        }
        if index >= self.questions.len() {
            return Err(QuizError::InvalidAnswerIndex {
                index,
                len: self.questions.len(),
            });
        }
        self.answers.insert(index, text.into());
        Ok(())
    }

    /// Record an answer by option label.
    pub fn answer_label(&mut self, index: usize, label: OptionLabel) -> Result<(), QuizError> {
        let text = self
            .questions
            .get(index)
            .and_then(|q| q.option(label))
            .map(str::to_string)
            .ok_or(QuizError::InvalidAnswerIndex {
                index,
                len: self.questions.len(),
            })?;
        self.answer(index, text)
    }

    /// Indices of questions that have no selection yet.
    pub fn unanswered(&self) -> Vec<usize> {
        (0..self.questions.len())
            .filter(|i| !self.answers.contains_key(i))
            .collect()
    }

    /// Score the session against its topic universe. Allowed once.
    pub fn submit(&mut self) -> Result<&Results, QuizError> {
        if self.is_submitted() {
            return Err(QuizError::AlreadySubmitted);
        }
        let results = score(&self.questions, &self.answers, &self.topic_universe)?;
        Ok(self.results.insert(results))
    }

    /// Save the session as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize session")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write session to {}", path.display()))?;
        Ok(())
    }

    /// Load a session from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read session from {}", path.display()))?;
        let session: TestSession =
            serde_json::from_str(&content).context("failed to parse session JSON")?;
        Ok(session)
    }
}
