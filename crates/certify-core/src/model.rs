//! Core data model types for certify.
//!
//! A [`QuestionRecord`] can only be built through validation, so every
//! record in memory satisfies `correct_answer ∈ keys(options)`.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Label of one of the four options of a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    /// All labels in display order.
    pub const ALL: [OptionLabel; 4] = [
        OptionLabel::A,
        OptionLabel::B,
        OptionLabel::C,
        OptionLabel::D,
    ];
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionLabel::A => write!(f, "A"),
            OptionLabel::B => write!(f, "B"),
            OptionLabel::C => write!(f, "C"),
            OptionLabel::D => write!(f, "D"),
        }
    }
}

impl FromStr for OptionLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(OptionLabel::A),
            "B" => Ok(OptionLabel::B),
            "C" => Ok(OptionLabel::C),
            "D" => Ok(OptionLabel::D),
            other => Err(format!("unknown option label: {other}")),
        }
    }
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawQuestion", into = "RawQuestion")]
pub struct QuestionRecord {
    question: String,
    options: BTreeMap<OptionLabel, String>,
    correct_answer: OptionLabel,
    syllabus_topic: String,
}

impl QuestionRecord {
    /// Build a record, enforcing the record invariants:
    /// non-empty question and topic, all four labels present with distinct
    /// non-empty texts, and a correct answer that names one of them.
    pub fn new(
        question: impl Into<String>,
        options: BTreeMap<OptionLabel, String>,
        correct_answer: OptionLabel,
        syllabus_topic: impl Into<String>,
    ) -> Result<Self, QuizError> {
        let question = question.into();
        let syllabus_topic = syllabus_topic.into();

        if question.trim().is_empty() {
            return Err(QuizError::InvalidQuestion("question text is empty".into()));
        }
        if syllabus_topic.trim().is_empty() {
            return Err(QuizError::InvalidQuestion(format!(
                "question '{question}' has no syllabus topic"
            )));
        }
        for label in OptionLabel::ALL {
            match options.get(&label) {
                None => {
                    return Err(QuizError::InvalidQuestion(format!(
                        "question '{question}' is missing option {label}"
                    )))
                }
                Some(text) if text.trim().is_empty() => {
                    return Err(QuizError::InvalidQuestion(format!(
                        "question '{question}' has an empty option {label}"
                    )))
                }
                Some(_) => {}
            }
        }
        let distinct: HashSet<&str> = options.values().map(String::as_str).collect();
        if distinct.len() != options.len() {
            return Err(QuizError::InvalidQuestion(format!(
                "question '{question}' has duplicate option texts"
            )));
        }
        if !options.contains_key(&correct_answer) {
            return Err(QuizError::InvalidQuestion(format!(
                "question '{question}' names {correct_answer} as correct but has no such option"
            )));
        }

        Ok(Self {
            question,
            options,
            correct_answer,
            syllabus_topic,
        })
    }

    /// Convenience constructor taking the four option texts in label order.
    pub fn from_choices(
        question: impl Into<String>,
        choices: [&str; 4],
        correct_answer: OptionLabel,
        syllabus_topic: impl Into<String>,
    ) -> Result<Self, QuizError> {
        let options = OptionLabel::ALL
            .into_iter()
            .zip(choices)
            .map(|(label, text)| (label, text.to_string()))
            .collect();
        Self::new(question, options, correct_answer, syllabus_topic)
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn options(&self) -> &BTreeMap<OptionLabel, String> {
        &self.options
    }

    pub fn option(&self, label: OptionLabel) -> Option<&str> {
        self.options.get(&label).map(String::as_str)
    }

    pub fn correct_answer(&self) -> OptionLabel {
        self.correct_answer
    }

    /// Text of the correct option. Always present thanks to validation.
    pub fn correct_text(&self) -> &str {
        self.options
            .get(&self.correct_answer)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn syllabus_topic(&self) -> &str {
        &self.syllabus_topic
    }

    /// Whether `selected` (an option text) is the correct answer.
    pub fn is_correct(&self, selected: &str) -> bool {
        selected == self.correct_text()
    }
}

/// Wire shape of a question, shared by bank files and LLM payloads.
///
/// Labels are kept as strings here so that a bad label surfaces as a
/// validation error rather than an opaque deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawQuestion {
    pub question: String,
    pub options: BTreeMap<String, String>,
    pub correct_answer: String,
    pub syllabus_topic: String,
}

impl TryFrom<RawQuestion> for QuestionRecord {
    type Error = QuizError;

    fn try_from(raw: RawQuestion) -> Result<Self, Self::Error> {
        let mut options = BTreeMap::new();
        for (label, text) in raw.options {
            let label: OptionLabel = label.parse().map_err(QuizError::InvalidQuestion)?;
            options.insert(label, text);
        }
        let correct: OptionLabel = raw
            .correct_answer
            .parse()
            .map_err(QuizError::InvalidQuestion)?;
        QuestionRecord::new(raw.question, options, correct, raw.syllabus_topic)
    }
}

impl From<QuestionRecord> for RawQuestion {
    fn from(record: QuestionRecord) -> Self {
        RawQuestion {
            question: record.question,
            options: record
                .options
                .into_iter()
                .map(|(label, text)| (label.to_string(), text))
                .collect(),
            correct_answer: record.correct_answer.to_string(),
            syllabus_topic: record.syllabus_topic,
        }
    }
}

/// The full candidate pool of questions available before filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    /// Unique identifier for this bank.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of this bank.
    #[serde(default)]
    pub description: String,
    /// Questions in bank order.
    #[serde(default)]
    pub questions: Vec<QuestionRecord>,
}

impl QuestionBank {
    /// Sorted, de-duplicated topics of the bank.
    pub fn topics(&self) -> Vec<String> {
        self.questions
            .iter()
            .map(|q| q.syllabus_topic().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of questions per topic, in sorted topic order.
    pub fn topic_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for q in &self.questions {
            *counts.entry(q.syllabus_topic().to_string()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QuestionRecord {
        QuestionRecord::from_choices(
            "What is Amazon S3?",
            ["Object storage", "Block storage", "A database", "A CDN"],
            OptionLabel::A,
            "Core Services",
        )
        .unwrap()
    }

    #[test]
    fn label_display_and_parse() {
        assert_eq!(OptionLabel::C.to_string(), "C");
        assert_eq!("b".parse::<OptionLabel>().unwrap(), OptionLabel::B);
        assert_eq!(" D ".parse::<OptionLabel>().unwrap(), OptionLabel::D);
        assert!("E".parse::<OptionLabel>().is_err());
        assert!("AB".parse::<OptionLabel>().is_err());
    }

    #[test]
    fn correct_text_resolves_label() {
        let q = sample();
        assert_eq!(q.correct_text(), "Object storage");
        assert!(q.is_correct("Object storage"));
        assert!(!q.is_correct("object storage"));
    }

    #[test]
    fn rejects_missing_option() {
        let mut options = BTreeMap::new();
        options.insert(OptionLabel::A, "one".to_string());
        options.insert(OptionLabel::B, "two".to_string());
        options.insert(OptionLabel::C, "three".to_string());
        let err = QuestionRecord::new("q?", options, OptionLabel::A, "T").unwrap_err();
        assert!(err.to_string().contains("missing option D"));
    }

    #[test]
    fn rejects_duplicate_option_texts() {
        let options = ["x", "y", "x", "z"];
        let err = QuestionRecord::from_choices("q?", options, OptionLabel::A, "T").unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn rejects_empty_topic() {
        let options = ["a", "b", "c", "d"];
        assert!(QuestionRecord::from_choices("q?", options, OptionLabel::A, " ").is_err());
    }

    #[test]
    fn deserialize_rejects_dangling_correct_answer() {
        let json = r#"{"question": "q?", "options": {"A": "a", "B": "b", "C": "c", "D": "d"},
                       "correct_answer": "E", "syllabus_topic": "T"}"#;
        let err = serde_json::from_str::<QuestionRecord>(json).unwrap_err();
        assert!(err.to_string().contains("unknown option label"));
    }

    #[test]
    fn serde_keeps_wire_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["correct_answer"], "A");
        assert_eq!(json["options"]["B"], "Block storage");
        assert_eq!(json["syllabus_topic"], "Core Services");
    }

    #[test]
    fn bank_topics_sorted_and_unique() {
        let iam = QuestionRecord::from_choices(
            "What is IAM?",
            ["Identity", "Billing", "Storage", "Compute"],
            OptionLabel::A,
            "Security and Compliance",
        )
        .unwrap();
        let bank = QuestionBank {
            id: "b".into(),
            name: "B".into(),
            description: String::new(),
            questions: vec![iam, sample(), sample()],
        };
        assert_eq!(bank.topics(), vec!["Core Services", "Security and Compliance"]);
        assert_eq!(bank.topic_counts()["Core Services"], 2);
    }
}
