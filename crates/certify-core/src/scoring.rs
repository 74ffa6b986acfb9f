//! Scoring and per-topic performance aggregation.
//!
//! Topic order is deterministic: the caller's topic universe first (in the
//! order given, duplicates dropped), then any topic that only appears in the
//! test, in order of first appearance. The weakest-topic tie-break follows
//! that order.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::model::QuestionRecord;

/// The user's selections: question index → selected option text.
pub type Answers = BTreeMap<usize, String>;

/// Correct/total tally for one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicScore {
    pub topic: String,
    pub correct: usize,
    pub total: usize,
}

impl TopicScore {
    fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            correct: 0,
            total: 0,
        }
    }

    /// Percentage correct, or `None` when the topic had no questions.
    pub fn percentage(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.correct as f64 / self.total as f64 * 100.0)
        }
    }

    /// Compare correct/total ratios exactly, without floating point.
    fn cmp_ratio(&self, other: &TopicScore) -> Ordering {
        (self.correct * other.total).cmp(&(other.correct * self.total))
    }
}

/// Per-topic tallies in deterministic topic order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicPerformance(Vec<TopicScore>);

impl TopicPerformance {
    pub fn get(&self, topic: &str) -> Option<&TopicScore> {
        self.0.iter().find(|t| t.topic == topic)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TopicScore> {
        self.0.iter()
    }

    /// Topics that had at least one question in the test.
    pub fn present(&self) -> impl Iterator<Item = &TopicScore> {
        self.0.iter().filter(|t| t.total > 0)
    }

    /// Topics of the universe that had no question in the test.
    pub fn absent(&self) -> impl Iterator<Item = &TopicScore> {
        self.0.iter().filter(|t| t.total == 0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn entry(&mut self, topic: &str) -> &mut TopicScore {
        let idx = match self.0.iter().position(|t| t.topic == topic) {
            Some(idx) => idx,
            None => {
                self.0.push(TopicScore::new(topic));
                self.0.len() - 1
            }
        };
        &mut self.0[idx]
    }
}

/// Outcome of scoring a finalized test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Results {
    /// Number of correctly answered questions.
    pub score: usize,
    /// Number of questions in the test.
    pub total: usize,
    /// `100 * score / total`, or 0 for an empty test.
    pub percentage: f64,
    /// Per-topic breakdown.
    pub topics: TopicPerformance,
    /// Lowest-scoring topic below 100%, if any.
    pub weakest_topic: Option<String>,
}

impl Results {
    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.score == self.total
    }
}

/// Score `questions` against `answers`.
///
/// A question counts as correct only when its answer is exactly the text of
/// the correct option; missing answers count as incorrect. Every topic in
/// `topic_universe` is reported, with `total == 0` when the test had none.
///
/// # Errors
/// Returns [`QuizError::InvalidAnswerIndex`] when `answers` has a key
/// outside `0..questions.len()`.
pub fn score(
    questions: &[QuestionRecord],
    answers: &Answers,
    topic_universe: &[String],
) -> Result<Results, QuizError> {
    let len = questions.len();
    if let Some((&index, _)) = answers.range(len..).next() {
        return Err(QuizError::InvalidAnswerIndex { index, len });
    }

    let mut topics = TopicPerformance::default();
    for topic in topic_universe {
        topics.entry(topic);
    }

    let mut correct_count = 0;
    for (i, q) in questions.iter().enumerate() {
        let correct = answers
            .get(&i)
            .is_some_and(|selected| q.is_correct(selected));
        let tally = topics.entry(q.syllabus_topic());
        tally.total += 1;
        if correct {
            tally.correct += 1;
            correct_count += 1;
        }
    }

    let percentage = if len == 0 {
        0.0
    } else {
        correct_count as f64 / len as f64 * 100.0
    };

    Ok(Results {
        score: correct_count,
        total: len,
        percentage,
        weakest_topic: weakest_topic(&topics),
        topics,
    })
}

/// First topic (in topic order) with the minimum ratio, ignoring topics with
/// no questions and topics at 100%.
fn weakest_topic(topics: &TopicPerformance) -> Option<String> {
    let mut weakest: Option<&TopicScore> = None;
    for t in topics.present().filter(|t| t.correct < t.total) {
        match weakest {
            Some(w) if t.cmp_ratio(w) != Ordering::Less => {}
            _ => weakest = Some(t),
        }
    }
    weakest.map(|t| t.topic.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OptionLabel;

    fn question(text: &str, topic: &str) -> QuestionRecord {
        QuestionRecord::from_choices(
            text,
            ["right", "wrong one", "wrong two", "wrong three"],
            OptionLabel::A,
            topic,
        )
        .unwrap()
    }

    fn answers(pairs: &[(usize, &str)]) -> Answers {
        pairs.iter().map(|(i, a)| (*i, a.to_string())).collect()
    }

    fn universe(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_answers_scores_zero() {
        let qs = vec![question("q1", "A"), question("q2", "B")];
        let results = score(&qs, &Answers::new(), &[]).unwrap();
        assert_eq!(results.score, 0);
        assert_eq!(results.total, 2);
        assert_eq!(results.percentage, 0.0);
        // Both at 0%, so the first in topic order wins.
        assert_eq!(results.weakest_topic.as_deref(), Some("A"));
    }

    #[test]
    fn all_correct_is_perfect() {
        let qs = vec![question("q1", "A"), question("q2", "B")];
        let results = score(&qs, &answers(&[(0, "right"), (1, "right")]), &[]).unwrap();
        assert_eq!(results.score, 2);
        assert_eq!(results.percentage, 100.0);
        assert!(results.is_perfect());
        assert!(results.weakest_topic.is_none());
    }

    #[test]
    fn empty_test_has_zero_percentage() {
        let results = score(&[], &Answers::new(), &[]).unwrap();
        assert_eq!(results.score, 0);
        assert_eq!(results.percentage, 0.0);
        assert!(results.weakest_topic.is_none());
        assert!(!results.is_perfect());
    }

    #[test]
    fn one_right_one_wrong() {
        let qs = vec![question("q1", "A"), question("q2", "B")];
        let results = score(&qs, &answers(&[(0, "right"), (1, "wrong two")]), &[]).unwrap();
        assert_eq!(results.score, 1);
        assert_eq!(results.percentage, 50.0);
        assert_eq!(results.weakest_topic.as_deref(), Some("B"));
    }

    #[test]
    fn comparison_is_exact() {
        let qs = vec![question("q1", "A")];
        let results = score(&qs, &answers(&[(0, "Right")]), &[]).unwrap();
        assert_eq!(results.score, 0);
        let results = score(&qs, &answers(&[(0, "right ")]), &[]).unwrap();
        assert_eq!(results.score, 0);
    }

    #[test]
    fn totals_sum_to_question_count() {
        let qs = vec![
            question("q1", "Cloud"),
            question("q2", "Billing"),
            question("q3", "Cloud"),
            question("q4", "Security"),
        ];
        let results = score(
            &qs,
            &answers(&[(0, "right")]),
            &universe(&["Billing", "Cloud", "Core Services", "Security"]),
        )
        .unwrap();
        let sum: usize = results.topics.iter().map(|t| t.total).sum();
        assert_eq!(sum, qs.len());
        assert!(results.topics.iter().all(|t| t.correct <= t.total));
    }

    #[test]
    fn universe_topics_without_questions_are_reported() {
        let qs = vec![question("q1", "Cloud")];
        let results = score(&qs, &Answers::new(), &universe(&["Billing", "Cloud"])).unwrap();
        let billing = results.topics.get("Billing").unwrap();
        assert_eq!(billing.total, 0);
        assert_eq!(billing.percentage(), None);
        assert_eq!(results.topics.absent().count(), 1);
        assert_eq!(results.topics.present().count(), 1);
    }

    #[test]
    fn topics_outside_universe_are_appended() {
        let qs = vec![question("q1", "Extra"), question("q2", "Cloud")];
        let results = score(&qs, &Answers::new(), &universe(&["Cloud", "Cloud"])).unwrap();
        let order: Vec<&str> = results.topics.iter().map(|t| t.topic.as_str()).collect();
        assert_eq!(order, vec!["Cloud", "Extra"]);
    }

    #[test]
    fn tie_break_follows_universe_order() {
        let qs = vec![
            question("q1", "Zeta"),
            question("q2", "Alpha"),
            question("q3", "Zeta"),
            question("q4", "Alpha"),
        ];
        // Both topics at 50%.
        let ans = answers(&[(0, "right"), (1, "right")]);
        let results = score(&qs, &ans, &universe(&["Alpha", "Zeta"])).unwrap();
        assert_eq!(results.weakest_topic.as_deref(), Some("Alpha"));
        let results = score(&qs, &ans, &universe(&["Zeta", "Alpha"])).unwrap();
        assert_eq!(results.weakest_topic.as_deref(), Some("Zeta"));
        // Without a universe, first appearance in the test decides.
        let results = score(&qs, &ans, &[]).unwrap();
        assert_eq!(results.weakest_topic.as_deref(), Some("Zeta"));
    }

    #[test]
    fn weakest_uses_ratio_not_count() {
        let qs = vec![
            question("q1", "Big"),
            question("q2", "Big"),
            question("q3", "Big"),
            question("q4", "Small"),
        ];
        // Big: 1/3, Small: 0/1.
        let results = score(&qs, &answers(&[(0, "right")]), &[]).unwrap();
        assert_eq!(results.weakest_topic.as_deref(), Some("Small"));
        let small = results.topics.get("Small").unwrap();
        assert_eq!((small.correct, small.total), (0, 1));
    }

    #[test]
    fn out_of_range_answer_is_rejected() {
        let qs = vec![question("q1", "A")];
        let err = score(&qs, &answers(&[(0, "right"), (3, "right")]), &[]).unwrap_err();
        assert_eq!(err, QuizError::InvalidAnswerIndex { index: 3, len: 1 });
    }

    #[test]
    fn topic_percentage() {
        let t = TopicScore {
            topic: "x".into(),
            correct: 1,
            total: 4,
        };
        assert_eq!(t.percentage(), Some(25.0));
    }
}
