//! Topic filtering and count-limited selection from a question bank.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::model::QuestionRecord;

/// How `count` questions are picked once the bank is filtered by topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Uniform sampling without replacement; result is in sampling order.
    #[default]
    RandomSample,
    /// The first `count` matching questions, in bank order.
    Prefix,
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::RandomSample => write!(f, "random_sample"),
            SelectionMode::Prefix => write!(f, "prefix"),
        }
    }
}

impl FromStr for SelectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random" | "random_sample" | "random-sample" => Ok(SelectionMode::RandomSample),
            "prefix" => Ok(SelectionMode::Prefix),
            other => Err(format!("unknown selection mode: {other}")),
        }
    }
}

/// Select up to `count` questions whose topic is in `topics`.
///
/// Returns every matching question when fewer than `count` match; never pads.
/// An empty result is not an error here: callers surface it as an
/// empty-selection notice.
pub fn select<R: Rng + ?Sized>(
    bank: &[QuestionRecord],
    topics: &[String],
    count: usize,
    mode: SelectionMode,
    rng: &mut R,
) -> Result<Vec<QuestionRecord>, QuizError> {
    if count == 0 {
        return Err(QuizError::InvalidCount);
    }

    let wanted: HashSet<&str> = topics.iter().map(String::as_str).collect();
    let candidates: Vec<&QuestionRecord> = bank
        .iter()
        .filter(|q| wanted.contains(q.syllabus_topic()))
        .collect();

    let take = count.min(candidates.len());
    let selected = match mode {
        SelectionMode::Prefix => candidates.into_iter().take(take).cloned().collect(),
        SelectionMode::RandomSample => candidates
            .choose_multiple(rng, take)
            .map(|q| (*q).clone())
            .collect(),
    };
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OptionLabel;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn question(text: &str, topic: &str) -> QuestionRecord {
        QuestionRecord::from_choices(
            text,
            ["first", "second", "third", "fourth"],
            OptionLabel::B,
            topic,
        )
        .unwrap()
    }

    fn bank() -> Vec<QuestionRecord> {
        vec![
            question("q1", "Cloud Concepts"),
            question("q2", "Security and Compliance"),
            question("q3", "Billing and Pricing"),
            question("q4", "Cloud Concepts"),
            question("q5", "Cloud Concepts"),
            question("q6", "Security and Compliance"),
        ]
    }

    fn topics(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn mode_display_and_parse() {
        assert_eq!(SelectionMode::Prefix.to_string(), "prefix");
        assert_eq!(
            "random".parse::<SelectionMode>().unwrap(),
            SelectionMode::RandomSample
        );
        assert_eq!(
            "Random-Sample".parse::<SelectionMode>().unwrap(),
            SelectionMode::RandomSample
        );
        assert!("shuffle".parse::<SelectionMode>().is_err());
    }

    #[test]
    fn fewer_matches_than_count_returns_all() {
        let bank = vec![
            question("cloud", "Cloud Concepts"),
            question("security", "Security and Compliance"),
            question("billing", "Billing and Pricing"),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        for mode in [SelectionMode::RandomSample, SelectionMode::Prefix] {
            let wanted = topics(&["Billing and Pricing"]);
            let picked = select(&bank, &wanted, 2, mode, &mut rng).unwrap();
            assert_eq!(picked.len(), 1);
            assert_eq!(picked[0].question(), "billing");
        }
    }

    #[test]
    fn prefix_keeps_bank_order() {
        let mut rng = StdRng::seed_from_u64(1);
        let picked = select(
            &bank(),
            &topics(&["Cloud Concepts", "Security and Compliance"]),
            3,
            SelectionMode::Prefix,
            &mut rng,
        )
        .unwrap();
        let texts: Vec<&str> = picked.iter().map(|q| q.question()).collect();
        assert_eq!(texts, vec!["q1", "q2", "q4"]);
    }

    #[test]
    fn random_sample_is_bounded_and_filtered() {
        let wanted = topics(&["Cloud Concepts", "Billing and Pricing"]);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked =
                select(&bank(), &wanted, 2, SelectionMode::RandomSample, &mut rng).unwrap();
            assert_eq!(picked.len(), 2);
            assert!(picked
                .iter()
                .all(|q| wanted.iter().any(|t| t == q.syllabus_topic())));
            assert_ne!(picked[0].question(), picked[1].question());
        }
    }

    #[test]
    fn random_sample_shuffles_a_small_pool() {
        let wanted = topics(&["Cloud Concepts", "Security and Compliance", "Billing and Pricing"]);
        let bank_order: Vec<String> = bank().iter().map(|q| q.question().to_string()).collect();

        for count in [6, 10] {
            let mut orders = HashSet::new();
            for seed in 0..50 {
                let mut rng = StdRng::seed_from_u64(seed);
                let mode = SelectionMode::RandomSample;
                let picked = select(&bank(), &wanted, count, mode, &mut rng).unwrap();
                let mut order: Vec<String> =
                    picked.iter().map(|q| q.question().to_string()).collect();
                orders.insert(order.clone());

                order.sort();
                let mut expected = bank_order.clone();
                expected.sort();
                assert_eq!(order, expected);
            }
            assert!(orders.len() > 1, "count {count} always came back in one order");
        }
    }

    #[test]
    fn random_sample_is_reproducible_with_seed() {
        let wanted = topics(&["Cloud Concepts", "Security and Compliance"]);
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            select(&bank(), &wanted, 3, SelectionMode::RandomSample, &mut rng)
                .unwrap()
                .into_iter()
                .map(|q| q.question().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn no_matching_topic_is_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let wanted = topics(&["Technology"]);
        let picked = select(&bank(), &wanted, 5, SelectionMode::Prefix, &mut rng).unwrap();
        assert!(picked.is_empty());
    }

    #[test]
    fn zero_count_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let wanted = topics(&["Cloud Concepts"]);
        let err = select(&bank(), &wanted, 0, SelectionMode::Prefix, &mut rng).unwrap_err();
        assert_eq!(err, QuizError::InvalidCount);
    }
}
