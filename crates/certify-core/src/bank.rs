//! The built-in fallback question bank.

use std::path::Path;

use anyhow::Result;

use crate::model::QuestionBank;
use crate::parser::parse_bank_str;

const AWS_CLOUD_PRACTITIONER: &str = include_str!("../banks/aws-cloud-practitioner.toml");

/// The embedded AWS Cloud Practitioner bank.
pub fn builtin_bank() -> Result<QuestionBank> {
    parse_bank_str(
        AWS_CLOUD_PRACTITIONER,
        Path::new("<builtin>/aws-cloud-practitioner.toml"),
    )
}

/// Raw TOML of the embedded bank, for `certify init`.
pub fn builtin_bank_source() -> &'static str {
    AWS_CLOUD_PRACTITIONER
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::validate_bank;

    #[test]
    fn builtin_bank_is_valid() {
        let bank = builtin_bank().unwrap();
        assert_eq!(bank.questions.len(), 20);
        assert!(validate_bank(&bank).is_empty());
        for q in &bank.questions {
            assert!(q.options().contains_key(&q.correct_answer()));
        }
    }

    #[test]
    fn builtin_topics() {
        let bank = builtin_bank().unwrap();
        assert_eq!(
            bank.topics(),
            vec![
                "Billing and Pricing",
                "Cloud Concepts",
                "Core Services",
                "Security and Compliance",
                "Technology",
            ]
        );
        assert_eq!(bank.topic_counts()["Technology"], 2);
    }
}
