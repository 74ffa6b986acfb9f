//! Generation prompt template and LLM payload parsing.

use tracing::warn;

use crate::error::GenerationError;
use crate::model::QuestionRecord;

/// Syllabus used when the user did not paste one.
pub const DEFAULT_SYLLABUS: &str = "AWS Cloud Practitioner Essentials";

/// Build the question-generation prompt.
pub fn build_generation_prompt(count: usize, topics: &[String], syllabus: Option<&str>) -> String {
    let topic_list = topics.join(", ");
    let syllabus = syllabus
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SYLLABUS);

    format!(
        r#"Your task is to generate a multiple-choice quiz based on my specifications.

Instructions:
1. Read the syllabus provided below to understand the content.
2. Generate exactly {count} multiple-choice questions.
3. If specific topics are requested, focus the questions on those topics: {topic_list}.
4. Each question must have 4 options (A, B, C, D).
5. You MUST identify the single correct answer for each question.
6. You MUST specify which syllabus topic each question pertains to from the list: {topic_list}.
7. Your final output MUST be a single, valid JSON array of objects. Do not include any other text, just the JSON.
8. The JSON format for each object is: {{"question": "...", "options": {{"A": "...", "B": "...", "C": "...", "D": "..."}}, "correct_answer": "...", "syllabus_topic": "..."}}

Syllabus:
---
{syllabus}
---
"#
    )
}

/// Extract the JSON payload from an LLM response.
///
/// Handles:
/// - ```json``` blocks (preferred)
/// - Generic ``` blocks (if no json-specific blocks found)
/// - Raw text with no markdown blocks
///
/// The result is then trimmed to the outermost `[` .. `]` when present.
pub fn extract_json_payload(response: &str) -> String {
    let mut json_block = None;
    let mut generic_block = None;
    let mut in_block = false;
    let mut is_json_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            is_json_block = lang == "json";
            current_block.clear();
            continue;
        }

        if in_block && trimmed == "```" {
            in_block = false;
            if is_json_block {
                json_block.get_or_insert_with(|| current_block.clone());
            } else {
                generic_block.get_or_insert_with(|| current_block.clone());
            }
            continue;
        }

        if in_block {
            if !current_block.is_empty() {
                current_block.push('\n');
            }
            current_block.push_str(line);
        }
    }

    // Truncated responses leave the last block open.
    if in_block && !current_block.is_empty() {
        if is_json_block {
            json_block.get_or_insert(current_block);
        } else {
            generic_block.get_or_insert(current_block);
        }
    }

    let body = json_block
        .or(generic_block)
        .unwrap_or_else(|| response.to_string());

    match (array_start(&body), body.rfind(']')) {
        (Some(start), Some(end)) if start < end => body[start..=end].to_string(),
        _ => body.trim().to_string(),
    }
}

/// Index of the `[` that opens the question array.
///
/// Prefers a bracket that opens an array of objects (or an empty array) so
/// bracketed prose before the payload is skipped.
fn array_start(body: &str) -> Option<usize> {
    body.match_indices('[')
        .map(|(i, _)| i)
        .find(|&i| matches!(body[i + 1..].trim_start().chars().next(), Some('{' | ']')))
        .or_else(|| body.find('['))
}

/// Parse and validate an LLM response into question records.
///
/// Elements that fail validation are dropped and logged. The payload only
/// fails as a whole when it is not a JSON array or nothing survives.
pub fn parse_generated_questions(response: &str) -> Result<Vec<QuestionRecord>, GenerationError> {
    let payload = extract_json_payload(response);
    let items: Vec<serde_json::Value> = serde_json::from_str(&payload)
        .map_err(|e| GenerationError::MalformedPayload(e.to_string()))?;

    let mut questions = Vec::with_capacity(items.len());
    let mut rejected = 0usize;
    for (i, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<QuestionRecord>(item) {
            Ok(q) => questions.push(q),
            Err(e) => {
                warn!("dropping generated question #{}: {e}", i + 1);
                rejected += 1;
            }
        }
    }

    if questions.is_empty() {
        return Err(GenerationError::NoValidQuestions { rejected });
    }
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_QUESTION: &str = r#"[{"question": "What is a VPC?", "options": {"A": "A VPN client", "B": "A bill", "C": "An isolated network", "D": "A CDN"}, "correct_answer": "C", "syllabus_topic": "Technology"}]"#;

    #[test]
    fn bracketed_prose_before_the_array_is_skipped() {
        let response = format!("Topics [Cloud Concepts]: {ONE_QUESTION}");
        assert_eq!(extract_json_payload(&response), ONE_QUESTION);
        assert_eq!(parse_generated_questions(&response).unwrap().len(), 1);
    }

    #[test]
    fn prompt_includes_count_topics_and_syllabus() {
        let topics = vec!["Cloud Concepts".to_string(), "Billing and Pricing".to_string()];
        let prompt = build_generation_prompt(7, &topics, Some("Module 1: EC2"));
        assert!(prompt.contains("Generate exactly 7 multiple-choice questions"));
        assert!(prompt.contains("Cloud Concepts, Billing and Pricing"));
        assert!(prompt.contains("Module 1: EC2"));
        assert!(prompt.contains(r#""correct_answer": "...""#));
    }

    #[test]
    fn prompt_defaults_blank_syllabus() {
        let prompt = build_generation_prompt(1, &[], Some("   "));
        assert!(prompt.contains(DEFAULT_SYLLABUS));
        let prompt = build_generation_prompt(1, &[], None);
        assert!(prompt.contains(DEFAULT_SYLLABUS));
    }

    #[test]
    fn extract_raw_array() {
        assert_eq!(extract_json_payload(ONE_QUESTION), ONE_QUESTION);
    }

    #[test]
    fn extract_prefers_json_block() {
        let input = format!("```\nnot this\n```\n\n```json\n{ONE_QUESTION}\n```\n");
        assert_eq!(extract_json_payload(&input), ONE_QUESTION);
    }

    #[test]
    fn extract_trims_surrounding_prose() {
        let input = format!("Sure! Here is your quiz: {ONE_QUESTION} Good luck.");
        assert_eq!(extract_json_payload(&input), ONE_QUESTION);
    }

    #[test]
    fn extract_unclosed_block() {
        let input = format!("```json\n{ONE_QUESTION}");
        assert_eq!(extract_json_payload(&input), ONE_QUESTION);
    }

    #[test]
    fn parse_valid_payload() {
        let fenced = format!("```json\n{ONE_QUESTION}\n```");
        let questions = parse_generated_questions(&fenced).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_text(), "An isolated network");
    }

    #[test]
    fn parse_drops_invalid_records() {
        let payload = r#"[
            {"question": "Good?", "options": {"A": "a", "B": "b", "C": "c", "D": "d"}, "correct_answer": "B", "syllabus_topic": "T"},
            {"question": "Dangling?", "options": {"A": "a", "B": "b", "C": "c", "D": "d"}, "correct_answer": "F", "syllabus_topic": "T"},
            {"question": "Short?", "options": {"A": "a", "B": "b"}, "correct_answer": "A", "syllabus_topic": "T"},
            {"oops": true}
        ]"#;
        let questions = parse_generated_questions(payload).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question(), "Good?");
    }

    #[test]
    fn parse_all_invalid_is_an_error() {
        let payload = r#"[{"question": "x", "options": {}, "correct_answer": "A", "syllabus_topic": "T"}]"#;
        assert_eq!(
            parse_generated_questions(payload).unwrap_err(),
            GenerationError::NoValidQuestions { rejected: 1 }
        );
    }

    #[test]
    fn parse_empty_array_is_an_error() {
        assert_eq!(
            parse_generated_questions("[]").unwrap_err(),
            GenerationError::NoValidQuestions { rejected: 0 }
        );
    }

    #[test]
    fn parse_non_json_is_malformed() {
        let err = parse_generated_questions("I'm sorry, I can't do that.").unwrap_err();
        assert!(matches!(err, GenerationError::MalformedPayload(_)));
    }

    #[test]
    fn parse_object_instead_of_array_is_malformed() {
        let err = parse_generated_questions(r#"{"questions": 1}"#).unwrap_err();
        assert!(matches!(err, GenerationError::MalformedPayload(_)));
    }
}
