//! The `certify score` command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};

use certify_core::model::OptionLabel;
use certify_core::report::QuizReport;
use certify_core::session::TestSession;

use super::{print_notices, print_results};

/// Score a saved session. Topics come from the bank the session was
/// generated against, so no bank is loaded here.
pub fn execute(
    session_path: PathBuf,
    answers_path: PathBuf,
    format: String,
    report_path: Option<PathBuf>,
) -> Result<()> {
    let mut session = TestSession::load_json(&session_path)?;

    let content = std::fs::read_to_string(&answers_path)
        .with_context(|| format!("failed to read answers from {}", answers_path.display()))?;
    let answers: BTreeMap<usize, String> =
        serde_json::from_str(&content).context("answers must be a JSON object of index to answer")?;

    for (index, answer) in answers {
        record_answer(&mut session, index, &answer)
            .with_context(|| format!("answer for question {index}"))?;
    }

    session.submit()?;
    let report = QuizReport::from_session(&session)?;

    match format.as_str() {
        "markdown" | "md" => println!("{}", report.to_markdown()),
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => {
            print_notices(&report.notices);
            print_results(&report.results, &report.insights());
        }
    }

    if let Some(path) = report_path {
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

/// An answer is an option text, or a bare label when no option has that text.
fn record_answer(session: &mut TestSession, index: usize, answer: &str) -> Result<()> {
    let is_option_text = session
        .questions
        .get(index)
        .is_some_and(|q| q.options().values().any(|text| text == answer));

    match answer.parse::<OptionLabel>() {
        Ok(label) if !is_option_text => session.answer_label(index, label)?,
        _ => session.answer(index, answer)?,
    }
    Ok(())
}
