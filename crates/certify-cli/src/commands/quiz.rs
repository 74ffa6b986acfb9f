//! The `certify quiz` command.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use certify_core::model::{OptionLabel, QuestionRecord};
use certify_core::report::QuizReport;

use super::{generate_session, print_notices, print_results, GenerateArgs};

pub async fn execute(args: GenerateArgs, save: bool) -> Result<()> {
    let (mut session, config) = generate_session(&args).await?;
    print_notices(&session.notices);

    if session.is_empty() {
        println!("No questions to answer.");
        return Ok(());
    }

    println!("Practice test: {} question(s) from {}\n", session.len(), session.source);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut stdout = io::stdout();

    'questions: for index in 0..session.len() {
        print_question(index, &session.questions[index]);
        loop {
            print!("Answer [A-D, blank to skip]: ");
            stdout.flush()?;

            let Some(line) = lines.next().transpose()? else {
                // Input closed: everything left stays unanswered.
                println!();
                break 'questions;
            };
            let input = line.trim();
            if input.is_empty() {
                break;
            }
            match input.parse::<OptionLabel>() {
                Ok(label) => {
                    session.answer_label(index, label)?;
                    break;
                }
                Err(e) => println!("{e}"),
            }
        }
        println!();
    }

    let skipped = session.unanswered().len();
    if skipped > 0 {
        println!("{skipped} question(s) left unanswered.");
    }

    session.submit()?;
    let report = QuizReport::from_session(&session)?;
    print_results(&report.results, &report.insights());

    if save {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
        let session_path = config.output_dir.join(format!("session-{timestamp}.json"));
        let report_path = config.output_dir.join(format!("report-{timestamp}.json"));
        session.save_json(&session_path)?;
        report.save_json(&report_path)?;
        eprintln!("Session saved to: {}", session_path.display());
        eprintln!("Report saved to: {}", report_path.display());
    }

    Ok(())
}

fn print_question(index: usize, question: &QuestionRecord) {
    println!(
        "Question {}: {} [{}]",
        index + 1,
        question.question(),
        question.syllabus_topic()
    );
    for (label, text) in question.options() {
        println!("  {label}) {text}");
    }
}
