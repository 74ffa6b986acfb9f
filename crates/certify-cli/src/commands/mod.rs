//! Subcommands and the plumbing they share.

pub mod generate;
pub mod init;
pub mod list_models;
pub mod quiz;
pub mod score;
pub mod topics;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Table};
use tracing::warn;

use certify_core::bank::builtin_bank;
use certify_core::generator::{Notice, TestGenerator, TestSpec};
use certify_core::model::QuestionBank;
use certify_core::parser::load_bank;
use certify_core::scoring::Results;
use certify_core::selection::SelectionMode;
use certify_core::session::TestSession;
use certify_providers::config::load_config_from;
use certify_providers::CertifyConfig;

/// Where configuration and questions come from.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Question bank file or directory (default: config `bank`, else built-in)
    #[arg(long)]
    pub bank: Option<PathBuf>,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Options controlling test generation.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Number of questions (default: config `default_question_count`)
    #[arg(long)]
    pub count: Option<usize>,

    /// Comma-separated topics (default: every topic in the bank)
    #[arg(long)]
    pub topics: Option<String>,

    /// File with a syllabus to generate questions from
    #[arg(long)]
    pub syllabus: Option<PathBuf>,

    /// Fallback selection: random_sample or prefix
    #[arg(long)]
    pub mode: Option<SelectionMode>,

    /// Seed for fallback sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Skip the LLM and use the question bank directly
    #[arg(long)]
    pub offline: bool,
}

/// Load the config and the question bank it points to.
pub fn load_source(source: &SourceArgs) -> Result<(CertifyConfig, QuestionBank)> {
    let config = load_config_from(source.config.as_deref())?;
    let bank = match source.bank.as_ref().or(config.bank.as_ref()) {
        Some(path) => load_bank(path)
            .with_context(|| format!("failed to load question bank from {}", path.display()))?,
        None => builtin_bank()?,
    };
    Ok((config, bank))
}

/// Generate a fresh session.
pub async fn generate_session(args: &GenerateArgs) -> Result<(TestSession, CertifyConfig)> {
    let (config, bank) = load_source(&args.source)?;

    let topics = match &args.topics {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        None => bank.topics(),
    };
    anyhow::ensure!(!topics.is_empty(), "at least one topic is required");

    let syllabus = args
        .syllabus
        .as_ref()
        .map(|path| {
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read syllabus: {}", path.display()))
        })
        .transpose()?;

    let count = args.count.unwrap_or(config.default_question_count);

    let mut generator_config = config.generator_config(args.seed);
    if let Some(mode) = args.mode {
        generator_config.selection_mode = mode;
    }
    generator_config.offline = args.offline;

    let provider = if args.offline {
        None
    } else {
        match config.live_provider() {
            Ok(provider) => Some(provider),
            Err(e) => {
                warn!("live generation unavailable: {e:#}");
                None
            }
        }
    };

    let generator = TestGenerator::new(provider, bank, generator_config);
    let test = generator
        .generate(&TestSpec {
            count,
            topics,
            syllabus,
        })
        .await?;

    if let Some(usage) = &test.usage {
        eprintln!(
            "Tokens used: {} prompt + {} completion (~${:.4})",
            usage.prompt_tokens, usage.completion_tokens, usage.estimated_cost_usd
        );
    }

    Ok((TestSession::new(test), config))
}

pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        eprintln!("Note: {notice}");
    }
}

/// Print the overall score, the per-topic table, and the insights.
pub fn print_results(results: &Results, insights: &[String]) {
    println!(
        "Overall score: {:.1}% ({}/{} correct)",
        results.percentage, results.score, results.total
    );

    let mut table = Table::new();
    table.set_header(vec!["Topic", "Correct", "Percentage"]);
    for t in results.topics.iter() {
        match t.percentage() {
            Some(pct) => table.add_row(vec![
                Cell::new(&t.topic),
                Cell::new(format!("{}/{}", t.correct, t.total)),
                Cell::new(format!("{pct:.1}%")),
            ]),
            None => table.add_row(vec![
                Cell::new(&t.topic),
                Cell::new("-"),
                Cell::new("no questions"),
            ]),
        };
    }
    println!("\n{table}");

    for insight in insights {
        println!("{insight}");
    }
}
