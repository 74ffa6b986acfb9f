//! certify CLI: practice exams from a live LLM or a local question bank.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{GenerateArgs, SourceArgs};

#[derive(Parser)]
#[command(
    name = "certify",
    version,
    about = "AI-assisted practice exams with per-topic feedback"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a practice test interactively
    Quiz {
        #[command(flatten)]
        args: GenerateArgs,

        /// Save the session and report JSON to the output directory
        #[arg(long)]
        save: bool,
    },

    /// Generate a test and write it as a session JSON file
    Generate {
        #[command(flatten)]
        args: GenerateArgs,

        /// Session file to write (default: <output_dir>/session-<timestamp>.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Score a saved session against an answers file
    Score {
        /// Session JSON written by `certify generate`
        #[arg(long)]
        session: PathBuf,

        /// JSON object mapping question index to option text or label
        #[arg(long)]
        answers: PathBuf,

        /// Output format: text, markdown, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Also write the report JSON here
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Validate question bank TOML files
    Validate {
        /// Bank file or directory (default: the built-in bank)
        #[arg(long)]
        bank: Option<PathBuf>,
    },

    /// List the topics of a question bank
    Topics {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// List models of the configured providers
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and question bank
    Init,
}

#[tokio::main]
async fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("certify=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Quiz { args, save } => commands::quiz::execute(args, save).await,
        Commands::Generate { args, output } => commands::generate::execute(args, output).await,
        Commands::Score {
            session,
            answers,
            format,
            report,
        } => commands::score::execute(session, answers, format, report),
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Topics { source } => commands::topics::execute(source),
        Commands::ListModels { provider, config } => {
            commands::list_models::execute(provider, config)
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
