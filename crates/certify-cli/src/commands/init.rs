//! The `certify init` command.

use std::path::Path;

use anyhow::Result;

use certify_core::bank::builtin_bank_source;

const BANK_PATH: &str = "banks/aws-cloud-practitioner.toml";

pub fn execute() -> Result<()> {
    if Path::new("certify.toml").exists() {
        println!("certify.toml already exists, skipping.");
    } else {
        std::fs::write("certify.toml", SAMPLE_CONFIG)?;
        println!("Created certify.toml");
    }

    std::fs::create_dir_all("banks")?;
    let bank_path = Path::new(BANK_PATH);
    if bank_path.exists() {
        println!("{BANK_PATH} already exists, skipping.");
    } else {
        std::fs::write(bank_path, builtin_bank_source())?;
        println!("Created {BANK_PATH}");
    }

    println!("\nNext steps:");
    println!("  1. Export GEMINI_API_KEY (or edit certify.toml)");
    println!("  2. Run: certify validate --bank banks");
    println!("  3. Run: certify quiz --count 5");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# certify configuration

default_provider = "gemini"
default_model = "gemini-1.5-flash"
default_temperature = 0.7
generation_timeout_secs = 60
default_question_count = 5

# Replaces the built-in system prompt for live generation
# system_prompt = "You are an expert exam author."

# random_sample or prefix
selection_mode = "random_sample"

# Fallback question bank (file or directory)
bank = "banks"

output_dir = "./certify-results"

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"
"#;
