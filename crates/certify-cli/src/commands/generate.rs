//! The `certify generate` command.

use std::path::PathBuf;

use anyhow::Result;

use super::{generate_session, print_notices, GenerateArgs};

pub async fn execute(args: GenerateArgs, output: Option<PathBuf>) -> Result<()> {
    let (session, config) = generate_session(&args).await?;
    print_notices(&session.notices);

    let path = output.unwrap_or_else(|| {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
        config.output_dir.join(format!("session-{timestamp}.json"))
    });
    session.save_json(&path)?;

    println!(
        "Generated {} question(s) from {}",
        session.len(),
        session.source
    );
    println!("Session saved to: {}", path.display());

    Ok(())
}
