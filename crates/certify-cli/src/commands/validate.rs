//! The `certify validate` command.

use std::path::PathBuf;

use anyhow::Result;

use certify_core::bank::builtin_bank;
use certify_core::parser::{load_bank_directory, parse_bank, validate_bank};

pub fn execute(bank_path: Option<PathBuf>) -> Result<()> {
    let banks = match &bank_path {
        Some(path) if path.is_dir() => load_bank_directory(path)?,
        Some(path) => vec![parse_bank(path)?],
        None => vec![builtin_bank()?],
    };

    anyhow::ensure!(!banks.is_empty(), "no question banks found");

    let mut total_warnings = 0;

    for bank in &banks {
        println!("Bank: {} ({} questions)", bank.name, bank.questions.len());

        let warnings = validate_bank(bank);
        for w in &warnings {
            let prefix = w
                .question
                .map(|n| format!("  [#{n}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All question banks valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
