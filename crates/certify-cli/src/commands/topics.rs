//! The `certify topics` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::{load_source, SourceArgs};

pub fn execute(source: SourceArgs) -> Result<()> {
    let (_, bank) = load_source(&source)?;

    let mut table = Table::new();
    table.set_header(vec!["Topic", "Questions"]);
    for (topic, count) in bank.topic_counts() {
        table.add_row(vec![Cell::new(topic), Cell::new(count)]);
    }

    println!("{} ({} questions)", bank.name, bank.questions.len());
    println!("{table}");

    Ok(())
}
