//! Result analysis: verdict counts per case index.

use anyhow::{Context, Result};
use comfy_table::Cell;
use sidelobe::summary::{self, RunSummary};
use std::path::PathBuf;

use crate::style::colors::SemanticStyle;
use crate::style::{alert_cell, styled_table};

pub fn run(paths: &[PathBuf], json: bool) -> Result<()> {
    let files = summary::result_files(paths).context("Failed to find result files")?;
    if files.is_empty() {
        anyhow::bail!("No result files found");
    }

    let mut summaries = Vec::with_capacity(files.len());
    for file in &files {
        let set = summary::load(file)?;
        summaries.push(RunSummary::of(file.display().to_string(), &set));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for run in &summaries {
        println!(
            "{} {}",
            run.source.header(),
            format!("({})", run.generator).muted()
        );

        let mut table = styled_table(&["Case", "Valid", "Invalid", "Unknown", "Example"]);
        for case in &run.cases {
            table.add_row(vec![
                Cell::new(case.case_index),
                Cell::new(case.valid),
                alert_cell(case.invalid),
                Cell::new(case.unknown),
                Cell::new(case.example.as_deref().unwrap_or("-")),
            ]);
        }
        println!("{table}");

        let findings = run.findings().count();
        let case_word = if findings == 1 { "case" } else { "cases" };
        println!(
            "{}",
            format!("({findings} {case_word} with invalid verdicts)").muted()
        );
        println!();
    }

    Ok(())
}
