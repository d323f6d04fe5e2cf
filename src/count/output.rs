use crate::model::{RunOutcome, RunReport};
use anyhow::Result;
use console::style;

pub fn output_json(outcome: &RunOutcome) -> Result<()> {
    let report = RunReport::from_outcome(outcome);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub fn output_summary(outcome: &RunOutcome) -> Result<()> {
    println!("{}", style("Run Summary").bold());
    println!("{}", "─".repeat(50));

    println!(
        "Releases counted: {}/{}",
        style(outcome.releases_succeeded).cyan(),
        outcome.releases_requested
    );
    println!("Rows written: {}", style(outcome.table.len()).cyan());
    println!("Output: {}", style(outcome.output_path.display()).dim());

    if !outcome.failures.is_empty() {
        println!("\n{}", style("Skipped releases").bold().red());
        for failure in &outcome.failures {
            println!("  {:<16} {}", failure.release, style(&failure.error).dim());
        }
    }

    if outcome.table.is_empty() {
        return Ok(());
    }

    println!();
    println!(
        "{:<16} {:<24} {:>8} {:>10} {:>10} {:>10}",
        style("Release").bold(),
        style("Language").bold(),
        style("Files").bold(),
        style("Blank").bold(),
        style("Comment").bold(),
        style("Code").bold()
    );
    println!("{}", "─".repeat(83));
    let rows = outcome.table.rows();
    for row in rows.iter().take(50) {
        println!(
            "{:<16} {:<24} {:>8} {:>10} {:>10} {:>10}",
            row.release, row.language, row.files, row.blank, row.comment, row.code
        );
    }
    if rows.len() > 50 {
        println!("\n... and {} more rows", rows.len() - 50);
    }
    Ok(())
}
