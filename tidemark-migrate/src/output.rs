//! Human and JSON rendering of command results

use crate::error::CliError;
use colored::Colorize;
use serde::Serialize;
use tidemark::migration::{CatalogStatus, RunReport, UnitStatus};

/// Result of `create`
#[derive(Debug, Serialize)]
pub struct Created {
    pub name: String,
    pub path: String,
}

pub struct Output {
    json: bool,
    quiet: bool,
}

impl Output {
    pub fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }

    pub fn report(&self, report: &RunReport) -> Result<(), CliError> {
        if self.json {
            return self.print_json(report);
        }
        if self.quiet {
            return Ok(());
        }
        for line in report_lines(report) {
            println!("{}", line);
        }
        Ok(())
    }

    pub fn status(&self, status: &CatalogStatus) -> Result<(), CliError> {
        if self.json {
            return self.print_json(status);
        }
        if self.quiet {
            return Ok(());
        }

        println!("\n{}\n", "Migration Status".bold());
        if status.entries.is_empty() {
            println!("  No migration files");
        }
        for entry in &status.entries {
            let state = match &entry.record {
                Some(record) => format!(
                    "{} ({})",
                    record.status.as_str().green(),
                    record.updated_at.format("%Y-%m-%d %H:%M:%S")
                ),
                None => "never run".yellow().to_string(),
            };
            println!("  {:<12} {:<48} {}", entry.name, entry.file_name, state);
        }
        println!("\nSchema version: {}", status.marker.cyan());
        Ok(())
    }

    pub fn created(&self, created: &Created) -> Result<(), CliError> {
        if self.json {
            return self.print_json(created);
        }
        if !self.quiet {
            println!("{} {}", "Created".green(), created.path);
        }
        Ok(())
    }

    fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), CliError> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// One line per unit, then a summary
pub fn report_lines(report: &RunReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .outcomes
        .iter()
        .map(|outcome| match &outcome.status {
            UnitStatus::Applied => format!("  {} {}", "✓".green(), outcome.display_name()),
            UnitStatus::Skipped => format!(
                "  {} {} (already {})",
                "-".dimmed(),
                outcome.display_name(),
                outcome.action
            ),
            UnitStatus::Failed { error } => {
                format!("  {} {}: {}", "✗".red(), outcome.display_name(), error)
            }
        })
        .collect();

    let summary = format!(
        "{} applied, {} skipped, {} failed",
        report.applied(),
        report.skipped(),
        report.failed()
    );
    lines.push(if report.is_partial_failure() {
        summary.red().to_string()
    } else {
        summary.green().to_string()
    });
    if let Some(marker) = &report.marker {
        lines.push(format!("Schema version: {}", marker));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidemark::migration::{MigrationAction, RunMode, UnitOutcome};

    #[test]
    fn test_report_lines() {
        colored::control::set_override(false);
        let mut report =
            RunReport::new(RunMode::SinceVersion("v2.0.0".into()), MigrationAction::Up);
        report.outcomes.push(UnitOutcome {
            name: "v2.0.1".into(),
            action: MigrationAction::Up,
            status: UnitStatus::Applied,
        });
        report.outcomes.push(UnitOutcome {
            name: "v2.1.0".into(),
            action: MigrationAction::Up,
            status: UnitStatus::Failed { error: "boom".into() },
        });
        report.marker = Some("v2.0.1".into());

        let lines = report_lines(&report);
        assert_eq!(lines[0], "  ✓ v2.0.1 [up]");
        assert_eq!(lines[1], "  ✗ v2.1.0 [up]: boom");
        assert_eq!(lines[2], "1 applied, 0 skipped, 1 failed");
        assert_eq!(lines[3], "Schema version: v2.0.1");
    }
}
