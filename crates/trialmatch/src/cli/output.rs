//! Output formatting utilities

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use trialmatch_types::{EvaluationResult, TrialMatch};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    #[value(alias = "json-pretty")]
    Pretty,
    Table,
}

/// Set up color output based on user preference
pub fn setup_colors(mode: &str) {
    match mode.to_lowercase().as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::set_override(io::stdout().is_terminal()),
    }
}

/// Format an error for display, with its causes
pub fn format_error(error: &anyhow::Error) -> String {
    format!("{} {error:#}", "Error:".red().bold())
}

pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Colored result name
pub fn format_result(result: EvaluationResult) -> String {
    let name = result.as_str();
    match result {
        EvaluationResult::Pass | EvaluationResult::NotEvaluated => name.green().to_string(),
        EvaluationResult::PassButWarn | EvaluationResult::Warn => name.yellow().to_string(),
        EvaluationResult::Undetermined => name.cyan().to_string(),
        EvaluationResult::Fail => name.red().to_string(),
        EvaluationResult::NotImplemented => name.magenta().to_string(),
    }
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to output file: {}", path.display()))?;
        let message = format!("Output written to {}", path.display());
        eprintln!("{}", format_success(&message));
    } else {
        println!("{content}");
    }
    Ok(())
}

#[derive(Tabled)]
struct MatchRow {
    #[tabled(rename = "Trial")]
    trial: String,
    #[tabled(rename = "Cohort")]
    cohort: String,
    #[tabled(rename = "Eligible")]
    eligible: String,
    #[tabled(rename = "Worst criterion")]
    worst: String,
}

/// One row per trial and per evaluable cohort
pub fn format_matches_table(matches: &[TrialMatch]) -> String {
    if matches.is_empty() {
        return "(no trials)".to_string();
    }

    let mut rows = Vec::new();
    for trial in matches {
        rows.push(MatchRow {
            trial: trial.identification.trial_id.clone(),
            cohort: String::new(),
            eligible: format_eligible(trial.is_potentially_eligible),
            worst: worst_result(trial.evaluations.values().map(|e| e.result)),
        });
        for cohort in &trial.cohorts {
            rows.push(MatchRow {
                trial: String::new(),
                cohort: cohort.metadata.cohort_id.clone(),
                eligible: format_eligible(cohort.is_potentially_eligible),
                worst: worst_result(cohort.evaluations.values().map(|e| e.result)),
            });
        }
    }

    Table::new(rows).with(Style::modern()).to_string()
}

fn format_eligible(eligible: bool) -> String {
    if eligible {
        "yes".green().to_string()
    } else {
        "no".red().to_string()
    }
}

fn worst_result(results: impl Iterator<Item = EvaluationResult>) -> String {
    results
        .reduce(EvaluationResult::worst)
        .map_or_else(|| "-".to_string(), format_result)
}

/// Render matches in the requested format
pub fn format_matches(matches: &[TrialMatch], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string(matches).context("Failed to serialize JSON"),
        OutputFormat::Pretty => {
            serde_json::to_string_pretty(matches).context("Failed to serialize JSON")
        }
        OutputFormat::Table => Ok(format_matches_table(matches)),
    }
}
