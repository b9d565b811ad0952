//! Validate command implementation

use super::output;
use crate::loader::{load_doid_model, read_trial_definitions};
use crate::trial_config::CriterionProblem;
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use trialmatch_eval::FunctionInputResolver;

/// Configuration for validate command
pub struct ValidateConfig {
    pub files: Vec<PathBuf>,
    pub doid: PathBuf,
    pub doid_config: Option<PathBuf>,
    pub verbose: bool,
}

/// Every problem in every trial file
pub fn collect_problems(config: &ValidateConfig) -> Result<Vec<CriterionProblem>> {
    if config.files.is_empty() {
        anyhow::bail!("No files specified for validation");
    }

    let doid_model = load_doid_model(&config.doid, config.doid_config.as_deref())?;
    let resolver = FunctionInputResolver::new(Arc::new(doid_model));

    let mut problems = Vec::new();
    for file in &config.files {
        if config.verbose {
            eprintln!("Validating: {}", file.display());
        }
        for definition in read_trial_definitions(file)? {
            problems.extend(definition.problems(&resolver));
        }
    }
    Ok(problems)
}

/// Validate trial files, failing when any criterion is invalid
pub fn validate(config: ValidateConfig) -> Result<()> {
    let problems = collect_problems(&config)?;

    if problems.is_empty() {
        let message = format!("All {} file(s) validated successfully", config.files.len());
        println!("{}", output::format_success(&message));
        return Ok(());
    }

    for problem in &problems {
        eprintln!(
            "  {} {} ({}): {}",
            "✗".red(),
            problem.trial_id.cyan(),
            problem.scope,
            problem.rule.bold()
        );
        eprintln!("      {}", problem.message);
    }
    anyhow::bail!("Found {} invalid criteria", problems.len())
}
