//! DOID lookup command implementation

use crate::loader::load_doid_model;
use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use trialmatch_doid::DoidModel;

/// Configuration for doid command
pub struct DoidConfig {
    pub doid: PathBuf,
    pub doid_config: Option<PathBuf>,
    /// DOID (`162`) or term (`cancer`)
    pub query: String,
}

/// Resolved view of one DOID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoidReport {
    pub doid: String,
    pub term: Option<String>,
    /// Ancestors, the DOID itself included
    pub ancestors: Vec<(String, Option<String>)>,
    pub main_cancer_types: Vec<String>,
}

/// Look up a DOID or a term
pub fn report(model: &DoidModel, query: &str) -> Option<DoidReport> {
    let doid = if model.contains(query) {
        query.to_string()
    } else {
        model.resolve_doid_for_term(query)?.to_string()
    };

    let ancestors = model
        .doid_with_parents(&doid)
        .into_iter()
        .map(|ancestor| {
            let term = model.resolve_term_for_doid(&ancestor).map(str::to_string);
            (ancestor, term)
        })
        .collect();

    Some(DoidReport {
        term: model.resolve_term_for_doid(&doid).map(str::to_string),
        main_cancer_types: model.main_cancer_doids(&doid).into_iter().collect(),
        ancestors,
        doid,
    })
}

/// Run the doid command
pub fn run(config: DoidConfig) -> Result<()> {
    let model = load_doid_model(&config.doid, config.doid_config.as_deref())?;
    let Some(report) = report(&model, &config.query) else {
        anyhow::bail!("Unknown DOID or term: {}", config.query);
    };

    println!(
        "{} {}",
        format!("DOID:{}", report.doid).cyan().bold(),
        report.term.as_deref().unwrap_or("(no term)")
    );
    println!("{}", "Ancestors:".bold());
    for (ancestor, term) in &report.ancestors {
        println!("  {ancestor:>8}  {}", term.as_deref().unwrap_or("-"));
    }
    if !report.main_cancer_types.is_empty() {
        let main_cancer_types = report.main_cancer_types.join(", ");
        println!("{} {}", "Main cancer types:".bold(), main_cancer_types);
    }
    Ok(())
}
