//! Match command implementation

use super::output::{self, OutputFormat};
use crate::loader::{load_doid_model, load_patient, load_trials};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use trialmatch_eval::{
    CurrentReferenceDate, FixedReferenceDate, FunctionRegistry, HistoricReferenceDate,
    ReferenceDateProvider, TrialMatcher,
};
use trialmatch_types::{Trial, TrialMatch};

/// Configuration for match command
pub struct MatchConfig {
    pub patient: PathBuf,
    pub trials: Vec<PathBuf>,
    pub doid: PathBuf,
    pub doid_config: Option<PathBuf>,
    /// Evaluate as of this date instead of today
    pub reference_date: Option<NaiveDate>,
    /// Evaluate as of the most recent date in the patient record
    pub historic: bool,
    pub format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

impl MatchConfig {
    fn reference_date_provider(&self) -> Arc<dyn ReferenceDateProvider> {
        match (self.reference_date, self.historic) {
            (Some(date), _) => Arc::new(FixedReferenceDate(date)),
            (None, true) => Arc::new(HistoricReferenceDate),
            (None, false) => Arc::new(CurrentReferenceDate),
        }
    }
}

/// Load every input and match the patient against all trials
pub fn evaluate(config: &MatchConfig) -> Result<Vec<TrialMatch>> {
    if config.trials.is_empty() {
        anyhow::bail!("No trial files specified");
    }

    let doid_model = load_doid_model(&config.doid, config.doid_config.as_deref())?;
    let reference_date = config.reference_date_provider();
    let registry = FunctionRegistry::standard(Arc::new(doid_model), reference_date)
        .context("Failed to build function registry")?;

    let record = load_patient(&config.patient)?;
    let trials = config
        .trials
        .iter()
        .map(load_trials)
        .collect::<Result<Vec<Vec<Trial>>>>()?
        .concat();

    TrialMatcher::new(Arc::new(registry))
        .determine_eligibility(&record, &trials)
        .with_context(|| format!("Matching failed for patient {}", record.patient_id))
}

/// Run the match command
pub fn run(config: MatchConfig) -> Result<()> {
    let matches = evaluate(&config)?;
    let content = output::format_matches(&matches, config.format)?;
    output::write_output(&content, config.output_file.as_deref())
}
