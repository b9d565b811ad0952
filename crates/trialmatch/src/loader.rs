//! Loading patients, trials and the Disease Ontology from files

use crate::trial_config::{TrialDefinition, parse_trial_definitions};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use trialmatch_doid::{DoidManualConfig, DoidModel};
use trialmatch_types::{PatientRecord, Trial};

/// Read a patient record from JSON
pub fn load_patient(path: impl AsRef<Path>) -> Result<PatientRecord> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read patient file: {}", path.display()))?;
    let record: PatientRecord = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse patient file: {}", path.display()))?;
    log::debug!(
        "Loaded patient {} from {}",
        record.patient_id,
        path.display()
    );
    Ok(record)
}

/// Read trial definitions without parsing their rules
pub fn read_trial_definitions(path: impl AsRef<Path>) -> Result<Vec<TrialDefinition>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read trial file: {}", path.display()))?;
    parse_trial_definitions(&content)
        .with_context(|| format!("Failed to parse trial file: {}", path.display()))
}

/// Read trials, parsing every textual rule
pub fn load_trials(path: impl AsRef<Path>) -> Result<Vec<Trial>> {
    let path = path.as_ref();
    let trials = read_trial_definitions(path)?
        .iter()
        .map(TrialDefinition::to_trial)
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("Invalid trial in {}", path.display()))?;
    log::info!("Loaded {} trials from {}", trials.len(), path.display());
    Ok(trials)
}

/// Load the ontology dump, with an optional manual configuration file
pub fn load_doid_model(path: impl AsRef<Path>, manual_config: Option<&Path>) -> Result<DoidModel> {
    let path = path.as_ref();
    let manual_config = match manual_config {
        Some(config) => DoidManualConfig::from_file(config)
            .with_context(|| format!("Failed to load DOID manual config: {}", config.display()))?,
        None => DoidManualConfig::default(),
    };

    DoidModel::from_file(path, manual_config)
        .with_context(|| format!("Failed to load DOID ontology: {}", path.display()))
}
