//! Clinical trial eligibility matching for Rust
//!
//! This crate ties the trialmatch crates together:
//! - Disease Ontology loading and ancestor queries
//! - The compact textual rule syntax
//! - Evaluation of eligibility functions against a patient record
//! - Matching a patient against trials and their cohorts
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use trialmatch::{CurrentReferenceDate, FunctionRegistry, TrialMatcher};
//! use trialmatch::{load_doid_model, load_patient, load_trials};
//!
//! let doid_model = load_doid_model("doid.json", None)?;
//! let reference_date = Arc::new(CurrentReferenceDate);
//! let registry = FunctionRegistry::standard(Arc::new(doid_model), reference_date)?;
//! let record = load_patient("patient.json")?;
//! let trials = load_trials("trials.json")?;
//! let matches = TrialMatcher::new(Arc::new(registry)).determine_eligibility(&record, &trials)?;
//! ```

pub mod loader;
pub mod trial_config;

// Re-export all public APIs from internal crates
pub use trialmatch_doid as doid;
pub use trialmatch_eval as eval;
pub use trialmatch_parser as parser;
pub use trialmatch_types as types;

// Convenience re-exports
pub use loader::{load_doid_model, load_patient, load_trials, read_trial_definitions};
pub use trial_config::{CriterionProblem, TrialConfig, TrialDefinition};
pub use trialmatch_doid::{DoidManualConfig, DoidModel};
pub use trialmatch_eval::{
    CurrentReferenceDate, EvalError, FixedReferenceDate, FunctionRegistry, HistoricReferenceDate,
    ReferenceDateProvider, TrialMatcher, match_trials,
};
pub use trialmatch_parser::parse_function;
pub use trialmatch_types::{
    EligibilityFunction, EligibilityRule, Evaluation, EvaluationResult, PatientRecord, Trial,
    TrialMatch,
};

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
