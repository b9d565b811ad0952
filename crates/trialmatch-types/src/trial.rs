//! Trial definitions

use crate::eligibility::Eligibility;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Identification of a trial
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrialIdentification {
    pub trial_id: String,
    #[serde(default = "default_true")]
    pub open: bool,
    #[serde(default)]
    pub acronym: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub nct_id: Option<String>,
}

impl TrialIdentification {
    /// Open trial with the given id, using the id as acronym
    pub fn new(trial_id: impl Into<String>) -> Self {
        let trial_id = trial_id.into();
        Self {
            acronym: trial_id.clone(),
            trial_id,
            open: true,
            title: String::new(),
            nct_id: None,
        }
    }
}

/// Enrollment metadata of a cohort
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CohortMetadata {
    pub cohort_id: String,
    /// Cohorts that are not evaluable are reported but never matched
    #[serde(default = "default_true")]
    pub evaluable: bool,
    #[serde(default = "default_true")]
    pub open: bool,
    #[serde(default = "default_true")]
    pub slots_available: bool,
    #[serde(default)]
    pub blacklist: bool,
    #[serde(default)]
    pub description: String,
}

impl CohortMetadata {
    /// Evaluable, open cohort with free slots
    pub fn new(cohort_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            cohort_id: cohort_id.into(),
            evaluable: true,
            open: true,
            slots_available: true,
            blacklist: false,
            description: description.into(),
        }
    }

    pub fn non_evaluable(mut self) -> Self {
        self.evaluable = false;
        self
    }
}

/// A trial sub-group with its own additional criteria
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cohort {
    pub metadata: CohortMetadata,
    #[serde(default)]
    pub eligibility: Vec<Eligibility>,
}

/// A trial with its general criteria and cohorts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trial {
    pub identification: TrialIdentification,
    #[serde(default)]
    pub general_eligibility: Vec<Eligibility>,
    #[serde(default)]
    pub cohorts: Vec<Cohort>,
}

impl Trial {
    /// Every function in the trial, general criteria first
    pub fn functions(&self) -> impl Iterator<Item = &crate::EligibilityFunction> {
        self.general_eligibility
            .iter()
            .chain(self.cohorts.iter().flat_map(|c| c.eligibility.iter()))
            .map(|e| &e.function)
    }
}
