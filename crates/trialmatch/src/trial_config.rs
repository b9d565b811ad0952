//! Trial configuration with criteria written in the textual rule syntax
//!
//! A configuration reads like the protocol:
//!
//! ```json
//! {
//!   "identification": {"trial_id": "LUNG-01", "title": "EGFR inhibitor in NSCLC"},
//!   "general_eligibility": [
//!     {"references": [{"id": "I-01", "text": "Age >= 18"}], "rule": "IS_AT_LEAST_X_YEARS_OLD[18]"}
//!   ],
//!   "cohorts": [
//!     {"metadata": {"cohort_id": "A", "description": "EGFR mutated"},
//!      "eligibility": [{"rule": "MUTATION_IN_GENE_X[EGFR]"}]}
//!   ]
//! }
//! ```
//!
//! Trials already in the structured form, with `function` trees instead of
//! `rule` text, are accepted as well.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use trialmatch_eval::FunctionInputResolver;
use trialmatch_types::{
    Cohort, CohortMetadata, CriterionReference, Eligibility, EligibilityFunction, Trial,
    TrialIdentification,
};

/// One criterion as written in a configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionConfig {
    #[serde(default)]
    pub references: Vec<CriterionReference>,
    pub rule: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortConfig {
    pub metadata: CohortMetadata,
    #[serde(default)]
    pub eligibility: Vec<CriterionConfig>,
}

/// A trial whose criteria are textual rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialConfig {
    pub identification: TrialIdentification,
    #[serde(default)]
    pub general_eligibility: Vec<CriterionConfig>,
    #[serde(default)]
    pub cohorts: Vec<CohortConfig>,
}

impl CriterionConfig {
    fn to_eligibility(&self) -> Result<Eligibility> {
        let function = trialmatch_parser::parse_function(&self.rule)
            .with_context(|| format!("Invalid rule '{}'", self.rule))?;
        Ok(self
            .references
            .iter()
            .cloned()
            .fold(Eligibility::new(function), Eligibility::with_reference))
    }
}

impl TrialConfig {
    /// Parse every rule into a [`Trial`]
    pub fn to_trial(&self) -> Result<Trial> {
        let trial_id = &self.identification.trial_id;

        let general_eligibility = self
            .general_eligibility
            .iter()
            .map(CriterionConfig::to_eligibility)
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Trial {trial_id}: general eligibility"))?;

        let cohorts = self
            .cohorts
            .iter()
            .map(|cohort| {
                let eligibility = cohort
                    .eligibility
                    .iter()
                    .map(CriterionConfig::to_eligibility)
                    .collect::<Result<Vec<_>>>()
                    .with_context(|| {
                        format!("Trial {trial_id}: cohort {}", cohort.metadata.cohort_id)
                    })?;
                Ok(Cohort {
                    metadata: cohort.metadata.clone(),
                    eligibility,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Trial {
            identification: self.identification.clone(),
            general_eligibility,
            cohorts,
        })
    }
}

/// A trial in either accepted form
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TrialDefinition {
    Config(TrialConfig),
    Structured(Trial),
}

impl TrialDefinition {
    pub fn trial_id(&self) -> &str {
        match self {
            Self::Config(config) => &config.identification.trial_id,
            Self::Structured(trial) => &trial.identification.trial_id,
        }
    }

    pub fn to_trial(&self) -> Result<Trial> {
        match self {
            Self::Config(config) => config.to_trial(),
            Self::Structured(trial) => Ok(trial.clone()),
        }
    }

    /// Every syntax and input problem in the trial, not just the first
    pub fn problems(&self, resolver: &FunctionInputResolver) -> Vec<CriterionProblem> {
        let trial_id = self.trial_id();
        let mut problems = Vec::new();

        let mut check = |scope: &str, rule: String, parsed: Result<EligibilityFunction, String>| {
            let messages: Vec<String> = match parsed {
                Ok(function) => resolver
                    .problems(&function)
                    .into_iter()
                    .map(|error| error.to_string())
                    .collect(),
                Err(message) => vec![message],
            };
            for message in messages {
                problems.push(CriterionProblem {
                    trial_id: trial_id.to_string(),
                    scope: scope.to_string(),
                    rule: rule.clone(),
                    message,
                });
            }
        };

        match self {
            Self::Config(config) => {
                for criterion in &config.general_eligibility {
                    let rule = &criterion.rule;
                    check(GENERAL_SCOPE, rule.clone(), parse(rule));
                }
                for cohort in &config.cohorts {
                    let scope = cohort_scope(&cohort.metadata);
                    for criterion in &cohort.eligibility {
                        let rule = &criterion.rule;
                        check(&scope, rule.clone(), parse(rule));
                    }
                }
            }
            Self::Structured(trial) => {
                for eligibility in &trial.general_eligibility {
                    let function = &eligibility.function;
                    check(GENERAL_SCOPE, function.to_string(), Ok(function.clone()));
                }
                for cohort in &trial.cohorts {
                    let scope = cohort_scope(&cohort.metadata);
                    for eligibility in &cohort.eligibility {
                        let function = &eligibility.function;
                        check(&scope, function.to_string(), Ok(function.clone()));
                    }
                }
            }
        }
        problems
    }
}

const GENERAL_SCOPE: &str = "general";

fn cohort_scope(metadata: &CohortMetadata) -> String {
    format!("cohort {}", metadata.cohort_id)
}

fn parse(rule: &str) -> Result<EligibilityFunction, String> {
    trialmatch_parser::parse_function(rule).map_err(|e| e.to_string())
}

/// A criterion that cannot be evaluated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriterionProblem {
    pub trial_id: String,
    /// `general` or `cohort <id>`
    pub scope: String,
    pub rule: String,
    pub message: String,
}

impl fmt::Display for CriterionProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {}: {}",
            self.trial_id, self.scope, self.rule, self.message
        )
    }
}

/// Parse a trial file holding one trial or a list of trials
pub fn parse_trial_definitions(json: &str) -> Result<Vec<TrialDefinition>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TrialFile {
        Many(Vec<TrialDefinition>),
        One(TrialDefinition),
    }

    let file: TrialFile = serde_json::from_str(json)
        .context("Trial file is neither a trial nor a list of trials")?;
    Ok(match file {
        TrialFile::Many(definitions) => definitions,
        TrialFile::One(definition) => vec![definition],
    })
}
