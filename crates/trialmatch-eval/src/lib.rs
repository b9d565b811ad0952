//! Eligibility evaluation engine
//!
//! This crate evaluates eligibility function trees against a patient record
//! and matches patients to trials:
//!
//! - **Composite folds**: `AND`, `OR`, `NOT` and `WARN_IF` over child evaluations
//! - **Function registry**: one definition per `EligibilityRule`, checked for
//!   exhaustiveness when the registry is built
//! - **Input resolver**: typed, validated parameters for leaf predicates
//! - **Leaf predicates**: demographics, tumor, treatment, clinical and molecular rules
//! - **Matcher**: per-trial and per-cohort eligibility with deterministic ordering
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use trialmatch_eval::{CurrentReferenceDate, FunctionRegistry, TrialMatcher};
//!
//! let reference_date = Arc::new(CurrentReferenceDate);
//! let registry = FunctionRegistry::standard(Arc::new(doid_model), reference_date)?;
//! let matcher = TrialMatcher::new(Arc::new(registry));
//! let matches = matcher.determine_eligibility(&record, &trials)?;
//! ```
//!
//! # Eligibility
//!
//! A trial or cohort stays potentially eligible unless some criterion is an
//! unrecoverable FAIL or NOT_IMPLEMENTED:
//!
//! - `WARN` and `UNDETERMINED` never disqualify
//! - Recoverable failures (e.g. a lab value that can be re-measured) never disqualify
//! - Everything under `WARN_IF` is recoverable

pub mod comparator;
pub mod composite;
pub mod date;
pub mod error;
pub mod functions;
pub mod matcher;
pub mod registry;
pub mod resolver;

pub use comparator::{
    compare_cohort_matches, compare_evaluation_maps, compare_trial_matches, sort_evaluation_map,
};
pub use composite::{CompositeRules, CompositeShape};
pub use date::{
    CurrentReferenceDate, FixedReferenceDate, HistoricReferenceDate, ReferenceDateProvider,
};
pub use error::{EvalError, EvalResult};
pub use matcher::{TrialMatcher, is_potentially_eligible, match_trial, match_trials};
pub use registry::{
    CompositeDefinition, Evaluator, FunctionRegistry, FunctionRegistryBuilder, LeafDefinition,
    MessageTemplate, PredicateContext, PredicateOutcome,
};
pub use resolver::{FunctionInputResolver, FunctionValue};
