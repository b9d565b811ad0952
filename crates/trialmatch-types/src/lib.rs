//! Trial matching data model
//!
//! This crate defines the value types shared by the parser, the evaluation
//! engine and the reporting side:
//!
//! - **Rules and functions**: `EligibilityRule` (closed set) with its declared
//!   `FunctionInput`, `EligibilityFunction` (a rule plus parameters, nesting
//!   through composite rules) and `Eligibility`
//! - **Results**: `EvaluationResult` ordered from best to worst, and the
//!   immutable `Evaluation` aggregate with its message buckets
//! - **Trials**: identification, cohorts and their criteria
//! - **Matches**: `TrialMatch` / `CohortMatch` with ordered criteria maps
//! - **Patient record**: the clinical and molecular view the predicates read
//!
//! All types are plain values with `serde` support; nothing here evaluates.

pub mod eligibility;
pub mod evaluation;
pub mod function;
pub mod input;
pub mod matching;
pub mod patient;
pub mod result;
pub mod rule;
pub mod trial;

pub use eligibility::{CriterionReference, Eligibility};
pub use evaluation::Evaluation;
pub use function::{EligibilityFunction, FunctionParameter, MAX_FUNCTION_DEPTH};
pub use input::FunctionInput;
pub use matching::{CohortMatch, EvaluationMap, TrialMatch};
pub use patient::{
    Amplification, ClinicalStatus, Fusion, Gender, LabValue, Loss, MolecularRecord, PatientDetails,
    PatientRecord, PriorSecondPrimary, TreatmentHistoryEntry, TumorDetails, Variant,
};
pub use result::EvaluationResult;
pub use rule::{EligibilityRule, UnknownRuleError};
pub use trial::{Cohort, CohortMetadata, Trial, TrialIdentification};
