//! The evaluation aggregate produced for every function node

use crate::result::EvaluationResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Result of evaluating one eligibility function against one patient
///
/// Message buckets are sorted sets so that serialization is deterministic.
/// Values are never changed after construction; the `with_*` methods consume
/// and return a new value, and combining evaluations produces a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Evaluation {
    /// Outcome kind
    pub result: EvaluationResult,
    /// Whether a failure of this node may be resolved later (e.g. a lab can be repeated)
    pub recoverable: bool,
    /// Molecular events supporting inclusion
    #[serde(default)]
    pub inclusion_molecular_events: BTreeSet<String>,
    /// Molecular events supporting exclusion
    #[serde(default)]
    pub exclusion_molecular_events: BTreeSet<String>,
    #[serde(default)]
    pub pass_specific_messages: BTreeSet<String>,
    #[serde(default)]
    pub pass_general_messages: BTreeSet<String>,
    #[serde(default)]
    pub warn_specific_messages: BTreeSet<String>,
    #[serde(default)]
    pub warn_general_messages: BTreeSet<String>,
    #[serde(default)]
    pub undetermined_specific_messages: BTreeSet<String>,
    #[serde(default)]
    pub undetermined_general_messages: BTreeSet<String>,
    #[serde(default)]
    pub fail_specific_messages: BTreeSet<String>,
    #[serde(default)]
    pub fail_general_messages: BTreeSet<String>,
}

impl Evaluation {
    /// Create an evaluation without messages
    pub fn new(result: EvaluationResult, recoverable: bool) -> Self {
        Self {
            result,
            recoverable,
            inclusion_molecular_events: BTreeSet::new(),
            exclusion_molecular_events: BTreeSet::new(),
            pass_specific_messages: BTreeSet::new(),
            pass_general_messages: BTreeSet::new(),
            warn_specific_messages: BTreeSet::new(),
            warn_general_messages: BTreeSet::new(),
            undetermined_specific_messages: BTreeSet::new(),
            undetermined_general_messages: BTreeSet::new(),
            fail_specific_messages: BTreeSet::new(),
            fail_general_messages: BTreeSet::new(),
        }
    }

    /// Unrecoverable pass with messages
    pub fn pass(specific: impl Into<String>, general: impl Into<String>) -> Self {
        Self::new(EvaluationResult::Pass, false)
            .with_pass_specific(specific)
            .with_pass_general(general)
    }

    /// Unrecoverable fail with messages
    pub fn fail(specific: impl Into<String>, general: impl Into<String>) -> Self {
        Self::new(EvaluationResult::Fail, false)
            .with_fail_specific(specific)
            .with_fail_general(general)
    }

    /// Recoverable fail with messages
    pub fn recoverable_fail(specific: impl Into<String>, general: impl Into<String>) -> Self {
        Self::new(EvaluationResult::Fail, true)
            .with_fail_specific(specific)
            .with_fail_general(general)
    }

    /// Undetermined with messages
    pub fn undetermined(specific: impl Into<String>, general: impl Into<String>) -> Self {
        Self::new(EvaluationResult::Undetermined, false)
            .with_undetermined_specific(specific)
            .with_undetermined_general(general)
    }

    /// Warn with messages
    pub fn warn(specific: impl Into<String>, general: impl Into<String>) -> Self {
        Self::new(EvaluationResult::Warn, false)
            .with_warn_specific(specific)
            .with_warn_general(general)
    }

    pub fn with_pass_specific(mut self, message: impl Into<String>) -> Self {
        self.pass_specific_messages.insert(message.into());
        self
    }

    pub fn with_pass_general(mut self, message: impl Into<String>) -> Self {
        self.pass_general_messages.insert(message.into());
        self
    }

    pub fn with_warn_specific(mut self, message: impl Into<String>) -> Self {
        self.warn_specific_messages.insert(message.into());
        self
    }

    pub fn with_warn_general(mut self, message: impl Into<String>) -> Self {
        self.warn_general_messages.insert(message.into());
        self
    }

    pub fn with_undetermined_specific(mut self, message: impl Into<String>) -> Self {
        self.undetermined_specific_messages.insert(message.into());
        self
    }

    pub fn with_undetermined_general(mut self, message: impl Into<String>) -> Self {
        self.undetermined_general_messages.insert(message.into());
        self
    }

    pub fn with_fail_specific(mut self, message: impl Into<String>) -> Self {
        self.fail_specific_messages.insert(message.into());
        self
    }

    pub fn with_fail_general(mut self, message: impl Into<String>) -> Self {
        self.fail_general_messages.insert(message.into());
        self
    }

    pub fn with_inclusion_event(mut self, event: impl Into<String>) -> Self {
        self.inclusion_molecular_events.insert(event.into());
        self
    }

    pub fn with_exclusion_event(mut self, event: impl Into<String>) -> Self {
        self.exclusion_molecular_events.insert(event.into());
        self
    }

    /// Copy of this evaluation with a different outcome and recoverability
    pub fn with_result(mut self, result: EvaluationResult, recoverable: bool) -> Self {
        self.result = result;
        self.recoverable = recoverable;
        self
    }

    /// Union every message bucket and event set of `other` into a copy of `self`
    pub fn merged_with(mut self, other: &Evaluation) -> Self {
        self.inclusion_molecular_events
            .extend(other.inclusion_molecular_events.iter().cloned());
        self.exclusion_molecular_events
            .extend(other.exclusion_molecular_events.iter().cloned());
        self.pass_specific_messages
            .extend(other.pass_specific_messages.iter().cloned());
        self.pass_general_messages
            .extend(other.pass_general_messages.iter().cloned());
        self.warn_specific_messages
            .extend(other.warn_specific_messages.iter().cloned());
        self.warn_general_messages
            .extend(other.warn_general_messages.iter().cloned());
        self.undetermined_specific_messages
            .extend(other.undetermined_specific_messages.iter().cloned());
        self.undetermined_general_messages
            .extend(other.undetermined_general_messages.iter().cloned());
        self.fail_specific_messages
            .extend(other.fail_specific_messages.iter().cloned());
        self.fail_general_messages
            .extend(other.fail_general_messages.iter().cloned());
        self
    }

    /// Whether this evaluation is a FAIL or NOT_IMPLEMENTED that cannot be recovered
    pub fn is_unrecoverable_failure(&self) -> bool {
        !self.recoverable
            && matches!(
                self.result,
                EvaluationResult::Fail | EvaluationResult::NotImplemented
            )
    }

    /// Whether no message bucket holds anything
    pub fn has_no_messages(&self) -> bool {
        self.pass_specific_messages.is_empty()
            && self.pass_general_messages.is_empty()
            && self.warn_specific_messages.is_empty()
            && self.warn_general_messages.is_empty()
            && self.undetermined_specific_messages.is_empty()
            && self.undetermined_general_messages.is_empty()
            && self.fail_specific_messages.is_empty()
            && self.fail_general_messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merged_with_unions_buckets() {
        let left = Evaluation::pass("Patient is male", "Male").with_inclusion_event("EGFR amp");
        let right = Evaluation::fail("No KRAS", "KRAS").with_pass_specific("Patient is male");

        let merged = left.clone().merged_with(&right);

        assert_eq!(merged.result, EvaluationResult::Pass);
        assert_eq!(merged.pass_specific_messages.len(), 1);
        assert!(merged.fail_specific_messages.contains("No KRAS"));
        assert!(merged.inclusion_molecular_events.contains("EGFR amp"));
        // inputs are unchanged
        assert!(left.fail_specific_messages.is_empty());
    }

    #[test]
    fn test_unrecoverable_failure() {
        assert!(Evaluation::fail("a", "b").is_unrecoverable_failure());
        assert!(!Evaluation::recoverable_fail("a", "b").is_unrecoverable_failure());
        let missing = Evaluation::new(EvaluationResult::NotImplemented, false);
        assert!(missing.is_unrecoverable_failure());
        assert!(!Evaluation::undetermined("a", "b").is_unrecoverable_failure());
    }

    #[test]
    fn test_messages_serialize_sorted() {
        let evaluation = Evaluation::new(EvaluationResult::Warn, false)
            .with_warn_specific("zeta")
            .with_warn_specific("alpha")
            .with_warn_specific("mu");

        let json = serde_json::to_value(&evaluation).unwrap();
        assert_eq!(
            json["warn_specific_messages"],
            serde_json::json!(["alpha", "mu", "zeta"])
        );
    }

    #[test]
    fn test_missing_buckets_deserialize_empty() {
        let evaluation: Evaluation =
            serde_json::from_str(r#"{"result": "PASS", "recoverable": false}"#).unwrap();
        assert_eq!(evaluation, Evaluation::new(EvaluationResult::Pass, false));
        assert!(evaluation.has_no_messages());
    }
}
