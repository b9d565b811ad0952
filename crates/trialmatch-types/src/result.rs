//! Evaluation outcome kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of evaluating one eligibility function
///
/// Variants are declared from best to worst; the derived `Ord` is the
/// "badness" order, so `a > b` means `a` is worse than `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationResult {
    /// The patient meets the criterion
    Pass,
    /// The patient meets the criterion, with a caveat
    PassButWarn,
    /// The criterion is assumed to be met without looking at data
    NotEvaluated,
    /// The patient may not meet the criterion
    Warn,
    /// Data is missing to decide
    Undetermined,
    /// The patient does not meet the criterion
    Fail,
    /// No real predicate exists for the rule
    NotImplemented,
}

impl EvaluationResult {
    /// All results, best first
    pub const ALL: [EvaluationResult; 7] = [
        Self::Pass,
        Self::PassButWarn,
        Self::NotEvaluated,
        Self::Warn,
        Self::Undetermined,
        Self::Fail,
        Self::NotImplemented,
    ];

    /// Whether this result counts as passing
    pub const fn is_pass(self) -> bool {
        matches!(self, Self::Pass | Self::PassButWarn | Self::NotEvaluated)
    }

    /// Whether this result is strictly worse than `other`
    pub fn is_worse_than(self, other: EvaluationResult) -> bool {
        self > other
    }

    /// The worse of two results
    pub fn worst(self, other: EvaluationResult) -> EvaluationResult {
        self.max(other)
    }

    /// The better of two results
    pub fn best(self, other: EvaluationResult) -> EvaluationResult {
        self.min(other)
    }

    /// Upper snake case name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::PassButWarn => "PASS_BUT_WARN",
            Self::NotEvaluated => "NOT_EVALUATED",
            Self::Warn => "WARN",
            Self::Undetermined => "UNDETERMINED",
            Self::Fail => "FAIL",
            Self::NotImplemented => "NOT_IMPLEMENTED",
        }
    }
}

impl fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
