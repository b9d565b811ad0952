//! Evaluation errors
//!
//! Every variant is a configuration or programming defect. Missing patient
//! data is never an error; predicates report it as UNDETERMINED.

use thiserror::Error;
use trialmatch_types::{EligibilityRule, FunctionInput, MAX_FUNCTION_DEPTH};

/// Result type for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors raised while building the registry or evaluating criteria
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// A declared rule has no evaluator
    #[error("No evaluator registered for rule {rule}")]
    MissingEvaluator { rule: EligibilityRule },

    /// A rule was registered more than once
    #[error("Rule {rule} is registered more than once")]
    DuplicateEvaluator { rule: EligibilityRule },

    /// An evaluator of the wrong kind was registered for a rule
    #[error("Rule {rule} expects {expected} but was registered as {registered}")]
    DefinitionMismatch {
        rule: EligibilityRule,
        expected: FunctionInput,
        registered: String,
    },

    /// Parameters do not match the rule's declared shape
    #[error("Rule {rule} expects {expected}, found {found}")]
    ArityMismatch {
        rule: EligibilityRule,
        expected: FunctionInput,
        found: String,
    },

    /// A parameter value cannot be interpreted
    #[error("Invalid input for {rule}: {message}")]
    InvalidInput {
        rule: EligibilityRule,
        message: String,
    },

    /// A function tree nests deeper than it may be evaluated
    #[error("Rule {rule} nests functions {depth} levels deep, at most {max_depth} are allowed")]
    TooDeep {
        rule: EligibilityRule,
        depth: usize,
        max_depth: usize,
    },

    /// A predicate could not produce an evaluation
    #[error("Predicate {rule} failed: {message}")]
    Predicate {
        rule: EligibilityRule,
        message: String,
    },

    /// Wraps an error with the trial it occurred in
    #[error("Trial {trial_id}: {source}")]
    Trial {
        trial_id: String,
        #[source]
        source: Box<EvalError>,
    },
}

impl EvalError {
    /// Create a missing evaluator error
    pub fn missing_evaluator(rule: EligibilityRule) -> Self {
        Self::MissingEvaluator { rule }
    }

    /// Create a duplicate evaluator error
    pub fn duplicate_evaluator(rule: EligibilityRule) -> Self {
        Self::DuplicateEvaluator { rule }
    }

    /// Create a definition mismatch error
    pub fn definition_mismatch(rule: EligibilityRule, registered: impl Into<String>) -> Self {
        Self::DefinitionMismatch {
            rule,
            expected: rule.input(),
            registered: registered.into(),
        }
    }

    /// Create an arity mismatch error
    pub fn arity_mismatch(rule: EligibilityRule, found: impl Into<String>) -> Self {
        Self::ArityMismatch {
            rule,
            expected: rule.input(),
            found: found.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(rule: EligibilityRule, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            rule,
            message: message.into(),
        }
    }

    /// Create a nesting depth error for the tree rooted at `rule`
    pub fn too_deep(rule: EligibilityRule, depth: usize) -> Self {
        Self::TooDeep {
            rule,
            depth,
            max_depth: MAX_FUNCTION_DEPTH,
        }
    }

    /// Create a predicate failure
    pub fn predicate(rule: EligibilityRule, message: impl Into<String>) -> Self {
        Self::Predicate {
            rule,
            message: message.into(),
        }
    }

    /// Attach the trial this error occurred in
    pub fn in_trial(self, trial_id: impl Into<String>) -> Self {
        Self::Trial {
            trial_id: trial_id.into(),
            source: Box::new(self),
        }
    }

    /// The rule that caused the error
    pub fn rule(&self) -> EligibilityRule {
        match self {
            Self::MissingEvaluator { rule }
            | Self::DuplicateEvaluator { rule }
            | Self::DefinitionMismatch { rule, .. }
            | Self::ArityMismatch { rule, .. }
            | Self::InvalidInput { rule, .. }
            | Self::TooDeep { rule, .. }
            | Self::Predicate { rule, .. } => *rule,
            Self::Trial { source, .. } => source.rule(),
        }
    }
}
