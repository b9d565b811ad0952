//! Composite rules: the shape table and the fold algebra
//!
//! Folds take the evaluations of the sub-functions, in order, and produce
//! a new evaluation for the composite node. Inputs are never modified.
//!
//! | combinator | result                                   | messages and events       |
//! |------------|------------------------------------------|---------------------------|
//! | `AND`      | worst input                              | union of all inputs       |
//! | `OR`       | best input                               | inputs with the best result |
//! | `NOT`      | PASS ↔ FAIL, PASS_BUT_WARN → WARN        | pass ↔ fail, inclusion ↔ exclusion |
//! | `WARN_IF`  | PASS-like or WARN → PASS_BUT_WARN, FAIL → PASS | pass and warn → warn |

use crate::error::{EvalError, EvalResult};
use std::collections::BTreeSet;
use trialmatch_types::{EligibilityRule, Evaluation, EvaluationResult, FunctionInput};

/// Number of sub-functions a composite rule takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeShape {
    ExactlyOne,
    AtLeastTwo,
}

impl CompositeShape {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Self::ExactlyOne => count == 1,
            Self::AtLeastTwo => count >= 2,
        }
    }
}

/// Classification of rules into composites and leaves
pub struct CompositeRules;

impl CompositeRules {
    /// Whether the rule combines other functions
    pub fn is_composite(rule: EligibilityRule) -> bool {
        Self::shape(rule).is_some()
    }

    /// Declared shape of a composite rule, `None` for leaves
    pub fn shape(rule: EligibilityRule) -> Option<CompositeShape> {
        match rule.input() {
            FunctionInput::OneCompositeInput => Some(CompositeShape::ExactlyOne),
            FunctionInput::AtLeastTwoCompositeInputs => Some(CompositeShape::AtLeastTwo),
            _ => None,
        }
    }
}

// ============================================================================
// Folds
// ============================================================================

/// Worst result wins; every bucket is unioned
///
/// Recoverable only if every input carrying the worst result is recoverable
/// and no input is an unrecoverable FAIL or NOT_IMPLEMENTED.
pub fn and(evaluations: &[Evaluation]) -> Evaluation {
    let worst = evaluations
        .iter()
        .map(|e| e.result)
        .max()
        .unwrap_or(EvaluationResult::Pass);

    let blocked = evaluations.iter().any(Evaluation::is_unrecoverable_failure);
    let recoverable = !blocked
        && evaluations
            .iter()
            .filter(|e| e.result == worst)
            .all(|e| e.recoverable);

    let seed = Evaluation::new(worst, recoverable);
    evaluations.iter().fold(seed, |acc, e| acc.merged_with(e))
}

/// Best result wins; only the inputs carrying it contribute
pub fn or(evaluations: &[Evaluation]) -> Evaluation {
    let best = evaluations
        .iter()
        .map(|e| e.result)
        .min()
        .unwrap_or(EvaluationResult::Fail);

    let best_inputs: Vec<&Evaluation> = evaluations.iter().filter(|e| e.result == best).collect();
    let recoverable = best_inputs.iter().any(|e| e.recoverable);

    let seed = Evaluation::new(best, recoverable);
    best_inputs
        .into_iter()
        .fold(seed, |acc, e| acc.merged_with(e))
}

/// Negation of a single evaluation
pub fn not(evaluation: &Evaluation) -> Evaluation {
    let result = match evaluation.result {
        EvaluationResult::Pass => EvaluationResult::Fail,
        EvaluationResult::Fail => EvaluationResult::Pass,
        EvaluationResult::PassButWarn => EvaluationResult::Warn,
        other => other,
    };

    Evaluation {
        result,
        recoverable: evaluation.recoverable,
        inclusion_molecular_events: evaluation.exclusion_molecular_events.clone(),
        exclusion_molecular_events: evaluation.inclusion_molecular_events.clone(),
        pass_specific_messages: evaluation.fail_specific_messages.clone(),
        pass_general_messages: evaluation.fail_general_messages.clone(),
        warn_specific_messages: evaluation.warn_specific_messages.clone(),
        warn_general_messages: evaluation.warn_general_messages.clone(),
        undetermined_specific_messages: evaluation.undetermined_specific_messages.clone(),
        undetermined_general_messages: evaluation.undetermined_general_messages.clone(),
        fail_specific_messages: evaluation.pass_specific_messages.clone(),
        fail_general_messages: evaluation.pass_general_messages.clone(),
    }
}

/// Turns a match of the sub-function into a warning that never blocks eligibility
pub fn warn_if(evaluation: &Evaluation) -> Evaluation {
    match evaluation.result {
        EvaluationResult::Pass | EvaluationResult::PassButWarn | EvaluationResult::Warn => {
            let mut warned = Evaluation::new(EvaluationResult::PassButWarn, true);
            warned.inclusion_molecular_events = evaluation.inclusion_molecular_events.clone();
            warned.exclusion_molecular_events = evaluation.exclusion_molecular_events.clone();
            warned.warn_specific_messages = union(
                &evaluation.pass_specific_messages,
                &evaluation.warn_specific_messages,
            );
            warned.warn_general_messages = union(
                &evaluation.pass_general_messages,
                &evaluation.warn_general_messages,
            );
            warned
        }
        EvaluationResult::Fail => Evaluation::new(EvaluationResult::Pass, true),
        EvaluationResult::Undetermined | EvaluationResult::NotEvaluated => {
            evaluation.clone().with_result(evaluation.result, true)
        }
        EvaluationResult::NotImplemented => evaluation.clone(),
    }
}

fn union(a: &BTreeSet<String>, b: &BTreeSet<String>) -> BTreeSet<String> {
    a.union(b).cloned().collect()
}

/// The single input of an exactly-one composite
pub(crate) fn single(rule: EligibilityRule, evaluations: &[Evaluation]) -> EvalResult<&Evaluation> {
    match evaluations {
        [only] => Ok(only),
        other => {
            let found = format!("{} evaluations", other.len());
            Err(EvalError::arity_mismatch(rule, found))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn eval(result: EvaluationResult, recoverable: bool) -> Evaluation {
        Evaluation::new(result, recoverable)
    }

    // === Shapes ===

    #[rstest]
    #[case(EligibilityRule::And, Some(CompositeShape::AtLeastTwo))]
    #[case(EligibilityRule::Or, Some(CompositeShape::AtLeastTwo))]
    #[case(EligibilityRule::Not, Some(CompositeShape::ExactlyOne))]
    #[case(EligibilityRule::WarnIf, Some(CompositeShape::ExactlyOne))]
    #[case(EligibilityRule::IsMale, None)]
    fn test_shape(#[case] rule: EligibilityRule, #[case] expected: Option<CompositeShape>) {
        assert_eq!(CompositeRules::shape(rule), expected);
    }

    #[test]
    fn test_shape_accepts() {
        assert!(CompositeShape::ExactlyOne.accepts(1));
        assert!(!CompositeShape::ExactlyOne.accepts(2));
        assert!(!CompositeShape::AtLeastTwo.accepts(1));
        assert!(CompositeShape::AtLeastTwo.accepts(5));
    }

    // === AND ===

    #[test]
    fn test_and_all_pass() {
        let pass = eval(EvaluationResult::Pass, false);
        let result = and(&[pass.clone(), pass]);
        assert_eq!(result.result, EvaluationResult::Pass);
    }

    #[test]
    fn test_and_recoverable_fail_stays_recoverable() {
        let result = and(&[
            eval(EvaluationResult::Pass, false),
            Evaluation::recoverable_fail("Hb too low", "Hb"),
        ]);
        assert_eq!(result.result, EvaluationResult::Fail);
        assert!(result.recoverable);
        assert!(result.fail_general_messages.contains("Hb"));
    }

    #[test]
    fn test_and_unrecoverable_failure_blocks_recovery() {
        let result = and(&[
            eval(EvaluationResult::NotImplemented, false),
            Evaluation::recoverable_fail("Hb too low", "Hb"),
        ]);
        assert_eq!(result.result, EvaluationResult::NotImplemented);
        assert!(!result.recoverable);
    }

    #[test]
    fn test_and_unions_messages() {
        let result = and(&[
            Evaluation::pass("Patient is male", "Male"),
            Evaluation::undetermined("WHO unknown", "WHO"),
        ]);
        assert_eq!(result.result, EvaluationResult::Undetermined);
        assert!(result.pass_general_messages.contains("Male"));
        assert!(result.undetermined_general_messages.contains("WHO"));
    }

    // === OR ===

    #[test]
    fn test_or_keeps_best_group_only() {
        let result = or(&[
            Evaluation::fail("No BRAF mutation", "BRAF"),
            Evaluation::pass("KRAS mutation", "KRAS").with_inclusion_event("KRAS G12C"),
        ]);
        assert_eq!(result.result, EvaluationResult::Pass);
        assert!(result.fail_general_messages.is_empty());
        assert_eq!(result.inclusion_molecular_events.len(), 1);
    }

    // === NOT ===

    #[rstest]
    #[case(EvaluationResult::Pass, EvaluationResult::Fail)]
    #[case(EvaluationResult::Fail, EvaluationResult::Pass)]
    #[case(EvaluationResult::PassButWarn, EvaluationResult::Warn)]
    #[case(EvaluationResult::Warn, EvaluationResult::Warn)]
    #[case(EvaluationResult::Undetermined, EvaluationResult::Undetermined)]
    #[case(EvaluationResult::NotEvaluated, EvaluationResult::NotEvaluated)]
    #[case(EvaluationResult::NotImplemented, EvaluationResult::NotImplemented)]
    fn test_not_result(#[case] input: EvaluationResult, #[case] expected: EvaluationResult) {
        assert_eq!(not(&eval(input, false)).result, expected);
    }

    #[test]
    fn test_not_swaps_messages_and_events() {
        let braf = Evaluation::pass("Has BRAF V600E", "BRAF").with_inclusion_event("BRAF V600E");
        let negated = not(&braf);
        assert!(negated.fail_specific_messages.contains("Has BRAF V600E"));
        assert!(negated.pass_specific_messages.is_empty());
        assert!(negated.exclusion_molecular_events.contains("BRAF V600E"));
        assert!(negated.inclusion_molecular_events.is_empty());
    }

    // === WARN_IF ===

    #[test]
    fn test_warn_if_pass_becomes_warning() {
        let warned = warn_if(&Evaluation::pass("Liver lesions", "Liver"));
        assert_eq!(warned.result, EvaluationResult::PassButWarn);
        assert!(warned.recoverable);
        assert!(warned.warn_specific_messages.contains("Liver lesions"));
        assert!(warned.pass_specific_messages.is_empty());
    }

    #[rstest]
    #[case(EvaluationResult::Fail, EvaluationResult::Pass, true)]
    #[case(EvaluationResult::Warn, EvaluationResult::PassButWarn, true)]
    #[case(EvaluationResult::Undetermined, EvaluationResult::Undetermined, true)]
    #[case(EvaluationResult::NotEvaluated, EvaluationResult::NotEvaluated, true)]
    #[case(
        EvaluationResult::NotImplemented,
        EvaluationResult::NotImplemented,
        false
    )]
    fn test_warn_if_result(
        #[case] input: EvaluationResult,
        #[case] expected: EvaluationResult,
        #[case] recoverable: bool,
    ) {
        let warned = warn_if(&eval(input, false));
        assert_eq!(warned.result, expected);
        assert_eq!(warned.recoverable, recoverable);
    }

    #[test]
    fn test_single_rejects_two() {
        let pass = eval(EvaluationResult::Pass, false);
        let evaluations = [pass.clone(), pass];
        assert!(single(EligibilityRule::Not, &evaluations).is_err());
        assert!(single(EligibilityRule::Not, &evaluations[..1]).is_ok());
    }
}
