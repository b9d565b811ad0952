//! Tests for trial definitions and match output
//!
//! Covers:
//! - Trial JSON with defaults for optional metadata
//! - Rule functions nested inside trial criteria
//! - Evaluation result ordering properties

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use trialmatch_types::EvaluationResult::{
    Fail, NotEvaluated, NotImplemented, Pass, PassButWarn, Undetermined, Warn,
};
use trialmatch_types::*;

fn result_strategy() -> impl Strategy<Value = EvaluationResult> {
    prop::sample::select(EvaluationResult::ALL.to_vec())
}

// === Trial definitions ===

#[test]
fn test_trial_json_with_defaults() {
    let json = r#"{
        "identification": {"trial_id": "TEST-1"},
        "general_eligibility": [
            {
                "references": [{"id": "I-01", "text": "Age 18 or older"}],
                "function": {"rule": "IS_AT_LEAST_X_YEARS_OLD", "parameters": ["18"]}
            }
        ],
        "cohorts": [
            {"metadata": {"cohort_id": "A"}},
            {"metadata": {"cohort_id": "B", "evaluable": false}}
        ]
    }"#;
    let trial: Trial = serde_json::from_str(json).unwrap();

    assert!(trial.identification.open);
    assert_eq!(trial.identification.nct_id, None);
    assert_eq!(trial.general_eligibility.len(), 1);
    assert_eq!(
        trial.general_eligibility[0].references.iter().next().map(|r| r.id.as_str()),
        Some("I-01")
    );

    let a = &trial.cohorts[0].metadata;
    assert!(a.evaluable && a.open && a.slots_available && !a.blacklist);
    assert!(trial.cohorts[0].eligibility.is_empty());
    assert!(!trial.cohorts[1].metadata.evaluable);
}

#[test]
fn test_trial_functions_iterates_general_then_cohorts() {
    let trial = Trial {
        identification: TrialIdentification::new("TEST-2"),
        general_eligibility: vec![Eligibility::new(EligibilityFunction::new(
            EligibilityRule::IsMale,
        ))],
        cohorts: vec![Cohort {
            metadata: CohortMetadata::new("A", "Cohort A"),
            eligibility: vec![Eligibility::new(EligibilityFunction::new(
                EligibilityRule::HasMeasurableDisease,
            ))],
        }],
    };

    let rules: Vec<EligibilityRule> = trial.functions().map(|f| f.rule).collect();
    let expected = vec![
        EligibilityRule::IsMale,
        EligibilityRule::HasMeasurableDisease,
    ];
    assert_eq!(rules, expected);
}

#[test]
fn test_unknown_rule_in_trial_json_is_rejected() {
    let json = r#"{
        "identification": {"trial_id": "TEST-3"},
        "general_eligibility": [{"function": {"rule": "IS_VERY_OLD"}}]
    }"#;
    let err = serde_json::from_str::<Trial>(json).unwrap_err();
    assert!(err.to_string().contains("IS_VERY_OLD"));
}

// === Result ordering ===

#[rstest]
#[case(Pass, Fail, Fail)]
#[case(Warn, Undetermined, Undetermined)]
#[case(NotImplemented, Fail, NotImplemented)]
#[case(NotEvaluated, PassButWarn, NotEvaluated)]
fn test_worst_of_two(
    #[case] a: EvaluationResult,
    #[case] b: EvaluationResult,
    #[case] expected: EvaluationResult,
) {
    assert_eq!(a.worst(b), expected);
    assert_eq!(b.worst(a), expected);
}

proptest! {
    #[test]
    fn prop_best_and_worst_bracket_both_inputs(a in result_strategy(), b in result_strategy()) {
        let best = a.best(b);
        let worst = a.worst(b);
        prop_assert!(!best.is_worse_than(a) && !best.is_worse_than(b));
        prop_assert!(!a.is_worse_than(worst) && !b.is_worse_than(worst));
    }

    #[test]
    fn prop_json_roundtrip_keeps_result(r in result_strategy(), recoverable in any::<bool>()) {
        let evaluation = Evaluation::new(r, recoverable).with_fail_general("message");
        let json = serde_json::to_string(&evaluation).unwrap();
        let back: Evaluation = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, evaluation);
    }
}
