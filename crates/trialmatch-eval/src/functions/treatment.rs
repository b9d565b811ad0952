//! Prior treatments and prior malignancies

use crate::error::EvalResult;
use crate::registry::{FunctionRegistryBuilder, LeafDefinition, PredicateContext, PredicateOutcome};
use trialmatch_types::{EligibilityRule, PatientRecord};

pub fn register(builder: &mut FunctionRegistryBuilder) {
    builder
        .register_leaf(
            EligibilityRule::HasHadTreatmentNameX,
            LeafDefinition::new(has_had_treatment_name)
                .pass_message("Patient has received {0}", "Has received {0}")
                .fail_message("Patient has not received {0}", "Has not received {0}"),
        )
        .register_leaf(
            EligibilityRule::HasHadAtMostXSystemicTreatmentLines,
            LeafDefinition::new(has_had_at_most_systemic_lines)
                .pass_message(
                    "Patient has had at most {0} systemic treatment lines",
                    "Adequate number of lines",
                )
                .fail_message(
                    "Patient has had more than {0} systemic treatment lines",
                    "Too many lines",
                ),
        )
        .register_leaf(
            EligibilityRule::HasHistoryOfSecondMalignancy,
            LeafDefinition::new(has_history_of_second_malignancy)
                .pass_message(
                    "Patient has a history of a second malignancy",
                    "Second malignancy",
                )
                .fail_message(
                    "Patient has no history of a second malignancy",
                    "No second malignancy",
                ),
        );
}

fn has_had_treatment_name(
    context: &PredicateContext<'_>,
    record: &PatientRecord,
) -> EvalResult<PredicateOutcome> {
    let name = context.text()?;
    Ok(PredicateOutcome::from_bool(
        record
            .oncological_history
            .iter()
            .any(|entry| entry.name.eq_ignore_ascii_case(name)),
    ))
}

/// Entries with unknown systemic status count as possibly systemic
fn has_had_at_most_systemic_lines(
    context: &PredicateContext<'_>,
    record: &PatientRecord,
) -> EvalResult<PredicateOutcome> {
    let max_lines = context.integer()?;
    let history = &record.oncological_history;

    let certain = history
        .iter()
        .filter(|entry| entry.is_systemic == Some(true))
        .count();
    let unknown = history
        .iter()
        .filter(|entry| entry.is_systemic.is_none())
        .count();
    let (certain, possible) = (certain as i64, (certain + unknown) as i64);

    let outcome = if possible <= max_lines {
        PredicateOutcome::Pass
    } else if certain > max_lines {
        PredicateOutcome::Fail
    } else {
        PredicateOutcome::undetermined(
            format!("Patient has had between {certain} and {possible} systemic lines"),
            "Undetermined number of lines",
        )
    };
    Ok(outcome)
}

fn has_history_of_second_malignancy(
    _context: &PredicateContext<'_>,
    record: &PatientRecord,
) -> EvalResult<PredicateOutcome> {
    let any = !record.prior_second_primaries.is_empty();
    Ok(PredicateOutcome::from_bool(any))
}

#[cfg(test)]
mod tests {
    use crate::functions::test_support::{evaluate, patient};
    use rstest::rstest;
    use trialmatch_types::{
        EvaluationResult, PatientRecord, PriorSecondPrimary, TreatmentHistoryEntry,
    };

    fn treatment(name: &str, is_systemic: Option<bool>) -> TreatmentHistoryEntry {
        TreatmentHistoryEntry {
            name: name.to_string(),
            is_systemic,
            start_year: Some(2022),
        }
    }

    fn with_history(history: Vec<TreatmentHistoryEntry>) -> PatientRecord {
        let mut record = patient();
        record.oncological_history = history;
        record
    }

    #[test]
    fn test_treatment_name_ignores_case() {
        let record = with_history(vec![treatment("Pembrolizumab", Some(true))]);

        let evaluation = evaluate("HAS_HAD_TREATMENT_NAME_X[pembrolizumab]", &record);
        assert_eq!(evaluation.result, EvaluationResult::Pass);
        let messages = &evaluation.pass_general_messages;
        assert!(messages.contains("Has received pembrolizumab"));

        assert_eq!(
            evaluate("HAS_HAD_TREATMENT_NAME_X[Nivolumab]", &record).result,
            EvaluationResult::Fail
        );
    }

    #[rstest]
    #[case(vec![], EvaluationResult::Pass)]
    #[case(vec![Some(true), Some(false), Some(false)], EvaluationResult::Pass)]
    #[case(vec![Some(true), None], EvaluationResult::Undetermined)]
    #[case(vec![Some(true), Some(true)], EvaluationResult::Fail)]
    fn test_at_most_one_systemic_line(
        #[case] systemic: Vec<Option<bool>>,
        #[case] expected: EvaluationResult,
    ) {
        let history = systemic
            .into_iter()
            .map(|s| treatment("Chemotherapy", s))
            .collect();
        let record = with_history(history);
        assert_eq!(
            evaluate("HAS_HAD_AT_MOST_X_SYSTEMIC_TREATMENT_LINES[1]", &record).result,
            expected
        );
    }

    #[test]
    fn test_second_malignancy() {
        assert_eq!(
            evaluate("HAS_HISTORY_OF_SECOND_MALIGNANCY", &patient()).result,
            EvaluationResult::Fail
        );

        let mut record = patient();
        record.prior_second_primaries.push(PriorSecondPrimary {
            tumor_location: "Skin".to_string(),
            diagnosed_year: Some(2015),
            is_active: false,
        });
        assert_eq!(
            evaluate("HAS_HISTORY_OF_SECOND_MALIGNANCY", &record).result,
            EvaluationResult::Pass
        );
    }
}
