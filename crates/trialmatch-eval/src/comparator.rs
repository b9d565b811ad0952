//! Total orders over match results
//!
//! Matching may run on several threads, and nothing guarantees that two runs
//! build their maps in the same order. Sorting with these comparators before
//! serialization makes identical input produce identical output.

use std::cmp::Ordering;
use trialmatch_types::{CohortMatch, Eligibility, Evaluation, EvaluationMap, TrialMatch};

/// Trial id, then eligible first, then cohorts, then general criteria
pub fn compare_trial_matches(a: &TrialMatch, b: &TrialMatch) -> Ordering {
    a.identification
        .trial_id
        .cmp(&b.identification.trial_id)
        .then_with(|| eligible_first(a.is_potentially_eligible, b.is_potentially_eligible))
        .then_with(|| a.cohorts.len().cmp(&b.cohorts.len()))
        .then_with(|| {
            a.cohorts
                .iter()
                .zip(&b.cohorts)
                .map(|(x, y)| compare_cohort_matches(x, y))
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| compare_evaluation_maps(&a.evaluations, &b.evaluations))
        .then_with(|| a.identification.cmp(&b.identification))
        .then_with(|| a.non_evaluable_cohorts.cmp(&b.non_evaluable_cohorts))
}

/// Cohort id, then eligible first, then criteria
pub fn compare_cohort_matches(a: &CohortMatch, b: &CohortMatch) -> Ordering {
    a.metadata
        .cohort_id
        .cmp(&b.metadata.cohort_id)
        .then_with(|| eligible_first(a.is_potentially_eligible, b.is_potentially_eligible))
        .then_with(|| compare_evaluation_maps(&a.evaluations, &b.evaluations))
        .then_with(|| a.metadata.cmp(&b.metadata))
}

/// Entry by entry, a shorter map that is a prefix of the other sorts first
pub fn compare_evaluation_maps(a: &EvaluationMap, b: &EvaluationMap) -> Ordering {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| compare_entries(x, y))
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

/// Function text, then result, then references, then the full evaluation
pub fn compare_entries(a: (&Eligibility, &Evaluation), b: (&Eligibility, &Evaluation)) -> Ordering {
    let (a_eligibility, a_evaluation) = a;
    let (b_eligibility, b_evaluation) = b;

    a_eligibility
        .function
        .to_string()
        .cmp(&b_eligibility.function.to_string())
        .then_with(|| a_evaluation.result.cmp(&b_evaluation.result))
        .then_with(|| a_eligibility.references.cmp(&b_eligibility.references))
        .then_with(|| a_evaluation.cmp(b_evaluation))
        .then_with(|| a_eligibility.cmp(b_eligibility))
}

/// Sort a criteria map in place by [`compare_entries`]
pub fn sort_evaluation_map(map: &mut EvaluationMap) {
    map.sort_by(|ak, av, bk, bv| compare_entries((ak, av), (bk, bv)));
}

fn eligible_first(a: bool, b: bool) -> Ordering {
    b.cmp(&a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use trialmatch_types::{
        CohortMetadata, CriterionReference, EligibilityFunction, EligibilityRule, EvaluationResult,
        TrialIdentification,
    };

    fn eligibility(rule: EligibilityRule) -> Eligibility {
        Eligibility::new(EligibilityFunction::new(rule))
    }

    fn map(entries: &[(Eligibility, EvaluationResult)]) -> EvaluationMap {
        entries
            .iter()
            .map(|(e, r)| (e.clone(), Evaluation::new(*r, false)))
            .collect()
    }

    fn trial(id: &str, eligible: bool, cohorts: Vec<CohortMatch>) -> TrialMatch {
        TrialMatch {
            identification: TrialIdentification::new(id),
            is_potentially_eligible: eligible,
            evaluations: EvaluationMap::new(),
            cohorts,
            non_evaluable_cohorts: Vec::new(),
        }
    }

    fn trial_key(trial: &TrialMatch) -> (&str, bool, usize) {
        let id = trial.identification.trial_id.as_str();
        (id, trial.is_potentially_eligible, trial.cohorts.len())
    }

    fn cohort(id: &str, eligible: bool) -> CohortMatch {
        CohortMatch {
            metadata: CohortMetadata::new(id, id),
            is_potentially_eligible: eligible,
            evaluations: EvaluationMap::new(),
        }
    }

    #[test]
    fn test_map_sorted_by_function_text() {
        let mut evaluations = map(&[
            (eligibility(EligibilityRule::IsMale), EvaluationResult::Pass),
            (eligibility(EligibilityRule::HasActiveInfection), EvaluationResult::Fail),
            (eligibility(EligibilityRule::IsFemale), EvaluationResult::Fail),
        ]);
        sort_evaluation_map(&mut evaluations);

        let order: Vec<String> = evaluations.keys().map(|e| e.function.to_string()).collect();
        assert_eq!(order, vec!["HAS_ACTIVE_INFECTION", "IS_FEMALE", "IS_MALE"]);
    }

    #[test]
    fn test_references_break_function_ties() {
        let reference = |id: &str| CriterionReference::new(id, "Male");
        let first = eligibility(EligibilityRule::IsMale).with_reference(reference("I-01"));
        let second = eligibility(EligibilityRule::IsMale).with_reference(reference("I-02"));

        let a = map(&[(first, EvaluationResult::Pass)]);
        let b = map(&[(second, EvaluationResult::Pass)]);
        assert_eq!(compare_evaluation_maps(&a, &b), Ordering::Less);
        assert_eq!(compare_evaluation_maps(&b, &a), Ordering::Greater);
    }

    #[test]
    fn test_prefix_map_sorts_first() {
        let short = map(&[(eligibility(EligibilityRule::IsMale), EvaluationResult::Pass)]);
        let long = map(&[
            (eligibility(EligibilityRule::IsMale), EvaluationResult::Pass),
            (eligibility(EligibilityRule::IsFemale), EvaluationResult::Fail),
        ]);
        assert_eq!(compare_evaluation_maps(&short, &long), Ordering::Less);
        let copy = short.clone();
        assert_eq!(compare_evaluation_maps(&short, &copy), Ordering::Equal);
    }

    #[test]
    fn test_trial_order_keys() {
        let mut trials = vec![
            trial("B", true, vec![]),
            trial("A", false, vec![]),
            trial("A", true, vec![cohort("1", true)]),
            trial("A", true, vec![]),
        ];
        trials.sort_by(compare_trial_matches);

        let keys: Vec<(&str, bool, usize)> = trials.iter().map(trial_key).collect();
        let expected = vec![
            ("A", true, 0),
            ("A", true, 1),
            ("A", false, 0),
            ("B", true, 0),
        ];
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_cohort_order_keys() {
        let mut cohorts = vec![cohort("B", true), cohort("A", false), cohort("A", true)];
        cohorts.sort_by(compare_cohort_matches);

        let keys: Vec<(&str, bool)> = cohorts
            .iter()
            .map(|c| (c.metadata.cohort_id.as_str(), c.is_potentially_eligible))
            .collect();
        assert_eq!(keys, vec![("A", true), ("A", false), ("B", true)]);
    }
}
