//! Matching a patient against a list of trials
//!
//! Matching keeps no state between calls. [`match_trials`] is a pure function
//! of the record, the trials and the registry, so any number of patients can
//! be matched concurrently against one shared registry.

use crate::comparator::{compare_cohort_matches, compare_trial_matches, sort_evaluation_map};
use crate::error::EvalResult;
use crate::registry::FunctionRegistry;
use chrono::NaiveDate;
use std::sync::Arc;
use trialmatch_types::{
    Cohort, CohortMatch, Eligibility, Evaluation, EvaluationMap, PatientRecord, Trial, TrialMatch,
};

/// Whether none of the evaluations is an unrecoverable FAIL or NOT_IMPLEMENTED
///
/// WARN, UNDETERMINED and recoverable failures never disqualify.
pub fn is_potentially_eligible<'a>(evaluations: impl IntoIterator<Item = &'a Evaluation>) -> bool {
    !evaluations
        .into_iter()
        .any(Evaluation::is_unrecoverable_failure)
}

/// Matches patients against trials with a shared registry
#[derive(Clone)]
pub struct TrialMatcher {
    registry: Arc<FunctionRegistry>,
}

impl TrialMatcher {
    pub fn new(registry: Arc<FunctionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Evaluate every trial for the patient, sorted deterministically
    pub fn determine_eligibility(
        &self,
        record: &PatientRecord,
        trials: &[Trial],
    ) -> EvalResult<Vec<TrialMatch>> {
        match_trials(record, trials, &self.registry)
    }
}

/// Evaluate every trial for the patient
///
/// The reference date is resolved once, so every trial of the run sees the same
/// date. The first configuration error aborts the whole run; there is no partial
/// result.
pub fn match_trials(
    record: &PatientRecord,
    trials: &[Trial],
    registry: &FunctionRegistry,
) -> EvalResult<Vec<TrialMatch>> {
    let reference_date = registry.reference_date(record);
    let mut matches = trials
        .iter()
        .map(|trial| {
            match_trial_at(record, trial, registry, reference_date)
                .map_err(|e| e.in_trial(trial.identification.trial_id.as_str()))
        })
        .collect::<EvalResult<Vec<_>>>()?;
    matches.sort_by(compare_trial_matches);

    let eligible = matches.iter().filter(|m| m.is_potentially_eligible).count();
    log::info!(
        "Patient {}: {eligible} of {} trials potentially eligible",
        record.patient_id,
        matches.len()
    );
    Ok(matches)
}

/// Evaluate one trial: general criteria first, then every evaluable cohort
pub fn match_trial(
    record: &PatientRecord,
    trial: &Trial,
    registry: &FunctionRegistry,
) -> EvalResult<TrialMatch> {
    match_trial_at(record, trial, registry, registry.reference_date(record))
}

fn match_trial_at(
    record: &PatientRecord,
    trial: &Trial,
    registry: &FunctionRegistry,
    reference_date: NaiveDate,
) -> EvalResult<TrialMatch> {
    let evaluate = |eligibility: &[Eligibility]| {
        evaluate_eligibility(record, eligibility, registry, reference_date)
    };
    let evaluations = evaluate(&trial.general_eligibility)?;
    let trial_passes = is_potentially_eligible(evaluations.values());

    let (evaluable, non_evaluable): (Vec<&Cohort>, Vec<&Cohort>) = trial
        .cohorts
        .iter()
        .partition(|cohort| cohort.metadata.evaluable);

    let mut cohorts = evaluable
        .into_iter()
        .map(|cohort| {
            let evaluations = evaluate(&cohort.eligibility)?;
            let cohort_passes = is_potentially_eligible(evaluations.values());
            log::debug!(
                "Cohort {} of trial {}: potentially eligible = {}",
                cohort.metadata.cohort_id,
                trial.identification.trial_id,
                cohort_passes && trial_passes
            );
            Ok(CohortMatch {
                metadata: cohort.metadata.clone(),
                is_potentially_eligible: cohort_passes && trial_passes,
                evaluations,
            })
        })
        .collect::<EvalResult<Vec<_>>>()?;
    cohorts.sort_by(compare_cohort_matches);

    let any_cohort = cohorts.is_empty() || cohorts.iter().any(|c| c.is_potentially_eligible);
    let is_eligible = trial_passes && any_cohort;
    log::debug!(
        "Trial {}: general criteria pass = {trial_passes}, potentially eligible = {is_eligible}",
        trial.identification.trial_id
    );

    let mut non_evaluable_cohorts: Vec<_> = non_evaluable
        .into_iter()
        .map(|c| c.metadata.clone())
        .collect();
    non_evaluable_cohorts.sort();

    Ok(TrialMatch {
        identification: trial.identification.clone(),
        is_potentially_eligible: is_eligible,
        evaluations,
        cohorts,
        non_evaluable_cohorts,
    })
}

fn evaluate_eligibility(
    record: &PatientRecord,
    eligibility: &[Eligibility],
    registry: &FunctionRegistry,
    reference_date: NaiveDate,
) -> EvalResult<EvaluationMap> {
    let mut evaluations = eligibility
        .iter()
        .map(|criterion| {
            let evaluation = registry.evaluate_at(&criterion.function, record, reference_date)?;
            Ok((criterion.clone(), evaluation))
        })
        .collect::<EvalResult<EvaluationMap>>()?;
    sort_evaluation_map(&mut evaluations);
    Ok(evaluations)
}
