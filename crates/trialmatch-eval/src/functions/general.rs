//! Demographics, performance status and consent

use crate::error::EvalResult;
use crate::registry::{FunctionRegistryBuilder, LeafDefinition, PredicateContext, PredicateOutcome};
use chrono::Datelike;
use std::cmp::Ordering;
use trialmatch_types::{EligibilityRule, Gender, PatientRecord};

pub fn register(builder: &mut FunctionRegistryBuilder) {
    builder
        .register_leaf(
            EligibilityRule::IsAtLeastXYearsOld,
            LeafDefinition::new(is_at_least_years_old)
                .pass_message("Patient is at least {0} years old", "Adequate age")
                .fail_message("Patient is younger than {0} years old", "Inadequate age"),
        )
        .register_leaf(
            EligibilityRule::IsMale,
            LeafDefinition::new(|_, record| Ok(is_gender(record, Gender::Male)))
                .pass_message("Patient is male", "Adequate gender")
                .fail_message("Patient is not male", "Inadequate gender"),
        )
        .register_leaf(
            EligibilityRule::IsFemale,
            LeafDefinition::new(|_, record| Ok(is_gender(record, Gender::Female)))
                .pass_message("Patient is female", "Adequate gender")
                .fail_message("Patient is not female", "Inadequate gender"),
        )
        .register_leaf(
            EligibilityRule::HasWhoStatusOfAtMostX,
            LeafDefinition::new(has_who_status_of_at_most)
                .pass_message("Patient WHO status is at most {0}", "Adequate WHO status")
                .fail_message("Patient WHO status exceeds {0}", "Inadequate WHO status"),
        )
        .register_leaf(
            EligibilityRule::CanGiveAdequateInformedConsent,
            LeafDefinition::new(|_, _| Ok(PredicateOutcome::NotEvaluated))
                .pass_message(
                    "It is assumed that patient can provide adequate informed consent",
                    "Informed consent",
                ),
        )
        .register_leaf(
            EligibilityRule::IsInvolvedInStudyProcedures,
            LeafDefinition::new(|_, _| Ok(PredicateOutcome::NotEvaluated))
                .pass_message(
                    "It is assumed that patient is not involved in study procedures",
                    "Study procedures",
                ),
        );
}

/// Age from birth year, with birth month breaking the tie when known
fn is_at_least_years_old(
    context: &PredicateContext<'_>,
    record: &PatientRecord,
) -> EvalResult<PredicateOutcome> {
    let min_age = context.integer()?;
    let reference = context.reference_date();
    let age_by_year = i64::from(reference.year() - record.details.birth_year);
    let birth_month = record.details.birth_month;

    let outcome = match age_by_year.cmp(&min_age) {
        Ordering::Greater => PredicateOutcome::Pass,
        Ordering::Less => PredicateOutcome::Fail,
        Ordering::Equal => match birth_month.map(|month| month.cmp(&reference.month())) {
            Some(Ordering::Less) => PredicateOutcome::Pass,
            Some(Ordering::Greater) => PredicateOutcome::Fail,
            _ => PredicateOutcome::undetermined(
                format!("Patient may be younger than {min_age} years old"),
                "Undetermined age",
            ),
        },
    };
    Ok(outcome)
}

fn is_gender(record: &PatientRecord, gender: Gender) -> PredicateOutcome {
    PredicateOutcome::from_bool(record.details.gender == gender)
}

fn has_who_status_of_at_most(
    context: &PredicateContext<'_>,
    record: &PatientRecord,
) -> EvalResult<PredicateOutcome> {
    let max_who = context.integer()?;
    let outcome = match record.clinical_status.who {
        Some(who) => PredicateOutcome::from_bool(i64::from(who) <= max_who),
        None => PredicateOutcome::undetermined("WHO status is missing", "Undetermined WHO status"),
    };
    Ok(outcome)
}
