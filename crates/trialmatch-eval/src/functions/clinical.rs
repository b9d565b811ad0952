//! Clinical status and laboratory values

use crate::error::EvalResult;
use crate::registry::{FunctionRegistryBuilder, LeafDefinition, PredicateContext, PredicateOutcome};
use chrono::Duration;
use rust_decimal::Decimal;
use trialmatch_types::{EligibilityRule, PatientRecord};

/// Lab code of hemoglobin
pub const HEMOGLOBIN_CODE: &str = "Hb";

/// Lab values older than this are not used
const MAX_LAB_AGE_DAYS: i64 = 90;

pub fn register(builder: &mut FunctionRegistryBuilder) {
    builder
        .register_leaf(
            EligibilityRule::HasActiveInfection,
            LeafDefinition::new(|_, record| {
                Ok(match record.clinical_status.has_active_infection {
                    Some(active) => PredicateOutcome::from_bool(active),
                    None => PredicateOutcome::undetermined(
                        "Data on active infection is missing",
                        "Undetermined infection status",
                    ),
                })
            })
            .pass_message("Patient has an active infection", "Active infection")
            .fail_message("Patient has no active infection", "No active infection"),
        )
        .register_leaf(
            EligibilityRule::HasHemoglobinGPerDlOfAtLeastX,
            LeafDefinition::new(has_hemoglobin_of_at_least)
                .pass_message("Hemoglobin is at least {0} g/dL", "Adequate hemoglobin")
                .fail_message("Hemoglobin is below {0} g/dL", "Inadequate hemoglobin")
                .recoverable(),
        )
        .register_leaf(
            EligibilityRule::HasHadOrganTransplant,
            LeafDefinition::new(|_, _| Ok(PredicateOutcome::NotImplemented)),
        );
}

/// Most recent hemoglobin, in g/dL or converted from mmol/L
fn has_hemoglobin_of_at_least(
    context: &PredicateContext<'_>,
    record: &PatientRecord,
) -> EvalResult<PredicateOutcome> {
    let min_value = context.decimal()?;

    let Some(lab) = record.lab_values_by_code(HEMOGLOBIN_CODE).next() else {
        return Ok(PredicateOutcome::undetermined(
            "No hemoglobin measurement available",
            "Undetermined hemoglobin",
        ));
    };

    let measured = lab.date;
    if context.reference_date() - measured > Duration::days(MAX_LAB_AGE_DAYS) {
        return Ok(PredicateOutcome::undetermined(
            format!("Most recent hemoglobin ({measured}) is older than {MAX_LAB_AGE_DAYS} days"),
            "Undetermined hemoglobin",
        ));
    }

    let value = match lab.unit.as_str() {
        "g/dL" => lab.value,
        "mmol/L" => lab.value * Decimal::new(1611, 3),
        unit => {
            return Ok(PredicateOutcome::undetermined(
                format!("Hemoglobin unit '{unit}' cannot be compared"),
                "Undetermined hemoglobin",
            ));
        }
    };

    Ok(PredicateOutcome::from_bool(value >= min_value))
}
