//! Primary tumor type and metastases

use super::{CANCER_DOID, HEMATOLOGIC_CANCER_DOID};
use crate::error::EvalResult;
use crate::registry::{FunctionRegistryBuilder, LeafDefinition, PredicateContext, PredicateOutcome};
use std::collections::BTreeSet;
use trialmatch_doid::DoidModel;
use trialmatch_types::{EligibilityRule, PatientRecord};

pub fn register(builder: &mut FunctionRegistryBuilder) {
    builder
        .register_leaf(
            EligibilityRule::HasSolidPrimaryTumor,
            LeafDefinition::new(has_solid_primary_tumor)
                .pass_message("Patient has a solid primary tumor", "Solid primary tumor")
                .fail_message("Patient has a non-solid primary tumor", "Non-solid tumor"),
        )
        .register_leaf(
            EligibilityRule::HasPrimaryTumorBelongingToDoidX,
            LeafDefinition::new(has_primary_tumor_belonging_to_doid)
                .pass_message("Patient has a tumor of DOID {0}", "Adequate tumor type")
                .fail_message("Patient has no tumor of DOID {0}", "Inadequate tumor type"),
        )
        .register_leaf(
            EligibilityRule::HasPrimaryTumorBelongingToDoidTermX,
            LeafDefinition::new(has_primary_tumor_belonging_to_doid)
                .pass_message("Patient has {0}", "Adequate tumor type")
                .fail_message("Patient has no {0}", "Inadequate tumor type"),
        )
        .register_leaf(
            EligibilityRule::HasMeasurableDisease,
            LeafDefinition::new(|_, record| {
                let measurable = record.tumor.has_measurable_disease;
                Ok(known(measurable, "measurable disease"))
            })
            .pass_message("Patient has measurable disease", "Measurable disease")
            .fail_message("Patient has no measurable disease", "No measurable disease"),
        )
        .register_leaf(
            EligibilityRule::HasKnownActiveCnsMetastases,
            LeafDefinition::new(|_, record| {
                let tumor = &record.tumor;
                Ok(any_known(
                    &[tumor.has_active_cns_lesions, tumor.has_active_brain_lesions],
                    "active CNS metastases",
                ))
            })
            .pass_message("Patient has active CNS metastases", "Active CNS metastases")
            .fail_message(
                "Patient has no known active CNS metastases",
                "No active CNS metastases",
            ),
        )
        .register_leaf(
            EligibilityRule::HasKnownBrainMetastases,
            LeafDefinition::new(|_, record| {
                let brain = record.tumor.has_brain_lesions;
                Ok(known(brain, "brain metastases"))
            })
            .pass_message("Patient has brain metastases", "Brain metastases")
            .fail_message(
                "Patient has no known brain metastases",
                "No brain metastases",
            ),
        )
        .register_leaf(
            EligibilityRule::HasKnownLiverMetastases,
            LeafDefinition::new(|_, record| {
                let liver = record.tumor.has_liver_lesions;
                Ok(known(liver, "liver metastases"))
            })
            .pass_message("Patient has liver metastases", "Liver metastases")
            .fail_message(
                "Patient has no known liver metastases",
                "No liver metastases",
            ),
        );
}

fn tumor_doids(record: &PatientRecord) -> Option<&BTreeSet<String>> {
    record
        .tumor
        .doids
        .as_ref()
        .filter(|doids| !doids.is_empty())
}

fn unknown_tumor_type() -> PredicateOutcome {
    PredicateOutcome::undetermined(
        "Tumor type of patient is unknown",
        "Undetermined tumor type",
    )
}

fn has_solid_primary_tumor(
    context: &PredicateContext<'_>,
    record: &PatientRecord,
) -> EvalResult<PredicateOutcome> {
    let Some(doids) = tumor_doids(record) else {
        return Ok(unknown_tumor_type());
    };

    let model = context.doid_model();
    let hematologic = doids
        .iter()
        .any(|doid| is_of_type(model, doid, HEMATOLOGIC_CANCER_DOID));
    if hematologic {
        return Ok(PredicateOutcome::Fail);
    }
    if doids.iter().all(|doid| doid == CANCER_DOID) {
        return Ok(PredicateOutcome::undetermined(
            "Tumor type is too generic to decide whether it is solid",
            "Undetermined solid tumor",
        ));
    }
    Ok(PredicateOutcome::Pass)
}

/// Shared by the DOID and DOID-term rules; the resolver maps terms to DOIDs
fn has_primary_tumor_belonging_to_doid(
    context: &PredicateContext<'_>,
    record: &PatientRecord,
) -> EvalResult<PredicateOutcome> {
    let target = context.doid()?;
    let Some(doids) = tumor_doids(record) else {
        return Ok(unknown_tumor_type());
    };

    let model = context.doid_model();
    Ok(PredicateOutcome::from_bool(
        doids.iter().any(|doid| is_of_type(model, doid, target)),
    ))
}

fn is_of_type(model: &DoidModel, doid: &str, ancestor: &str) -> bool {
    model.doid_with_parents(doid).contains(ancestor)
}

fn known(flag: Option<bool>, what: &str) -> PredicateOutcome {
    match flag {
        Some(value) => PredicateOutcome::from_bool(value),
        None => PredicateOutcome::undetermined(
            format!("Data on {what} is missing"),
            format!("Undetermined {what}"),
        ),
    }
}

/// Pass if any flag is set, fail only when all are known to be unset
fn any_known(flags: &[Option<bool>], what: &str) -> PredicateOutcome {
    if flags.contains(&Some(true)) {
        PredicateOutcome::Pass
    } else if flags.iter().all(Option::is_some) {
        PredicateOutcome::Fail
    } else {
        known(None, what)
    }
}
