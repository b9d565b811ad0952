//! Molecular events on a single gene
//!
//! Passing gene rules carry the events that made them pass, so a trial
//! report can show which findings a patient was matched on.

use crate::error::EvalResult;
use crate::registry::{FunctionRegistryBuilder, LeafDefinition, PredicateContext, PredicateOutcome};
use std::collections::BTreeSet;
use trialmatch_types::{EligibilityRule, MolecularRecord, PatientRecord};

pub fn register(builder: &mut FunctionRegistryBuilder) {
    builder
        .register_leaf(
            EligibilityRule::ActivationOrAmplificationOfGeneX,
            LeafDefinition::new(|context, record| {
                with_molecular(context, record, |gene, molecular| {
                    let mut events = amplification_events(gene, molecular);
                    events.extend(
                        molecular
                            .variants
                            .iter()
                            .filter(|v| v.gene == gene && v.is_reportable && v.is_hotspot)
                            .map(|v| format!("{} {}", v.gene, v.event)),
                    );
                    events_outcome(events)
                })
            })
            .pass_message(
                "Activation or amplification of {0}",
                "{0} activation or amplification",
            )
            .fail_message(
                "No activation or amplification of {0}",
                "No {0} activation or amplification",
            ),
        )
        .register_leaf(
            EligibilityRule::AmplificationOfGeneX,
            LeafDefinition::new(|context, record| {
                with_molecular(context, record, |gene, molecular| {
                    events_outcome(amplification_events(gene, molecular))
                })
            })
            .pass_message("Amplification of {0}", "{0} amplification")
            .fail_message("No amplification of {0}", "No {0} amplification"),
        )
        .register_leaf(
            EligibilityRule::MutationInGeneX,
            LeafDefinition::new(|context, record| {
                with_molecular(context, record, |gene, molecular| {
                    events_outcome(mutation_events(gene, molecular))
                })
            })
            .pass_message("Mutation in {0}", "{0} mutation")
            .fail_message("No mutation in {0}", "No {0} mutation"),
        )
        .register_leaf(
            EligibilityRule::FusionInGeneX,
            LeafDefinition::new(|context, record| {
                with_molecular(context, record, |gene, molecular| {
                    events_outcome(fusion_events(gene, molecular))
                })
            })
            .pass_message("Fusion in {0}", "{0} fusion")
            .fail_message("No fusion in {0}", "No {0} fusion"),
        )
        .register_leaf(
            EligibilityRule::InactivationOfGeneX,
            LeafDefinition::new(|context, record| with_molecular(context, record, inactivation))
                .pass_message("Inactivation of {0}", "{0} inactivation")
                .fail_message("No inactivation of {0}", "No {0} inactivation"),
        );
}

/// Run a gene check, undetermined when the patient was never tested
fn with_molecular<F>(
    context: &PredicateContext<'_>,
    record: &PatientRecord,
    check: F,
) -> EvalResult<PredicateOutcome>
where
    F: FnOnce(&str, &MolecularRecord) -> PredicateOutcome,
{
    let gene = context.gene()?;
    Ok(match &record.molecular {
        Some(molecular) => check(gene, molecular),
        None => PredicateOutcome::undetermined(
            format!("No molecular data to determine {gene} status"),
            "Molecular data missing",
        ),
    })
}

fn amplification_events(gene: &str, molecular: &MolecularRecord) -> BTreeSet<String> {
    molecular
        .amplifications
        .iter()
        .filter(|a| a.gene == gene && a.is_reportable)
        .map(|a| format!("{} amp", a.gene))
        .collect()
}

fn mutation_events(gene: &str, molecular: &MolecularRecord) -> BTreeSet<String> {
    molecular
        .variants
        .iter()
        .filter(|v| v.gene == gene && v.is_reportable)
        .map(|v| format!("{} {}", v.gene, v.event))
        .collect()
}

/// Fusions with the gene on either side
fn fusion_events(gene: &str, molecular: &MolecularRecord) -> BTreeSet<String> {
    molecular
        .fusions
        .iter()
        .filter(|f| f.is_reportable && (f.gene_start == gene || f.gene_end == gene))
        .map(|f| format!("{}-{} fusion", f.gene_start, f.gene_end))
        .collect()
}

fn events_outcome(events: BTreeSet<String>) -> PredicateOutcome {
    if events.is_empty() {
        PredicateOutcome::Fail
    } else {
        PredicateOutcome::PassWithEvents(events)
    }
}

/// A loss or biallelic variant inactivates the gene; a single-hit variant only might
fn inactivation(gene: &str, molecular: &MolecularRecord) -> PredicateOutcome {
    let mut events: BTreeSet<String> = molecular
        .losses
        .iter()
        .filter(|l| l.gene == gene && l.is_reportable)
        .map(|l| format!("{} del", l.gene))
        .collect();

    let variants = molecular
        .variants
        .iter()
        .filter(|v| v.gene == gene && v.is_reportable);
    let mut single_hit = Vec::new();
    for variant in variants {
        let event = format!("{} {}", variant.gene, variant.event);
        if variant.is_biallelic {
            events.insert(event);
        } else {
            single_hit.push(event);
        }
    }

    if !events.is_empty() {
        PredicateOutcome::PassWithEvents(events)
    } else if !single_hit.is_empty() {
        let hits = single_hit.join(", ");
        PredicateOutcome::warn(
            format!("{hits} may not inactivate {gene} (no second hit)"),
            format!("Potential {gene} inactivation"),
        )
    } else {
        PredicateOutcome::Fail
    }
}
