//! End-to-end matching scenarios

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use trialmatch_doid::DoidModel;
use trialmatch_eval::{EvalError, FixedReferenceDate, FunctionRegistry, TrialMatcher, match_trials};
use trialmatch_types::{
    Cohort, CohortMetadata, CriterionReference, Eligibility, EligibilityFunction, EligibilityRule,
    EvaluationResult, Gender, LabValue, MAX_FUNCTION_DEPTH, MolecularRecord, PatientDetails,
    PatientRecord, Trial, TrialIdentification, Variant,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn doid_model() -> DoidModel {
    DoidModel::builder()
        .add_term("162", "cancer")
        .add_term("1324", "lung cancer")
        .add_term("3910", "lung adenocarcinoma")
        .add_term("1612", "breast cancer")
        .add_is_a("1324", "162")
        .add_is_a("3910", "1324")
        .add_is_a("1612", "162")
        .build()
}

fn registry() -> FunctionRegistry {
    let reference_date = FixedReferenceDate(date(2024, 6, 15));
    FunctionRegistry::standard(Arc::new(doid_model()), Arc::new(reference_date)).unwrap()
}

fn patient(birth_year: i32, birth_month: Option<u32>) -> PatientRecord {
    PatientRecord::new(
        "ACTN01020001",
        PatientDetails {
            gender: Gender::Female,
            birth_year,
            birth_month,
            registration_date: date(2024, 1, 10),
        },
    )
}

fn criterion(id: &str, rule: &str) -> Eligibility {
    let function = trialmatch_parser::parse_function(rule).unwrap();
    Eligibility::new(function).with_reference(CriterionReference::new(id, rule))
}

fn age_trial() -> Trial {
    Trial {
        identification: TrialIdentification::new("AGE"),
        general_eligibility: vec![criterion("I-01", "IS_AT_LEAST_X_YEARS_OLD[18]")],
        cohorts: vec![Cohort {
            metadata: CohortMetadata::new("A", "All patients"),
            eligibility: Vec::new(),
        }],
    }
}

#[test]
fn test_patient_of_exactly_18_is_eligible() {
    let matches = match_trials(&patient(2006, Some(3)), &[age_trial()], &registry()).unwrap();
    let trial = &matches[0];

    let evaluation = trial.evaluations.values().next().unwrap();
    assert_eq!(evaluation.result, EvaluationResult::Pass);
    assert!(trial.is_potentially_eligible);
    assert!(trial.cohorts[0].is_potentially_eligible);
}

#[test]
fn test_ambiguous_age_is_undetermined_but_eligible() {
    let matches = match_trials(&patient(2006, None), &[age_trial()], &registry()).unwrap();
    let trial = &matches[0];

    let evaluation = trial.evaluations.values().next().unwrap();
    assert_eq!(evaluation.result, EvaluationResult::Undetermined);
    assert!(trial.is_potentially_eligible);
    assert!(trial.cohorts[0].is_potentially_eligible);
}

#[test]
fn test_not_of_failing_or_passes() {
    let rule = "NOT(OR(IS_MALE, HAS_HISTORY_OF_SECOND_MALIGNANCY))";
    let function = trialmatch_parser::parse_function(rule).unwrap();
    let registry = registry();
    let record = patient(1960, None);

    let or = function.sub_functions().next().unwrap();
    let inner = registry.evaluate(or, &record).unwrap();
    assert_eq!(inner.result, EvaluationResult::Fail);
    let outer = registry.evaluate(&function, &record).unwrap();
    assert_eq!(outer.result, EvaluationResult::Pass);
}

#[test]
fn test_warn_if_never_blocks_eligibility() {
    let trial = Trial {
        identification: TrialIdentification::new("WARN"),
        general_eligibility: vec![criterion(
            "I-01",
            "WARN_IF(HAS_HEMOGLOBIN_G_PER_DL_OF_AT_LEAST_X[9.0])",
        )],
        cohorts: Vec::new(),
    };
    let mut record = patient(1960, None);
    record.lab_values.push(LabValue {
        date: date(2024, 6, 1),
        code: "Hb".to_string(),
        value: "10.2".parse().unwrap(),
        unit: "g/dL".to_string(),
    });

    let matches = match_trials(&record, &[trial], &registry()).unwrap();
    let evaluation = matches[0].evaluations.values().next().unwrap();
    assert_eq!(evaluation.result, EvaluationResult::PassButWarn);
    assert!(evaluation.recoverable);
    assert!(matches[0].is_potentially_eligible);
}

#[test]
fn test_not_implemented_rule_blocks_eligibility() {
    let trial = Trial {
        identification: TrialIdentification::new("STUB"),
        general_eligibility: vec![criterion("E-01", "HAS_HAD_ORGAN_TRANSPLANT")],
        cohorts: Vec::new(),
    };
    let matches = match_trials(&patient(1960, None), &[trial], &registry()).unwrap();
    assert!(!matches[0].is_potentially_eligible);
}

fn trials() -> Vec<Trial> {
    vec![
        Trial {
            identification: TrialIdentification::new("LUNG"),
            general_eligibility: vec![
                criterion("I-01", "IS_AT_LEAST_X_YEARS_OLD[18]"),
                criterion(
                    "I-02",
                    "HAS_PRIMARY_TUMOR_BELONGING_TO_DOID_TERM_X[lung cancer]",
                ),
                criterion("E-01", "NOT(HAS_KNOWN_ACTIVE_CNS_METASTASES)"),
            ],
            cohorts: vec![
                Cohort {
                    metadata: CohortMetadata::new("EGFR", "EGFR mutated"),
                    eligibility: vec![criterion("C-01", "MUTATION_IN_GENE_X[EGFR]")],
                },
                Cohort {
                    metadata: CohortMetadata::new("OTHER", "Other"),
                    eligibility: vec![criterion("C-02", "NOT(MUTATION_IN_GENE_X[EGFR])")],
                },
                Cohort {
                    metadata: CohortMetadata::new("CLOSED", "Closed").non_evaluable(),
                    eligibility: Vec::new(),
                },
            ],
        },
        Trial {
            identification: TrialIdentification::new("BREAST"),
            general_eligibility: vec![
                criterion("I-01", "IS_FEMALE"),
                criterion("I-02", "HAS_PRIMARY_TUMOR_BELONGING_TO_DOID_X[1612]"),
            ],
            cohorts: Vec::new(),
        },
        age_trial(),
    ]
}

fn lung_patient() -> PatientRecord {
    let mut record = patient(1962, Some(4));
    record.tumor.doids = Some(["3910".to_string()].into_iter().collect());
    record.tumor.has_active_cns_lesions = Some(false);
    record.tumor.has_active_brain_lesions = Some(false);
    record.molecular = Some(MolecularRecord {
        date: Some(date(2024, 2, 1)),
        variants: vec![Variant {
            gene: "EGFR".to_string(),
            event: "p.L858R".to_string(),
            is_reportable: true,
            is_hotspot: true,
            is_biallelic: false,
        }],
        ..MolecularRecord::default()
    });
    record
}

#[test]
fn test_lung_patient_matches_egfr_cohort() {
    let matches = TrialMatcher::new(Arc::new(registry()))
        .determine_eligibility(&lung_patient(), &trials())
        .unwrap();

    let ids: Vec<&str> = matches
        .iter()
        .map(|m| m.identification.trial_id.as_str())
        .collect();
    assert_eq!(ids, vec!["AGE", "BREAST", "LUNG"]);

    let lung = &matches[2];
    assert!(lung.is_potentially_eligible);
    let eligible: Vec<&str> = lung
        .eligible_cohorts()
        .map(|c| c.metadata.cohort_id.as_str())
        .collect();
    assert_eq!(eligible, vec!["EGFR"]);
    assert_eq!(lung.non_evaluable_cohorts.len(), 1);

    let egfr = &lung.cohorts[0];
    let evaluation = egfr.evaluations.values().next().unwrap();
    let events = &evaluation.inclusion_molecular_events;
    assert!(events.contains("EGFR p.L858R"));

    assert!(!matches[1].is_potentially_eligible);
}

#[test]
fn test_parallel_runs_serialize_identically() {
    let registry = Arc::new(registry());
    let record = lung_patient();
    let trials = trials();
    let mut reversed = trials.clone();
    reversed.reverse();

    let outputs: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = Arc::clone(&registry);
                let record = &record;
                let trials = if i % 2 == 0 { &trials } else { &reversed };
                scope.spawn(move || {
                    let matches = match_trials(record, trials, &registry).unwrap();
                    serde_json::to_string(&matches).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for output in &outputs[1..] {
        assert_eq!(output, &outputs[0]);
    }
}

#[test]
fn test_deeply_nested_function_is_rejected() {
    let mut function = EligibilityFunction::new(EligibilityRule::IsMale);
    for _ in 0..1000 {
        function = EligibilityFunction::composite(EligibilityRule::Not, [function]);
    }

    let record = patient(1960, None);
    let err = registry().evaluate(&function, &record).unwrap_err();
    let EvalError::TooDeep { max_depth, .. } = err else {
        panic!("Expected nesting error, got: {err:?}");
    };
    assert_eq!(max_depth, MAX_FUNCTION_DEPTH);
}
