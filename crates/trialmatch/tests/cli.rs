//! File loading and CLI command tests

use pretty_assertions::assert_eq;
use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use trialmatch::cli::match_cmd::{self, MatchConfig};
use trialmatch::cli::output::OutputFormat;
use trialmatch::cli::validate::{ValidateConfig, collect_problems};
use trialmatch::{EvaluationResult, TrialMatch, load_patient, load_trials};

const DOID_DUMP: &str = r#"{"graphs": [{
    "nodes": [
        {"id": "http://purl.obolibrary.org/obo/DOID_162", "lbl": "cancer"},
        {"id": "http://purl.obolibrary.org/obo/DOID_1324", "lbl": "lung cancer"},
        {"id": "http://purl.obolibrary.org/obo/DOID_3910", "lbl": "lung adenocarcinoma"}
    ],
    "edges": [
        {
            "sub": "http://purl.obolibrary.org/obo/DOID_1324",
            "pred": "is_a",
            "obj": "http://purl.obolibrary.org/obo/DOID_162"
        },
        {
            "sub": "http://purl.obolibrary.org/obo/DOID_3910",
            "pred": "is_a",
            "obj": "http://purl.obolibrary.org/obo/DOID_1324"
        }
    ]
}]}"#;

const PATIENT: &str = r#"{
    "patient_id": "ACTN01020001",
    "details": {"gender": "MALE", "birth_year": 1958, "registration_date": "2024-01-10"},
    "tumor": {
        "doids": ["3910"],
        "has_active_cns_lesions": false,
        "has_active_brain_lesions": false
    },
    "clinical_status": {"who": 1},
    "lab_values": [{"date": "2024-06-01", "code": "Hb", "value": "7.9", "unit": "g/dL"}]
}"#;

const TRIALS: &str = r#"[
    {
        "identification": {"trial_id": "LUNG-01", "title": "Lung cancer trial"},
        "general_eligibility": [
            {
                "references": [{"id": "I-01", "text": "Age >= 18"}],
                "rule": "IS_AT_LEAST_X_YEARS_OLD[18]"
            },
            {"rule": "HAS_PRIMARY_TUMOR_BELONGING_TO_DOID_TERM_X[lung cancer]"},
            {"rule": "NOT(HAS_KNOWN_ACTIVE_CNS_METASTASES)"},
            {"rule": "HAS_HEMOGLOBIN_G_PER_DL_OF_AT_LEAST_X[9.0]"}
        ],
        "cohorts": [
            {
                "metadata": {"cohort_id": "A", "description": "WHO 0-1"},
                "eligibility": [{"rule": "HAS_WHO_STATUS_OF_AT_MOST_X[1]"}]
            },
            {
                "metadata": {"cohort_id": "B", "description": "Female"},
                "eligibility": [{"rule": "IS_FEMALE"}]
            }
        ]
    },
    {
        "identification": {"trial_id": "BREAST-01"},
        "general_eligibility": [{"rule": "IS_FEMALE"}]
    }
]"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("doid.json"), DOID_DUMP).unwrap();
        fs::write(dir.path().join("patient.json"), PATIENT).unwrap();
        fs::write(dir.path().join("trials.json"), TRIALS).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn match_config(&self, format: OutputFormat, output_file: Option<PathBuf>) -> MatchConfig {
        MatchConfig {
            patient: self.path("patient.json"),
            trials: vec![self.path("trials.json")],
            doid: self.path("doid.json"),
            doid_config: None,
            reference_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 15),
            historic: false,
            format,
            output_file,
        }
    }
}

#[test]
fn test_load_patient_and_trials() {
    let fixture = Fixture::new();

    let record = load_patient(fixture.path("patient.json")).unwrap();
    assert_eq!(record.patient_id, "ACTN01020001");

    let trials = load_trials(fixture.path("trials.json")).unwrap();
    assert_eq!(trials.len(), 2);
    assert_eq!(trials[0].cohorts.len(), 2);
}

#[test]
fn test_missing_file_reports_path() {
    let error = load_patient(Path::new("/nonexistent/patient.json")).unwrap_err();
    assert!(error.to_string().contains("/nonexistent/patient.json"));
}

#[test]
fn test_match_evaluates_all_trials() {
    let fixture = Fixture::new();
    let matches = match_cmd::evaluate(&fixture.match_config(OutputFormat::Json, None)).unwrap();

    let ids: Vec<&str> = matches
        .iter()
        .map(|m| m.identification.trial_id.as_str())
        .collect();
    assert_eq!(ids, vec!["BREAST-01", "LUNG-01"]);
    assert!(!matches[0].is_potentially_eligible);

    let lung = &matches[1];
    assert!(lung.is_potentially_eligible);
    let eligible: Vec<&str> = lung
        .eligible_cohorts()
        .map(|c| c.metadata.cohort_id.as_str())
        .collect();
    assert_eq!(eligible, vec!["A"]);

    // Low hemoglobin is a recoverable failure
    let hemoglobin = lung
        .evaluations
        .iter()
        .find(|(e, _)| e.function.to_string().starts_with("HAS_HEMOGLOBIN"))
        .map(|(_, evaluation)| evaluation)
        .unwrap();
    assert_eq!(hemoglobin.result, EvaluationResult::Fail);
    assert!(hemoglobin.recoverable);
}

#[test]
fn test_match_writes_json_output() {
    let fixture = Fixture::new();
    let output = fixture.path("matches.json");
    match_cmd::run(fixture.match_config(OutputFormat::Pretty, Some(output.clone()))).unwrap();

    let json = fs::read_to_string(output).unwrap();
    let written: Vec<TrialMatch> = serde_json::from_str(&json).unwrap();
    let expected = match_cmd::evaluate(&fixture.match_config(OutputFormat::Json, None)).unwrap();
    assert_eq!(written, expected);
}

#[test]
fn test_match_without_trials_fails() {
    let fixture = Fixture::new();
    let mut config = fixture.match_config(OutputFormat::Json, None);
    config.trials.clear();
    assert!(match_cmd::evaluate(&config).is_err());
}

const BAD_INPUT: &str = r#"{
    "identification": {"trial_id": "T1"},
    "general_eligibility": [{"rule": "IS_MALE[1]"}]
}"#;

const UNKNOWN_DOID_AND_SHORT_AND: &str = r#"{
    "identification": {"trial_id": "T1"},
    "general_eligibility": [
        {"rule": "HAS_PRIMARY_TUMOR_BELONGING_TO_DOID_X[99999]"},
        {"rule": "AND(IS_MALE)"}
    ]
}"#;

const MISSPELLED_RULE: &str = r#"{
    "identification": {"trial_id": "T1"},
    "general_eligibility": [{"rule": "IS_MAEL"}]
}"#;

#[rstest]
#[case(TRIALS, 0)]
#[case(BAD_INPUT, 1)]
#[case(UNKNOWN_DOID_AND_SHORT_AND, 2)]
#[case(MISSPELLED_RULE, 1)]
fn test_validate_counts_problems(#[case] trials: &str, #[case] expected: usize) {
    let fixture = Fixture::new();
    let file = fixture.write("validate.json", trials);

    let problems = collect_problems(&ValidateConfig {
        files: vec![file],
        doid: fixture.path("doid.json"),
        doid_config: None,
        verbose: false,
    })
    .unwrap();
    assert_eq!(problems.len(), expected, "{problems:?}");
}
