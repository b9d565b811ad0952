//! Patient record as seen by the leaf predicates
//!
//! Most clinical fields are optional: `None` means the data was never
//! curated, which predicates report as UNDETERMINED rather than FAIL.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Clinical and molecular view of one patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: String,
    pub details: PatientDetails,
    #[serde(default)]
    pub tumor: TumorDetails,
    #[serde(default)]
    pub clinical_status: ClinicalStatus,
    #[serde(default)]
    pub oncological_history: Vec<TreatmentHistoryEntry>,
    #[serde(default)]
    pub prior_second_primaries: Vec<PriorSecondPrimary>,
    #[serde(default)]
    pub lab_values: Vec<LabValue>,
    #[serde(default)]
    pub molecular: Option<MolecularRecord>,
}

impl PatientRecord {
    /// Record with only demographic details
    pub fn new(patient_id: impl Into<String>, details: PatientDetails) -> Self {
        Self {
            patient_id: patient_id.into(),
            details,
            tumor: TumorDetails::default(),
            clinical_status: ClinicalStatus::default(),
            oncological_history: Vec::new(),
            prior_second_primaries: Vec::new(),
            lab_values: Vec::new(),
            molecular: None,
        }
    }

    /// The most recent date recorded anywhere in the record
    pub fn latest_date(&self) -> NaiveDate {
        let lab_dates = self.lab_values.iter().map(|lab| lab.date);
        let molecular_date = self.molecular.iter().filter_map(|m| m.date);
        lab_dates
            .chain(molecular_date)
            .fold(self.details.registration_date, NaiveDate::max)
    }

    /// Lab values with the given code, most recent first
    pub fn lab_values_by_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a LabValue> {
        let mut values: Vec<&LabValue> = self
            .lab_values
            .iter()
            .filter(|lab| lab.code == code)
            .collect();
        values.sort_by(|a, b| b.date.cmp(&a.date));
        values.into_iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientDetails {
    pub gender: Gender,
    pub birth_year: i32,
    /// 1-12, when known
    #[serde(default)]
    pub birth_month: Option<u32>,
    pub registration_date: NaiveDate,
}

/// Curated tumor details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TumorDetails {
    /// Primary tumor DOIDs, `None` when the tumor type is unknown
    pub doids: Option<BTreeSet<String>>,
    pub has_measurable_disease: Option<bool>,
    pub has_brain_lesions: Option<bool>,
    pub has_active_brain_lesions: Option<bool>,
    pub has_cns_lesions: Option<bool>,
    pub has_active_cns_lesions: Option<bool>,
    pub has_liver_lesions: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicalStatus {
    /// WHO performance status, 0-5
    pub who: Option<u8>,
    pub has_active_infection: Option<bool>,
}

/// One line of prior treatment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentHistoryEntry {
    pub name: String,
    #[serde(default)]
    pub is_systemic: Option<bool>,
    #[serde(default)]
    pub start_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorSecondPrimary {
    pub tumor_location: String,
    #[serde(default)]
    pub diagnosed_year: Option<i32>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabValue {
    pub date: NaiveDate,
    /// Lab code, e.g. `Hb`
    pub code: String,
    pub value: Decimal,
    pub unit: String,
}

/// Result of the most recent molecular test
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MolecularRecord {
    pub date: Option<NaiveDate>,
    pub amplifications: Vec<Amplification>,
    pub variants: Vec<Variant>,
    pub fusions: Vec<Fusion>,
    pub losses: Vec<Loss>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amplification {
    pub gene: String,
    #[serde(default = "reportable")]
    pub is_reportable: bool,
    #[serde(default)]
    pub min_copies: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub gene: String,
    /// Protein impact, e.g. `p.V600E`
    pub event: String,
    #[serde(default = "reportable")]
    pub is_reportable: bool,
    #[serde(default)]
    pub is_hotspot: bool,
    #[serde(default)]
    pub is_biallelic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fusion {
    pub gene_start: String,
    pub gene_end: String,
    #[serde(default = "reportable")]
    pub is_reportable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loss {
    pub gene: String,
    #[serde(default = "reportable")]
    pub is_reportable: bool,
}

fn reportable() -> bool {
    true
}
