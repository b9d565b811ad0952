//! Reference date providers
//!
//! Age and recency predicates compare patient data with a reference date
//! rather than reading the clock themselves.

use chrono::{Local, NaiveDate};
use std::fmt::Debug;
use trialmatch_types::PatientRecord;

/// Source of "today" for time-dependent predicates
pub trait ReferenceDateProvider: Debug + Send + Sync {
    /// Reference date for evaluating this record
    fn date(&self, record: &PatientRecord) -> NaiveDate;
}

/// Always the same date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedReferenceDate(pub NaiveDate);

impl ReferenceDateProvider for FixedReferenceDate {
    fn date(&self, _record: &PatientRecord) -> NaiveDate {
        self.0
    }
}

/// Today's local date
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentReferenceDate;

impl ReferenceDateProvider for CurrentReferenceDate {
    fn date(&self, _record: &PatientRecord) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// The latest date found in the patient record, for re-running old cases
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoricReferenceDate;

impl ReferenceDateProvider for HistoricReferenceDate {
    fn date(&self, record: &PatientRecord) -> NaiveDate {
        record.latest_date()
    }
}
