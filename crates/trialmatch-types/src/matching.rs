//! Output of a matching run

use crate::eligibility::Eligibility;
use crate::evaluation::Evaluation;
use crate::trial::{CohortMetadata, TrialIdentification};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered map from criterion to its evaluation
pub type EvaluationMap = IndexMap<Eligibility, Evaluation>;

/// Match result for one evaluable cohort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortMatch {
    pub metadata: CohortMetadata,
    /// Cohort criteria pass and the trial's general criteria pass
    pub is_potentially_eligible: bool,
    #[serde(with = "evaluation_entries")]
    pub evaluations: EvaluationMap,
}

/// Match result for one trial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialMatch {
    pub identification: TrialIdentification,
    pub is_potentially_eligible: bool,
    #[serde(with = "evaluation_entries")]
    pub evaluations: EvaluationMap,
    pub cohorts: Vec<CohortMatch>,
    #[serde(default)]
    pub non_evaluable_cohorts: Vec<CohortMetadata>,
}

impl TrialMatch {
    /// Cohorts the patient may be enrolled in
    pub fn eligible_cohorts(&self) -> impl Iterator<Item = &CohortMatch> {
        self.cohorts.iter().filter(|c| c.is_potentially_eligible)
    }
}

/// JSON object keys must be strings, so criteria maps are written as a list
/// of `{eligibility, evaluation}` entries in map order.
mod evaluation_entries {
    use super::{Eligibility, Evaluation, EvaluationMap};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize)]
    struct EntryRef<'a> {
        eligibility: &'a Eligibility,
        evaluation: &'a Evaluation,
    }

    #[derive(Deserialize)]
    struct Entry {
        eligibility: Eligibility,
        evaluation: Evaluation,
    }

    pub fn serialize<S: Serializer>(map: &EvaluationMap, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = map.iter().map(|(eligibility, evaluation)| EntryRef {
            eligibility,
            evaluation,
        });
        serializer.collect_seq(entries)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<EvaluationMap, D::Error> {
        let entries = Vec::<Entry>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|entry| (entry.eligibility, entry.evaluation))
            .collect())
    }
}
