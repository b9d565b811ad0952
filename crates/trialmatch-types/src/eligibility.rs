//! Named criteria consumed by the matcher

use crate::function::EligibilityFunction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Reference into the trial protocol text (e.g. `I-01`, "Age >= 18 years")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CriterionReference {
    pub id: String,
    pub text: String,
}

impl CriterionReference {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// One criterion: the function to evaluate plus the protocol references it implements
///
/// References are used only for reporting, never for evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Eligibility {
    #[serde(default)]
    pub references: BTreeSet<CriterionReference>,
    pub function: EligibilityFunction,
}

impl Eligibility {
    /// Criterion without references
    pub fn new(function: EligibilityFunction) -> Self {
        Self {
            references: BTreeSet::new(),
            function,
        }
    }

    /// Add a protocol reference
    pub fn with_reference(mut self, reference: CriterionReference) -> Self {
        self.references.insert(reference);
        self
    }
}
