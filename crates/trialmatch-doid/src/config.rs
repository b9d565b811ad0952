//! Manually curated additions to the ontology

use crate::error::{DoidError, DoidResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Configuration that is not part of the ontology dump itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoidManualConfig {
    /// DOIDs that count as a "main cancer type"
    #[serde(default)]
    pub main_cancer_doids: BTreeSet<String>,
    /// Extra ancestors: whenever the key is in a closure, the value is too
    #[serde(default)]
    pub additional_doids: BTreeMap<String, String>,
}

impl DoidManualConfig {
    /// Create a config with the given main cancer DOIDs and no additional mappings
    pub fn with_main_cancer_doids<I, S>(doids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            main_cancer_doids: doids.into_iter().map(Into::into).collect(),
            additional_doids: BTreeMap::new(),
        }
    }

    /// Add an extra ancestor mapping
    pub fn with_additional_doid(
        mut self,
        doid: impl Into<String>,
        extra: impl Into<String>,
    ) -> Self {
        self.additional_doids.insert(doid.into(), extra.into());
        self
    }

    /// Parse from a JSON string
    pub fn from_json(json: &str) -> DoidResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> DoidResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| DoidError::io(path.display().to_string(), e.to_string()))?;
        Self::from_json(&json)
    }
}
