//! The frozen DOID model and its builder

use crate::config::DoidManualConfig;
use std::collections::{BTreeSet, HashMap};

/// Read-only view of the Disease Ontology
///
/// Holds the `child -> {direct parents}` relation and both term lookup tables.
/// All queries are pure functions over this state, so a single instance can be
/// shared between threads without synchronization.
#[derive(Debug, Clone, Default)]
pub struct DoidModel {
    /// Direct `is_a` parents per child
    parents: HashMap<String, BTreeSet<String>>,
    /// Term per DOID
    terms: HashMap<String, String>,
    /// DOID per lowercased term
    doids_by_term: HashMap<String, String>,
    /// Curated additions
    manual_config: DoidManualConfig,
}

impl DoidModel {
    /// Start building a model
    pub fn builder() -> DoidModelBuilder {
        DoidModelBuilder::default()
    }

    /// The DOID itself plus its full transitive `is_a` closure
    ///
    /// Depth-first over the parent relation. Nodes already in the result are
    /// not descended into again, which bounds the walk on cyclic input.
    pub fn doid_with_parents(&self, doid: &str) -> BTreeSet<String> {
        let mut result = BTreeSet::new();
        let mut stack = vec![doid.to_string()];

        while let Some(current) = stack.pop() {
            if !result.insert(current.clone()) {
                continue;
            }

            if let Some(parents) = self.parents.get(&current) {
                stack.extend(parents.iter().filter(|p| !result.contains(*p)).cloned());
            }
            if let Some(extra) = self.manual_config.additional_doids.get(&current) {
                if !result.contains(extra) {
                    stack.push(extra.clone());
                }
            }
        }

        result
    }

    /// Main cancer types the DOID belongs to
    pub fn main_cancer_doids(&self, doid: &str) -> BTreeSet<String> {
        self.doid_with_parents(doid)
            .into_iter()
            .filter(|d| self.manual_config.main_cancer_doids.contains(d))
            .collect()
    }

    /// Term for a DOID
    pub fn resolve_term_for_doid(&self, doid: &str) -> Option<&str> {
        self.terms.get(doid).map(String::as_str)
    }

    /// DOID for a term, ignoring case
    pub fn resolve_doid_for_term(&self, term: &str) -> Option<&str> {
        self.doids_by_term
            .get(&term.to_lowercase())
            .map(String::as_str)
    }

    /// Direct parents of a DOID
    pub fn direct_parents(&self, doid: &str) -> impl Iterator<Item = &str> {
        self.parents
            .get(doid)
            .into_iter()
            .flat_map(|parents| parents.iter().map(String::as_str))
    }

    /// Whether the DOID is known, either as a term or in the relation
    pub fn contains(&self, doid: &str) -> bool {
        self.terms.contains_key(doid) || self.parents.contains_key(doid)
    }

    /// Number of named DOIDs
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Number of children with at least one parent
    pub fn relation_count(&self) -> usize {
        self.parents.len()
    }

    /// The curated configuration this model was built with
    pub fn manual_config(&self) -> &DoidManualConfig {
        &self.manual_config
    }
}

/// Collects edges and terms, then freezes them into a [`DoidModel`]
#[derive(Debug, Default)]
pub struct DoidModelBuilder {
    parents: HashMap<String, BTreeSet<String>>,
    terms: HashMap<String, String>,
    doids_by_term: HashMap<String, String>,
    manual_config: DoidManualConfig,
}

impl DoidModelBuilder {
    /// Add an `is_a` edge from child to parent (deduplicated)
    pub fn add_is_a(mut self, child: impl Into<String>, parent: impl Into<String>) -> Self {
        self.insert_is_a(child.into(), parent.into());
        self
    }

    /// Add a term for a DOID
    pub fn add_term(mut self, doid: impl Into<String>, term: impl Into<String>) -> Self {
        self.insert_term(doid.into(), term.into());
        self
    }

    /// Set the curated configuration
    pub fn manual_config(mut self, config: DoidManualConfig) -> Self {
        self.manual_config = config;
        self
    }

    /// Freeze the collected state
    pub fn build(self) -> DoidModel {
        log::debug!(
            "Built DOID model with {} terms and {} child relations",
            self.terms.len(),
            self.parents.len()
        );
        DoidModel {
            parents: self.parents,
            terms: self.terms,
            doids_by_term: self.doids_by_term,
            manual_config: self.manual_config,
        }
    }

    pub(crate) fn insert_is_a(&mut self, child: String, parent: String) {
        self.parents.entry(child).or_default().insert(parent);
    }

    pub(crate) fn insert_term(&mut self, doid: String, term: String) {
        let key = term.to_lowercase();
        match self.doids_by_term.get(&key) {
            Some(existing) if existing != &doid => {
                log::warn!(
                    "Term '{}' maps to DOID {} and {}, keeping {}",
                    term,
                    existing,
                    doid,
                    existing
                );
            }
            _ => {
                self.doids_by_term.insert(key, doid.clone());
            }
        }
        self.terms.insert(doid, term);
    }
}
