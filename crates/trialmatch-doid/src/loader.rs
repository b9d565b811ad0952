//! Loader for the obo-graph JSON dump of the Disease Ontology
//!
//! The dump has the shape:
//!
//! ```json
//! {"graphs": [{
//!     "nodes": [{"id": "http://purl.obolibrary.org/obo/DOID_162", "lbl": "cancer"}],
//!     "edges": [{"sub": "http://purl.obolibrary.org/obo/DOID_1324", "pred": "is_a",
//!                "obj": "http://purl.obolibrary.org/obo/DOID_162"}]
//! }]}
//! ```

use crate::config::DoidManualConfig;
use crate::error::{DoidError, DoidResult};
use crate::model::{DoidModel, DoidModelBuilder};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

/// Namespace of DOID node identifiers
pub const DOID_PURL_PREFIX: &str = "http://purl.obolibrary.org/obo/DOID_";

static DOID_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^http://purl\.obolibrary\.org/obo/DOID_(\d+)$")
        .expect("static DOID pattern is valid")
});

const IS_A: &str = "is_a";

#[derive(Debug, Deserialize)]
struct DoidDump {
    #[serde(default)]
    graphs: Vec<DoidGraph>,
}

#[derive(Debug, Deserialize)]
struct DoidGraph {
    #[serde(default)]
    nodes: Vec<DoidNode>,
    #[serde(default)]
    edges: Vec<DoidEdge>,
}

#[derive(Debug, Deserialize)]
struct DoidNode {
    id: String,
    lbl: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DoidEdge {
    sub: String,
    pred: String,
    obj: String,
}

/// Extract the numeric DOID from a purl, e.g. `.../DOID_162` -> `162`
pub fn parse_doid_url(url: &str) -> Option<&str> {
    DOID_URL
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

impl DoidModel {
    /// Build a model from the JSON text of an obo-graph dump
    pub fn from_json(json: &str, manual_config: DoidManualConfig) -> DoidResult<Self> {
        let dump: DoidDump = serde_json::from_str(json)?;
        if dump.graphs.is_empty() {
            return Err(DoidError::EmptyDump);
        }

        let mut builder = DoidModelBuilder::default().manual_config(manual_config);
        for graph in dump.graphs {
            for node in graph.nodes {
                match (parse_doid_url(&node.id), node.lbl) {
                    (Some(doid), Some(label)) => builder.insert_term(doid.to_string(), label),
                    (Some(_), None) => {}
                    (None, _) => log::debug!("Skipping non-DOID node {}", node.id),
                }
            }

            for edge in graph.edges.into_iter().filter(|e| e.pred == IS_A) {
                let child = parse_doid_url(&edge.sub)
                    .ok_or_else(|| DoidError::UnresolvableDoid(edge.sub.clone()))?;
                let parent = parse_doid_url(&edge.obj)
                    .ok_or_else(|| DoidError::UnresolvableDoid(edge.obj.clone()))?;
                builder.insert_is_a(child.to_string(), parent.to_string());
            }
        }

        let model = builder.build();
        log::info!(
            "Loaded DOID model with {} terms and {} child relations",
            model.term_count(),
            model.relation_count()
        );
        Ok(model)
    }

    /// Load a model from an obo-graph JSON file
    pub fn from_file(path: impl AsRef<Path>, manual_config: DoidManualConfig) -> DoidResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| DoidError::io(path.display().to_string(), e.to_string()))?;
        Self::from_json(&json, manual_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://purl.obolibrary.org/obo/DOID_162", Some("162"))]
    #[case("http://purl.obolibrary.org/obo/DOID_0050686", Some("0050686"))]
    #[case("http://purl.obolibrary.org/obo/UBERON_0002048", None)]
    #[case("DOID:162", None)]
    #[case("http://purl.obolibrary.org/obo/DOID_", None)]
    fn test_parse_doid_url(#[case] url: &str, #[case] expected: Option<&str>) {
        assert_eq!(parse_doid_url(url), expected);
    }

    #[test]
    fn test_empty_dump_is_rejected() {
        let result = DoidModel::from_json(r#"{"graphs": []}"#, DoidManualConfig::default());
        assert!(matches!(result, Err(DoidError::EmptyDump)));
    }

    #[test]
    fn test_non_is_a_edges_are_ignored() {
        let json = r#"{"graphs": [{"edges": [
            {"sub": "http://purl.obolibrary.org/obo/DOID_1", "pred": "has_part",
             "obj": "http://example.org/anything"}
        ]}]}"#;
        let model = DoidModel::from_json(json, DoidManualConfig::default()).unwrap();
        assert_eq!(model.relation_count(), 0);
    }
}
