//! Disease Ontology (DOID) model
//!
//! This crate provides the frozen, read-only view of the Disease Ontology that
//! eligibility predicates query:
//!
//! - **Ancestor closure**: `doid_with_parents` walks the `is_a` relation with a
//!   visited set, so cyclic or repeated edges terminate
//! - **Term lookups**: DOID to term, and case-insensitive term to DOID
//! - **Main cancer types**: the closure intersected with a configured set
//!
//! # Example
//!
//! ```ignore
//! use trialmatch_doid::{DoidManualConfig, DoidModel};
//!
//! let model = DoidModel::from_file("doid.json", DoidManualConfig::default())?;
//! let ancestors = model.doid_with_parents("3908");
//! ```
//!
//! The model is built once and shared by reference across threads; no method
//! takes `&mut self`.

mod config;
mod error;
mod loader;
mod model;

pub use config::DoidManualConfig;
pub use error::{DoidError, DoidResult};
pub use loader::{DOID_PURL_PREFIX, parse_doid_url};
pub use model::{DoidModel, DoidModelBuilder};
