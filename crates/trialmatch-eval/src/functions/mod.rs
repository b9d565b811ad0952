//! Built-in leaf predicates
//!
//! Each submodule registers the rules of one clinical area. Predicates only
//! decide; messages come from the templates registered alongside them.

mod clinical;
mod general;
mod molecular;
mod treatment;
mod tumor;

use crate::registry::FunctionRegistryBuilder;

/// DOID of "cancer", too generic to classify a tumor
pub const CANCER_DOID: &str = "162";

/// DOID of "hematologic cancer"
pub const HEMATOLOGIC_CANCER_DOID: &str = "2531";

/// Register every built-in leaf predicate
pub fn register_all(builder: &mut FunctionRegistryBuilder) {
    general::register(builder);
    tumor::register(builder);
    treatment::register(builder);
    clinical::register(builder);
    molecular::register(builder);
}
