//! CLI functionality for the trialmatch tool
//!
//! This module contains all CLI-related functionality including:
//! - Matching a patient against trials
//! - Validating trial configurations
//! - DOID lookups
//! - Output formatting

pub mod doid;
pub mod match_cmd;
pub mod output;
pub mod validate;
