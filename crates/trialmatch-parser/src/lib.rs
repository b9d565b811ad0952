//! Parser for the compact eligibility rule syntax
//!
//! ```text
//! AND(IS_AT_LEAST_X_YEARS_OLD[18], NOT(HAS_KNOWN_ACTIVE_CNS_METASTASES))
//! ```
//!
//! - `RULE` for rules without inputs
//! - `RULE[p1, p2]` for rules with primitive parameters
//! - `RULE(f1, f2)` for composite rules
//!
//! This is the same syntax `EligibilityFunction` renders through `Display`.
//! The parser checks structure and rule names only; whether the parameters
//! fit the rule is decided by the input resolver of the evaluation engine.

mod error;
mod grammar;

pub use error::ParseError;

use grammar::{RawFunction, RawParameter};
use trialmatch_types::{EligibilityFunction, EligibilityRule, FunctionParameter};
use winnow::error::StrContext;
use winnow::prelude::*;

/// Parse one eligibility function
pub fn parse_function(source: &str) -> Result<EligibilityFunction, ParseError> {
    if source.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let raw = grammar::expression.parse(source).map_err(|e| {
        let too_deep = e.inner().context().any(|context| {
            matches!(context, StrContext::Label(label) if *label == grammar::NESTING_LABEL)
        });
        if too_deep {
            ParseError::too_deep(e.offset())
        } else {
            ParseError::syntax(e.offset(), e.inner().to_string())
        }
    })?;

    resolve(source, raw)
}

/// Parse several functions, reporting the first error with its index
pub fn parse_functions<'a, I>(sources: I) -> Result<Vec<EligibilityFunction>, (usize, ParseError)>
where
    I: IntoIterator<Item = &'a str>,
{
    sources
        .into_iter()
        .enumerate()
        .map(|(i, source)| parse_function(source).map_err(|e| (i, e)))
        .collect()
}

fn resolve(source: &str, raw: RawFunction<'_>) -> Result<EligibilityFunction, ParseError> {
    let rule: EligibilityRule = raw
        .name
        .parse()
        .map_err(|_| ParseError::unknown_rule(raw.name, source.len() - raw.remaining))?;

    let parameters = raw
        .parameters
        .into_iter()
        .map(|parameter| match parameter {
            RawParameter::Function(inner) => {
                resolve(source, inner).map(FunctionParameter::Function)
            }
            RawParameter::Value(value) => Ok(FunctionParameter::Value(value.to_string())),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EligibilityFunction { rule, parameters })
}
