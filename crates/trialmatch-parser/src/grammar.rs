//! Recursive descent grammar for eligibility functions
//!
//! ```text
//! function   := RULE_NAME ( values | functions )?
//! values     := '[' ( value ( ',' value )* )? ']'
//! functions  := '(' function ( ',' function )* ')'
//! RULE_NAME  := [A-Z0-9_]+
//! value      := any text up to ',' or ']', trimmed
//! ```
//!
//! The grammar only checks structure. Rule names are resolved against
//! the closed rule set afterwards so that unknown names get their own error.
//! Nesting is bounded by [`MAX_FUNCTION_DEPTH`]; deeper input fails with a
//! cut error labelled [`NESTING_LABEL`].

use trialmatch_types::MAX_FUNCTION_DEPTH;
use winnow::ascii::multispace0;
use winnow::combinator::{alt, cut_err, delimited, fail, opt, separated};
use winnow::error::{StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

pub(crate) type Input<'a> = &'a str;

/// Context label of the error raised for too deeply nested input
pub(crate) const NESTING_LABEL: &str = "nesting depth";

/// Function node with its rule name still unresolved
#[derive(Debug)]
pub(crate) struct RawFunction<'a> {
    pub name: &'a str,
    /// Length of the input left when the name started, to recover its offset
    pub remaining: usize,
    pub parameters: Vec<RawParameter<'a>>,
}

#[derive(Debug)]
pub(crate) enum RawParameter<'a> {
    Function(RawFunction<'a>),
    Value(&'a str),
}

/// Whitespace
fn ws(input: &mut Input<'_>) -> ModalResult<()> {
    multispace0.void().parse_next(input)
}

fn rule_name<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    take_while(1.., |c: char| {
        c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'
    })
    .context(StrContext::Label("rule name"))
    .parse_next(input)
}

fn value<'a>(input: &mut Input<'a>) -> ModalResult<&'a str> {
    take_till(1.., [',', ']'])
        .map(str::trim)
        .verify(|v: &str| !v.is_empty())
        .context(StrContext::Label("parameter value"))
        .parse_next(input)
}

/// `[v1, v2]`
fn values<'a>(input: &mut Input<'a>) -> ModalResult<Vec<RawParameter<'a>>> {
    delimited(
        ('[', ws),
        separated(0.., value, ','),
        cut_err(']').context(StrContext::Expected(StrContextValue::CharLiteral(']'))),
    )
    .map(|values: Vec<&'a str>| values.into_iter().map(RawParameter::Value).collect())
    .parse_next(input)
}

/// `(f1, f2)` nested one level below `depth`
fn functions<'a>(input: &mut Input<'a>, depth: usize) -> ModalResult<Vec<RawParameter<'a>>> {
    let nested = |input: &mut Input<'a>| function(input, depth + 1);

    delimited(
        '(',
        cut_err(separated(1.., delimited(ws, nested, ws), ',')),
        cut_err(')').context(StrContext::Expected(StrContextValue::CharLiteral(')'))),
    )
    .map(|functions: Vec<RawFunction<'a>>| {
        functions.into_iter().map(RawParameter::Function).collect()
    })
    .parse_next(input)
}

/// A function at nesting level `depth` (the outermost function is level 1)
pub(crate) fn function<'a>(input: &mut Input<'a>, depth: usize) -> ModalResult<RawFunction<'a>> {
    if depth > MAX_FUNCTION_DEPTH {
        return cut_err(fail.context(StrContext::Label(NESTING_LABEL))).parse_next(input);
    }

    let remaining = input.len();
    let name = rule_name(input)?;
    ws(input)?;
    let nested = |input: &mut Input<'a>| functions(input, depth);
    let parameters = opt(alt((values, nested))).parse_next(input)?;

    Ok(RawFunction {
        name,
        remaining,
        parameters: parameters.unwrap_or_default(),
    })
}

/// A whole expression, surrounding whitespace allowed
pub(crate) fn expression<'a>(input: &mut Input<'a>) -> ModalResult<RawFunction<'a>> {
    delimited(ws, |input: &mut Input<'a>| function(input, 1), ws).parse_next(input)
}
