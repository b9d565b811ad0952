//! Validation and typed access to function parameters
//!
//! Every rule declares a [`FunctionInput`]. The resolver checks a function
//! tree against those declarations and turns leaf parameters into typed
//! values, so predicates never see raw text.

use crate::composite::CompositeRules;
use crate::error::{EvalError, EvalResult};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use trialmatch_doid::DoidModel;
use trialmatch_types::{EligibilityFunction, FunctionInput, FunctionParameter, MAX_FUNCTION_DEPTH};

/// HGNC-style gene symbol: `BRAF`, `ERBB2`, `NKX2-1`, `C11orf95`
static GENE_SYMBOL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z0-9][A-Za-z0-9]*(-[A-Za-z0-9]+)*$").expect("static gene pattern is valid")
});

/// A leaf parameter after validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionValue {
    None,
    Integer(i64),
    Decimal(Decimal),
    /// Free text (strings and treatment names)
    Text(String),
    Gene(String),
    /// A DOID known to the ontology (also for term inputs)
    Doid(String),
}

/// Checks function trees against the declared rule inputs
#[derive(Debug, Clone)]
pub struct FunctionInputResolver {
    doid_model: Arc<DoidModel>,
}

impl FunctionInputResolver {
    pub fn new(doid_model: Arc<DoidModel>) -> Self {
        Self { doid_model }
    }

    /// First problem in the tree, if any
    pub fn validate(&self, function: &EligibilityFunction) -> EvalResult<()> {
        match self.problems(function).into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(()),
        }
    }

    /// Every problem in the tree, depth first
    ///
    /// A tree nested too deeply is reported as a single problem without
    /// looking further into it.
    pub fn problems(&self, function: &EligibilityFunction) -> Vec<EvalError> {
        let depth = function.depth();
        if depth > MAX_FUNCTION_DEPTH {
            return vec![EvalError::too_deep(function.rule, depth)];
        }

        let mut problems = Vec::new();
        self.collect_problems(function, &mut problems);
        problems
    }

    fn collect_problems(&self, function: &EligibilityFunction, problems: &mut Vec<EvalError>) {
        if CompositeRules::is_composite(function.rule) {
            match self.composite_inputs(function) {
                Ok(children) => children
                    .into_iter()
                    .for_each(|child| self.collect_problems(child, problems)),
                Err(e) => problems.push(e),
            }
        } else if let Err(e) = self.resolve(function) {
            problems.push(e);
        }
    }

    /// Sub-functions of a composite, checked against its declared shape
    pub fn composite_inputs<'f>(
        &self,
        function: &'f EligibilityFunction,
    ) -> EvalResult<Vec<&'f EligibilityFunction>> {
        let shape = CompositeRules::shape(function.rule).ok_or_else(|| {
            EvalError::arity_mismatch(function.rule, "a composite use of a leaf rule")
        })?;

        if function.values().next().is_some() {
            return Err(EvalError::arity_mismatch(function.rule, "primitive values"));
        }

        let children: Vec<&EligibilityFunction> = function.sub_functions().collect();
        if !shape.accepts(children.len()) {
            return Err(EvalError::arity_mismatch(
                function.rule,
                format!("{} functions", children.len()),
            ));
        }
        Ok(children)
    }

    /// Typed value of a leaf function's parameters
    pub fn resolve(&self, function: &EligibilityFunction) -> EvalResult<FunctionValue> {
        match function.rule.input() {
            FunctionInput::None => {
                if function.parameters.is_empty() {
                    Ok(FunctionValue::None)
                } else {
                    Err(EvalError::arity_mismatch(
                        function.rule,
                        format!("{} parameters", function.parameters.len()),
                    ))
                }
            }
            FunctionInput::OneInteger => self.one_integer(function).map(FunctionValue::Integer),
            FunctionInput::OneDecimal => self.one_decimal(function).map(FunctionValue::Decimal),
            FunctionInput::OneString => self.one_string(function).map(FunctionValue::Text),
            FunctionInput::OneTreatmentName => {
                self.one_treatment_name(function).map(FunctionValue::Text)
            }
            FunctionInput::OneGene => self.one_gene(function).map(FunctionValue::Gene),
            FunctionInput::OneDoid => self.one_doid(function).map(FunctionValue::Doid),
            FunctionInput::OneDoidTerm => self.one_doid_term(function).map(FunctionValue::Doid),
            FunctionInput::OneCompositeInput | FunctionInput::AtLeastTwoCompositeInputs => Err(
                EvalError::arity_mismatch(function.rule, "a leaf use of a composite rule"),
            ),
        }
    }

    pub fn one_integer(&self, function: &EligibilityFunction) -> EvalResult<i64> {
        let value = single_value(function)?;
        value.parse().map_err(|_| {
            EvalError::invalid_input(function.rule, format!("'{value}' is not an integer"))
        })
    }

    pub fn one_decimal(&self, function: &EligibilityFunction) -> EvalResult<Decimal> {
        let value = single_value(function)?;
        Decimal::from_str(value).map_err(|_| {
            EvalError::invalid_input(function.rule, format!("'{value}' is not a decimal"))
        })
    }

    pub fn one_string(&self, function: &EligibilityFunction) -> EvalResult<String> {
        single_value(function).map(str::to_string)
    }

    pub fn one_treatment_name(&self, function: &EligibilityFunction) -> EvalResult<String> {
        single_value(function).map(str::to_string)
    }

    pub fn one_gene(&self, function: &EligibilityFunction) -> EvalResult<String> {
        let value = single_value(function)?;
        if GENE_SYMBOL.is_match(value) {
            Ok(value.to_string())
        } else {
            Err(EvalError::invalid_input(
                function.rule,
                format!("'{value}' is not a valid gene symbol"),
            ))
        }
    }

    pub fn one_doid(&self, function: &EligibilityFunction) -> EvalResult<String> {
        let value = single_value(function)?;
        if self.doid_model.contains(value) {
            Ok(value.to_string())
        } else {
            Err(EvalError::invalid_input(
                function.rule,
                format!("unknown DOID '{value}'"),
            ))
        }
    }

    /// The DOID a term input refers to
    pub fn one_doid_term(&self, function: &EligibilityFunction) -> EvalResult<String> {
        let value = single_value(function)?;
        self.doid_model
            .resolve_doid_for_term(value)
            .map(str::to_string)
            .ok_or_else(|| {
                EvalError::invalid_input(function.rule, format!("unknown DOID term '{value}'"))
            })
    }
}

fn single_value(function: &EligibilityFunction) -> EvalResult<&str> {
    match function.parameters.as_slice() {
        [FunctionParameter::Value(value)] => Ok(value),
        [FunctionParameter::Function(_)] => Err(EvalError::arity_mismatch(
            function.rule,
            "a nested function",
        )),
        other => Err(EvalError::arity_mismatch(
            function.rule,
            format!("{} parameters", other.len()),
        )),
    }
}
