//! Function registry and dispatcher
//!
//! The registry maps every [`EligibilityRule`] to exactly one definition:
//!
//! - **Leaf** rules wrap a predicate plus the message templates used to
//!   describe its outcome. The predicate only decides; a single adapter
//!   turns its [`PredicateOutcome`] into an [`Evaluation`], so all leaf
//!   messages look alike.
//! - **Composite** rules declare their shape and a fold over the evaluations
//!   of their sub-functions.
//!
//! [`FunctionRegistry::create`] validates a function tree against the rule
//! inputs and returns an [`Evaluator`] that can be applied to any number of
//! patient records. The registry is immutable once built and can be shared
//! between threads.

use crate::composite::{self, CompositeRules, CompositeShape};
use crate::date::ReferenceDateProvider;
use crate::error::{EvalError, EvalResult};
use crate::functions;
use crate::resolver::{FunctionInputResolver, FunctionValue};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use trialmatch_doid::DoidModel;
use trialmatch_types::{
    EligibilityFunction, EligibilityRule, Evaluation, EvaluationResult, MAX_FUNCTION_DEPTH,
    PatientRecord,
};

/// Type alias for leaf predicate implementations
pub type PredicateFn = Arc<
    dyn Fn(&PredicateContext<'_>, &PatientRecord) -> EvalResult<PredicateOutcome> + Send + Sync,
>;

/// Type alias for composite fold implementations
pub type FoldFn = Arc<dyn Fn(&[Evaluation]) -> EvalResult<Evaluation> + Send + Sync>;

// ============================================================================
// Leaf predicates
// ============================================================================

/// What a leaf predicate decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateOutcome {
    Pass,
    /// Pass supported by molecular events
    PassWithEvents(BTreeSet<String>),
    Fail,
    Warn { specific: String, general: String },
    Undetermined { specific: String, general: String },
    /// The criterion is assumed to hold
    NotEvaluated,
    NotImplemented,
}

impl PredicateOutcome {
    pub fn from_bool(passed: bool) -> Self {
        if passed { Self::Pass } else { Self::Fail }
    }

    pub fn warn(specific: impl Into<String>, general: impl Into<String>) -> Self {
        Self::Warn {
            specific: specific.into(),
            general: general.into(),
        }
    }

    pub fn undetermined(specific: impl Into<String>, general: impl Into<String>) -> Self {
        Self::Undetermined {
            specific: specific.into(),
            general: general.into(),
        }
    }
}

/// Specific and general message text, `{0}`, `{1}`... replaced by the function's values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageTemplate {
    pub specific: String,
    pub general: String,
}

impl MessageTemplate {
    pub fn new(specific: impl Into<String>, general: impl Into<String>) -> Self {
        Self {
            specific: specific.into(),
            general: general.into(),
        }
    }

    /// Rendered `(specific, general)` pair
    pub fn render(&self, values: &[&str]) -> (String, String) {
        (fill(&self.specific, values), fill(&self.general, values))
    }
}

fn fill(template: &str, values: &[&str]) -> String {
    values
        .iter()
        .enumerate()
        .fold(template.to_string(), |text, (i, value)| {
            text.replace(&format!("{{{i}}}"), value)
        })
}

/// Registration of a leaf rule
#[derive(Clone)]
pub struct LeafDefinition {
    predicate: PredicateFn,
    pass: MessageTemplate,
    fail: MessageTemplate,
    recoverable_fail: bool,
}

impl LeafDefinition {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&PredicateContext<'_>, &PatientRecord) -> EvalResult<PredicateOutcome>
            + Send
            + Sync
            + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            pass: MessageTemplate::default(),
            fail: MessageTemplate::default(),
            recoverable_fail: false,
        }
    }

    /// Messages attached on pass (and on NOT_EVALUATED)
    pub fn pass_message(mut self, specific: impl Into<String>, general: impl Into<String>) -> Self {
        self.pass = MessageTemplate::new(specific, general);
        self
    }

    pub fn fail_message(mut self, specific: impl Into<String>, general: impl Into<String>) -> Self {
        self.fail = MessageTemplate::new(specific, general);
        self
    }

    /// Failures of this rule may resolve later (e.g. a lab value can be re-measured)
    pub fn recoverable(mut self) -> Self {
        self.recoverable_fail = true;
        self
    }

    /// Convert a predicate outcome into an evaluation
    fn to_evaluation(&self, outcome: PredicateOutcome, values: &[&str]) -> Evaluation {
        match outcome {
            PredicateOutcome::Pass => self.passed(EvaluationResult::Pass, values),
            PredicateOutcome::PassWithEvents(events) => {
                let mut evaluation = self.passed(EvaluationResult::Pass, values);
                evaluation.inclusion_molecular_events = events;
                evaluation
            }
            PredicateOutcome::Fail => {
                let (specific, general) = self.fail.render(values);
                let mut evaluation = Evaluation::new(EvaluationResult::Fail, self.recoverable_fail);
                if !specific.is_empty() {
                    evaluation = evaluation.with_fail_specific(specific);
                }
                if !general.is_empty() {
                    evaluation = evaluation.with_fail_general(general);
                }
                evaluation
            }
            PredicateOutcome::Warn { specific, general } => Evaluation::warn(specific, general),
            PredicateOutcome::Undetermined { specific, general } => {
                Evaluation::undetermined(specific, general)
            }
            PredicateOutcome::NotEvaluated => self.passed(EvaluationResult::NotEvaluated, values),
            PredicateOutcome::NotImplemented => {
                Evaluation::new(EvaluationResult::NotImplemented, false)
            }
        }
    }

    /// Unrecoverable evaluation carrying the rendered pass messages
    fn passed(&self, result: EvaluationResult, values: &[&str]) -> Evaluation {
        let (specific, general) = self.pass.render(values);
        let mut evaluation = Evaluation::new(result, false);
        if !specific.is_empty() {
            evaluation = evaluation.with_pass_specific(specific);
        }
        if !general.is_empty() {
            evaluation = evaluation.with_pass_general(general);
        }
        evaluation
    }
}

/// What a predicate can see besides the patient record
pub struct PredicateContext<'a> {
    rule: EligibilityRule,
    input: &'a FunctionValue,
    reference_date: NaiveDate,
    doid_model: &'a DoidModel,
}

impl<'a> PredicateContext<'a> {
    pub fn rule(&self) -> EligibilityRule {
        self.rule
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn doid_model(&self) -> &'a DoidModel {
        self.doid_model
    }

    pub fn integer(&self) -> EvalResult<i64> {
        match self.input {
            FunctionValue::Integer(value) => Ok(*value),
            other => Err(self.unexpected("an integer", other)),
        }
    }

    pub fn decimal(&self) -> EvalResult<Decimal> {
        match self.input {
            FunctionValue::Decimal(value) => Ok(*value),
            other => Err(self.unexpected("a decimal", other)),
        }
    }

    pub fn text(&self) -> EvalResult<&'a str> {
        match self.input {
            FunctionValue::Text(value) => Ok(value),
            other => Err(self.unexpected("text", other)),
        }
    }

    pub fn gene(&self) -> EvalResult<&'a str> {
        match self.input {
            FunctionValue::Gene(value) => Ok(value),
            other => Err(self.unexpected("a gene", other)),
        }
    }

    pub fn doid(&self) -> EvalResult<&'a str> {
        match self.input {
            FunctionValue::Doid(value) => Ok(value),
            other => Err(self.unexpected("a DOID", other)),
        }
    }

    fn unexpected(&self, expected: &str, found: &FunctionValue) -> EvalError {
        EvalError::predicate(
            self.rule,
            format!("expected {expected} input, got {found:?}"),
        )
    }
}

// ============================================================================
// Composite combinators
// ============================================================================

/// Registration of a composite rule
#[derive(Clone)]
pub struct CompositeDefinition {
    shape: CompositeShape,
    fold: FoldFn,
}

impl CompositeDefinition {
    pub fn new<F>(shape: CompositeShape, fold: F) -> Self
    where
        F: Fn(&[Evaluation]) -> EvalResult<Evaluation> + Send + Sync + 'static,
    {
        Self {
            shape,
            fold: Arc::new(fold),
        }
    }

    pub fn shape(&self) -> CompositeShape {
        self.shape
    }
}

#[derive(Clone)]
enum RuleDefinition {
    Leaf(LeafDefinition),
    Composite(CompositeDefinition),
}

// ============================================================================
// Registry
// ============================================================================

/// Immutable rule → evaluator table plus the collaborators predicates use
pub struct FunctionRegistry {
    definitions: HashMap<EligibilityRule, RuleDefinition>,
    resolver: FunctionInputResolver,
    doid_model: Arc<DoidModel>,
    reference_date: Arc<dyn ReferenceDateProvider>,
}

impl FunctionRegistry {
    /// Start an empty registry
    pub fn builder(
        doid_model: Arc<DoidModel>,
        reference_date: Arc<dyn ReferenceDateProvider>,
    ) -> FunctionRegistryBuilder {
        FunctionRegistryBuilder {
            definitions: HashMap::new(),
            duplicates: Vec::new(),
            doid_model,
            reference_date,
        }
    }

    /// Registry with the four combinators and the built-in predicate library
    pub fn standard(
        doid_model: Arc<DoidModel>,
        reference_date: Arc<dyn ReferenceDateProvider>,
    ) -> EvalResult<Self> {
        let mut builder = Self::builder(doid_model, reference_date);
        builder.register_standard_composites();
        functions::register_all(&mut builder);
        builder.build()
    }

    /// Build an evaluator for a function tree
    ///
    /// Fails when the tree nests deeper than [`MAX_FUNCTION_DEPTH`], when a
    /// composite does not match its shape or when a leaf parameter does not
    /// match its declared input.
    pub fn create<'r>(&'r self, function: &'r EligibilityFunction) -> EvalResult<Evaluator<'r>> {
        let depth = function.depth();
        if depth > MAX_FUNCTION_DEPTH {
            return Err(EvalError::too_deep(function.rule, depth));
        }
        self.create_node(function)
    }

    fn create_node<'r>(&'r self, function: &'r EligibilityFunction) -> EvalResult<Evaluator<'r>> {
        let definition = self
            .definitions
            .get(&function.rule)
            .ok_or_else(|| EvalError::missing_evaluator(function.rule))?;

        let kind = match definition {
            RuleDefinition::Composite(composite) => {
                let children = self
                    .resolver
                    .composite_inputs(function)?
                    .into_iter()
                    .map(|child| self.create_node(child))
                    .collect::<EvalResult<Vec<_>>>()?;
                EvaluatorKind::Composite {
                    composite,
                    children,
                }
            }
            RuleDefinition::Leaf(leaf) => EvaluatorKind::Leaf {
                leaf,
                input: self.resolver.resolve(function)?,
                values: function.values().collect(),
            },
        };

        Ok(Evaluator {
            registry: self,
            function,
            kind,
        })
    }

    /// Create and apply an evaluator in one step
    pub fn evaluate(
        &self,
        function: &EligibilityFunction,
        record: &PatientRecord,
    ) -> EvalResult<Evaluation> {
        self.evaluate_at(function, record, self.reference_date(record))
    }

    /// Like [`evaluate`](Self::evaluate) with an already resolved reference date
    pub fn evaluate_at(
        &self,
        function: &EligibilityFunction,
        record: &PatientRecord,
        reference_date: NaiveDate,
    ) -> EvalResult<Evaluation> {
        self.create(function)?.evaluate_at(record, reference_date)
    }

    pub fn resolver(&self) -> &FunctionInputResolver {
        &self.resolver
    }

    pub fn doid_model(&self) -> &DoidModel {
        &self.doid_model
    }

    /// The date time-dependent predicates compare the record with
    pub fn reference_date(&self, record: &PatientRecord) -> NaiveDate {
        self.reference_date.date(record)
    }

    /// Whether the rule has a registered definition
    pub fn contains(&self, rule: EligibilityRule) -> bool {
        self.definitions.contains_key(&rule)
    }
}

/// Collects rule definitions and checks them against the closed rule set
pub struct FunctionRegistryBuilder {
    definitions: HashMap<EligibilityRule, RuleDefinition>,
    duplicates: Vec<EligibilityRule>,
    doid_model: Arc<DoidModel>,
    reference_date: Arc<dyn ReferenceDateProvider>,
}

impl FunctionRegistryBuilder {
    /// Register a leaf predicate
    pub fn register_leaf(
        &mut self,
        rule: EligibilityRule,
        definition: LeafDefinition,
    ) -> &mut Self {
        self.insert(rule, RuleDefinition::Leaf(definition))
    }

    /// Register a composite combinator
    pub fn register_composite(
        &mut self,
        rule: EligibilityRule,
        definition: CompositeDefinition,
    ) -> &mut Self {
        self.insert(rule, RuleDefinition::Composite(definition))
    }

    /// Register `AND`, `OR`, `NOT` and `WARN_IF`
    pub fn register_standard_composites(&mut self) -> &mut Self {
        self.register_composite(
            EligibilityRule::And,
            CompositeDefinition::new(CompositeShape::AtLeastTwo, |evaluations| {
                Ok(composite::and(evaluations))
            }),
        );
        self.register_composite(
            EligibilityRule::Or,
            CompositeDefinition::new(CompositeShape::AtLeastTwo, |evaluations| {
                Ok(composite::or(evaluations))
            }),
        );
        self.register_composite(
            EligibilityRule::Not,
            CompositeDefinition::new(CompositeShape::ExactlyOne, |evaluations| {
                composite::single(EligibilityRule::Not, evaluations).map(composite::not)
            }),
        );
        self.register_composite(
            EligibilityRule::WarnIf,
            CompositeDefinition::new(CompositeShape::ExactlyOne, |evaluations| {
                composite::single(EligibilityRule::WarnIf, evaluations).map(composite::warn_if)
            }),
        )
    }

    fn insert(&mut self, rule: EligibilityRule, definition: RuleDefinition) -> &mut Self {
        if self.definitions.insert(rule, definition).is_some() {
            self.duplicates.push(rule);
        }
        self
    }

    /// Check exhaustiveness and freeze the registry
    pub fn build(self) -> EvalResult<FunctionRegistry> {
        if let Some(rule) = self.duplicates.first() {
            return Err(EvalError::duplicate_evaluator(*rule));
        }

        for rule in EligibilityRule::ALL {
            match (self.definitions.get(rule), CompositeRules::shape(*rule)) {
                (None, _) => return Err(EvalError::missing_evaluator(*rule)),
                (Some(RuleDefinition::Leaf(_)), Some(_)) => {
                    return Err(EvalError::definition_mismatch(*rule, "a leaf predicate"));
                }
                (Some(RuleDefinition::Composite(_)), None) => {
                    return Err(EvalError::definition_mismatch(*rule, "a composite"));
                }
                (Some(RuleDefinition::Composite(definition)), Some(shape))
                    if definition.shape != shape =>
                {
                    let registered = format!("{:?}", definition.shape);
                    return Err(EvalError::definition_mismatch(*rule, registered));
                }
                _ => {}
            }
        }

        log::debug!(
            "Built function registry with {} rules",
            self.definitions.len()
        );
        Ok(FunctionRegistry {
            definitions: self.definitions,
            resolver: FunctionInputResolver::new(Arc::clone(&self.doid_model)),
            doid_model: self.doid_model,
            reference_date: self.reference_date,
        })
    }
}

// ============================================================================
// Evaluator
// ============================================================================

/// A validated function tree bound to the registry
pub struct Evaluator<'r> {
    registry: &'r FunctionRegistry,
    function: &'r EligibilityFunction,
    kind: EvaluatorKind<'r>,
}

enum EvaluatorKind<'r> {
    Leaf {
        leaf: &'r LeafDefinition,
        input: FunctionValue,
        values: Vec<&'r str>,
    },
    Composite {
        composite: &'r CompositeDefinition,
        children: Vec<Evaluator<'r>>,
    },
}

impl<'r> Evaluator<'r> {
    pub fn function(&self) -> &'r EligibilityFunction {
        self.function
    }

    /// Evaluate the tree bottom-up against one patient
    pub fn evaluate(&self, record: &PatientRecord) -> EvalResult<Evaluation> {
        self.evaluate_at(record, self.registry.reference_date(record))
    }

    /// Evaluate with one reference date shared by every leaf of the tree
    pub fn evaluate_at(
        &self,
        record: &PatientRecord,
        reference_date: NaiveDate,
    ) -> EvalResult<Evaluation> {
        match &self.kind {
            EvaluatorKind::Leaf {
                leaf,
                input,
                values,
            } => {
                let context = PredicateContext {
                    rule: self.function.rule,
                    input,
                    reference_date,
                    doid_model: &self.registry.doid_model,
                };
                let outcome = (leaf.predicate)(&context, record)?;
                if outcome == PredicateOutcome::NotImplemented {
                    log::warn!("Rule {} is not implemented", self.function.rule);
                }
                Ok(leaf.to_evaluation(outcome, values))
            }
            EvaluatorKind::Composite {
                composite,
                children,
            } => {
                let evaluations = children
                    .iter()
                    .map(|child| child.evaluate_at(record, reference_date))
                    .collect::<EvalResult<Vec<_>>>()?;
                (composite.fold)(&evaluations)
            }
        }
    }
}
