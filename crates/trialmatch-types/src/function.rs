//! Eligibility function trees

use crate::rule::EligibilityRule;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Deepest nesting of functions a criterion may use (a leaf has depth 1)
pub const MAX_FUNCTION_DEPTH: usize = 64;

/// One node of a criteria tree: a rule plus its ordered parameters
///
/// Composite rules take other functions as parameters; leaf rules take
/// primitive values. The shape is validated when the function is evaluated,
/// not when it is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EligibilityFunction {
    pub rule: EligibilityRule,
    #[serde(default)]
    pub parameters: Vec<FunctionParameter>,
}

/// Parameter of an eligibility function
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum FunctionParameter {
    /// A nested function (composite rules)
    Function(EligibilityFunction),
    /// A primitive value, kept in its textual form (leaf rules)
    Value(String),
}

impl EligibilityFunction {
    /// Function without parameters
    pub fn new(rule: EligibilityRule) -> Self {
        Self {
            rule,
            parameters: Vec::new(),
        }
    }

    /// Leaf function with primitive parameters
    pub fn with_values<I, S>(rule: EligibilityRule, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rule,
            parameters: values
                .into_iter()
                .map(|v| FunctionParameter::Value(v.into()))
                .collect(),
        }
    }

    /// Composite function over sub-functions
    pub fn composite(
        rule: EligibilityRule,
        functions: impl IntoIterator<Item = EligibilityFunction>,
    ) -> Self {
        Self {
            rule,
            parameters: functions
                .into_iter()
                .map(FunctionParameter::Function)
                .collect(),
        }
    }

    /// Nested functions among the parameters, in order
    pub fn sub_functions(&self) -> impl Iterator<Item = &EligibilityFunction> {
        self.parameters
            .iter()
            .filter_map(FunctionParameter::as_function)
    }

    /// Primitive values among the parameters, in order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter_map(FunctionParameter::as_value)
    }

    /// Depth of the tree rooted at this node (a leaf has depth 1)
    ///
    /// Walks the tree without recursion, so arbitrarily deep trees can be
    /// measured before anything recurses into them.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((function, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            pending.extend(function.sub_functions().map(|child| (child, depth + 1)));
        }
        deepest
    }

    /// Whether the tree nests deeper than [`MAX_FUNCTION_DEPTH`]
    pub fn is_too_deep(&self) -> bool {
        self.depth() > MAX_FUNCTION_DEPTH
    }
}

impl FunctionParameter {
    pub fn as_function(&self) -> Option<&EligibilityFunction> {
        match self {
            Self::Function(function) => Some(function),
            Self::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&str> {
        match self {
            Self::Function(_) => None,
            Self::Value(value) => Some(value),
        }
    }
}

/// Renders the compact rule syntax: `RULE`, `RULE[a, b]` or `RULE(f, g)`
impl fmt::Display for EligibilityFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rule.as_str())?;
        if self.parameters.is_empty() {
            return Ok(());
        }

        let nested = self
            .parameters
            .iter()
            .any(|p| matches!(p, FunctionParameter::Function(_)));
        let (open, close) = if nested { ('(', ')') } else { ('[', ']') };

        write!(f, "{open}")?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{parameter}")?;
        }
        write!(f, "{close}")
    }
}

impl fmt::Display for FunctionParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(function) => write!(f, "{function}"),
            Self::Value(value) => f.write_str(value),
        }
    }
}

/// Accepts a nested function object, a string, or a number (kept as text)
impl<'de> Deserialize<'de> for FunctionParameter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ParameterVisitor;

        impl<'de> Visitor<'de> for ParameterVisitor {
            type Value = FunctionParameter;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an eligibility function, a string or a number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(FunctionParameter::Value(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(FunctionParameter::Value(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(FunctionParameter::Value(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(FunctionParameter::Value(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(FunctionParameter::Value(v.to_string()))
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                EligibilityFunction::deserialize(de::value::MapAccessDeserializer::new(map))
                    .map(FunctionParameter::Function)
            }
        }

        deserializer.deserialize_any(ParameterVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn age(years: &str) -> EligibilityFunction {
        EligibilityFunction::with_values(EligibilityRule::IsAtLeastXYearsOld, [years])
    }

    #[test]
    fn test_display_leaf_without_parameters() {
        let function = EligibilityFunction::new(EligibilityRule::IsMale);
        assert_eq!(function.to_string(), "IS_MALE");
    }

    #[test]
    fn test_display_nested() {
        let function = EligibilityFunction::composite(
            EligibilityRule::And,
            [
                age("18"),
                EligibilityFunction::composite(
                    EligibilityRule::Not,
                    [EligibilityFunction::new(EligibilityRule::HasKnownActiveCnsMetastases)],
                ),
            ],
        );

        assert_eq!(
            function.to_string(),
            "AND(IS_AT_LEAST_X_YEARS_OLD[18], NOT(HAS_KNOWN_ACTIVE_CNS_METASTASES))"
        );
        assert_eq!(function.depth(), 3);
    }

    #[test]
    fn test_depth_of_long_chain() {
        let mut function = EligibilityFunction::new(EligibilityRule::IsMale);
        for _ in 0..1000 {
            function = EligibilityFunction::composite(EligibilityRule::Not, [function]);
        }

        assert_eq!(function.depth(), 1001);
        assert!(function.is_too_deep());
        assert!(!age("18").is_too_deep());
    }

    #[test]
    fn test_deserialize_numbers_as_values() {
        let json = r#"{"rule": "IS_AT_LEAST_X_YEARS_OLD", "parameters": [18]}"#;
        let function: EligibilityFunction = serde_json::from_str(json).unwrap();
        assert_eq!(function, age("18"));
    }

    #[test]
    fn test_deserialize_nested_function() {
        let json = r#"{"rule": "NOT", "parameters": [{"rule": "IS_MALE"}]}"#;
        let function: EligibilityFunction = serde_json::from_str(json).unwrap();

        assert_eq!(
            function,
            EligibilityFunction::composite(
                EligibilityRule::Not,
                [EligibilityFunction::new(EligibilityRule::IsMale)]
            )
        );
        assert_eq!(function.sub_functions().count(), 1);
        assert_eq!(function.values().count(), 0);
    }

    #[test]
    fn test_serialize_is_untagged() {
        let json = serde_json::to_value(age("18")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"rule": "IS_AT_LEAST_X_YEARS_OLD", "parameters": ["18"]})
        );
    }
}
