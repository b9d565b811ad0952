//! Parse errors

use thiserror::Error;
use trialmatch_types::MAX_FUNCTION_DEPTH;

/// Error raised while reading the compact rule syntax
///
/// Positions are byte offsets into the parsed text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input is empty or whitespace only
    #[error("Empty eligibility rule")]
    Empty,

    /// Input does not follow `RULE`, `RULE[values]` or `RULE(functions)`
    #[error("Syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    /// A well-formed rule name that is not part of the rule set
    #[error("Unknown eligibility rule '{name}' at position {position}")]
    UnknownRule { name: String, position: usize },

    /// Functions nested deeper than the supported maximum
    #[error("Eligibility rule nested deeper than {max_depth} levels at position {position}")]
    TooDeep { max_depth: usize, position: usize },
}

impl ParseError {
    pub fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }

    pub fn unknown_rule(name: impl Into<String>, position: usize) -> Self {
        Self::UnknownRule {
            name: name.into(),
            position,
        }
    }

    pub fn too_deep(position: usize) -> Self {
        Self::TooDeep {
            max_depth: MAX_FUNCTION_DEPTH,
            position,
        }
    }

    /// Byte offset of the error, if it has one
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Empty => None,
            Self::Syntax { position, .. }
            | Self::UnknownRule { position, .. }
            | Self::TooDeep { position, .. } => Some(*position),
        }
    }
}
