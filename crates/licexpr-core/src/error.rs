//! Error types for license expression handling
//!
//! All fallible operations return `Result<T, Error>`.
//! Every error carries the offending token or phrase so callers can
//! report it, and `Error::kind()` exposes a fieldless discriminant
//! for programmatic handling.

use crate::parser::tokenizer::Span;

/// License expression error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Input was empty or whitespace only
    #[error("empty expression")]
    EmptyExpression,

    /// A token appeared where the grammar does not allow it
    #[error("unexpected token '{token}' at {span}")]
    UnexpectedToken { token: String, span: Span },

    /// An opening parenthesis was never closed, or a closing one never opened
    #[error("unbalanced parentheses at {span}")]
    UnbalancedParentheses { span: Span },

    /// A word or phrase that does not resolve to a known license
    #[error("invalid license identifier: {0}")]
    InvalidLicense(String),

    /// The word after WITH is not a known exception
    #[error("invalid exception identifier: {0}")]
    InvalidException(String),

    /// An operator is missing its right-hand side
    #[error("missing operand: {0}")]
    MissingOperand(String),

    /// NONE or NOASSERTION used inside a larger expression
    #[error("{0} must be the entire expression")]
    InvalidSpecialValue(String),
}

/// Fieldless discriminant of [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyExpression,
    UnexpectedToken,
    UnbalancedParentheses,
    InvalidLicense,
    InvalidException,
    MissingOperand,
    InvalidSpecialValue,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptyExpression => ErrorKind::EmptyExpression,
            Error::UnexpectedToken { .. } => ErrorKind::UnexpectedToken,
            Error::UnbalancedParentheses { .. } => ErrorKind::UnbalancedParentheses,
            Error::InvalidLicense(_) => ErrorKind::InvalidLicense,
            Error::InvalidException(_) => ErrorKind::InvalidException,
            Error::MissingOperand(_) => ErrorKind::MissingOperand,
            Error::InvalidSpecialValue(_) => ErrorKind::InvalidSpecialValue,
        }
    }
}

/// Result type alias for license expression operations
pub type Result<T> = std::result::Result<T, Error>;
