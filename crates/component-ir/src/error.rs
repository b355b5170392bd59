//! Error types for type name parsing.

use thiserror::Error;

/// Result type for type name operations.
pub type TypeNameResult<T> = Result<T, TypeNameError>;

/// A type name that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeNameError {
    /// Nothing but whitespace.
    #[error("type name is empty")]
    Empty,
    /// A character no type name can contain.
    #[error("unexpected character at offset {offset} in '{text}'")]
    Unexpected {
        /// The full type name.
        text: String,
        /// Byte offset of the character.
        offset: usize,
    },
    /// A missing token.
    #[error("expected {expected} at token {position}")]
    Expected {
        /// What was expected.
        expected: String,
        /// Token index.
        position: usize,
    },
    /// Tokens after a complete type.
    #[error("unexpected trailing tokens in '{text}'")]
    Trailing {
        /// The full type name.
        text: String,
    },
}

impl TypeNameError {
    /// Create an empty-name error.
    pub fn empty() -> Self {
        Self::Empty
    }

    /// Create an unexpected-character error.
    pub fn unexpected(text: &str, offset: usize) -> Self {
        Self::Unexpected {
            text: text.to_string(),
            offset,
        }
    }

    /// Create a missing-token error.
    pub fn expected(expected: impl Into<String>, position: usize) -> Self {
        Self::Expected {
            expected: expected.into(),
            position,
        }
    }

    /// Create a trailing-tokens error.
    pub fn trailing(text: &str) -> Self {
        Self::Trailing {
            text: text.to_string(),
        }
    }
}
