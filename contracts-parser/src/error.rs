//! Parser error types

use crate::lexer::{Token, TokenKind};
use contracts_core::{Diagnostic, Position};
use thiserror::Error;

/// Failure of a whole compilation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The expression has problems; all of them, in source order
    #[error("{}", summarize(.diagnostics))]
    Syntax { diagnostics: Vec<Diagnostic> },

    /// The compiler itself is inconsistent; never caused by user input
    #[error("Internal compiler error: {0}")]
    Internal(String),
}

impl ParseError {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            ParseError::Syntax { diagnostics } => diagnostics,
            ParseError::Internal(_) => &[],
        }
    }
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    match diagnostics {
        [] => "Syntax error".to_string(),
        [only] => format!("Syntax error at {only}"),
        [first, rest @ ..] => format!("Syntax error at {first} (and {} more)", rest.len()),
    }
}

impl From<contracts_core::Error> for ParseError {
    fn from(err: contracts_core::Error) -> Self {
        ParseError::Internal(err.to_string())
    }
}

/// A point where the input does not match the grammar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{position}: {message}")]
pub struct RecognitionError {
    pub position: Position,
    pub message: String,
}

impl RecognitionError {
    pub fn mismatched(found: &Token<'_>, expected: TokenKind) -> Self {
        Self {
            position: found.position,
            message: format!(
                "mismatched input '{}' expecting {}",
                found.display_text(),
                expected
            ),
        }
    }

    pub fn no_viable_alternative(found: &Token<'_>) -> Self {
        Self {
            position: found.position,
            message: format!("no viable alternative at input '{}'", found.display_text()),
        }
    }

    pub fn too_deep(found: &Token<'_>, max_depth: usize) -> Self {
        Self {
            position: found.position,
            message: format!("expression nesting exceeds maximum depth of {max_depth}"),
        }
    }
}
