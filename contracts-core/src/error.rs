//! Error types for the core crate

use crate::ast::NodeId;
use crate::class_name::IllegalClassNameError;
use crate::kinds::LiteralKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid position {line}:{column}: lines start at 1")]
    InvalidPosition { line: u32, column: u32 },

    /// A node that already has a parent was attached again. This is a
    /// programming error in the caller, not a problem with the input.
    #[error("Node {child} is already owned by {owner}")]
    Ownership { child: NodeId, owner: NodeId },

    #[error("Node {0} does not exist in this tree")]
    NodeNotFound(NodeId),

    #[error("Value {found} is not compatible with literal kind {kind}")]
    IncompatibleLiteral { kind: LiteralKind, found: String },

    #[error("Node {0} has a parent and cannot be the root")]
    NotARoot(NodeId),

    #[error("AST node ID overflow: maximum number of nodes reached")]
    NodeIdOverflow,

    #[error(transparent)]
    IllegalClassName(#[from] IllegalClassNameError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
