//! Core types for the contract expression language (CEL)
//!
//! This crate provides the building blocks shared by the compiler front end
//! and the class resolution layer:
//! - Source positions and diagnostics
//! - Canonical class names
//! - The AST arena, node kinds and visitor
//! - Error types

pub mod annotation;
pub mod ast;
pub mod class_name;
pub mod diagnostic;
pub mod error;
pub mod kinds;
pub mod literal;
pub mod position;
pub mod visitor;

pub use annotation::Annotation;
pub use ast::{Ast, Node, NodeId, Selector};
pub use class_name::{ClassName, IllegalClassNameError, NameForm};
pub use diagnostic::{Diagnostic, Diagnostics};
pub use error::{Error, Result};
pub use kinds::{
    ArithmeticKind, BitwiseKind, EqualityKind, LiteralKind, LogicalKind, NodeKind,
    RelationalKind, ShiftKind, UnaryKind,
};
pub use literal::{Literal, LiteralValue};
pub use position::Position;
pub use visitor::Visitor;
