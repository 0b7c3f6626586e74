//! Front end of the contract expression language compiler
//!
//! The pipeline is:
//! - [`lexer`] turns source text into positioned tokens using logos
//! - [`parser`] recognizes a clause and reports completed rules
//! - [`builder`] listens to those rules and builds the arena AST
//! - [`compiler`] ties the stages together and applies the fail-fast policy

pub mod builder;
pub mod compiler;
pub mod context;
pub mod error;
pub mod lexer;
pub mod listener;
pub mod literals;
pub mod parser;
pub mod recovery;

pub use builder::{BuilderErrorStrategy, OperatorTables, TreeBuilder, OPERATOR_TABLES};
pub use compiler::{compile, Compilation, Compiler, CompilerConfig};
pub use context::{OperatorFamily, Rule, RuleContext};
pub use error::{ParseError, RecognitionError};
pub use lexer::{tokenize, Lexed, Lexer, Token, TokenKind};
pub use listener::{NoopListener, ParseListener};
pub use literals::LiteralError;
pub use parser::Parser;
pub use recovery::{DefaultErrorStrategy, ErrorStrategy, Recognizer};
