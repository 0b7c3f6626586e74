//! Compiler entry point: source text to a checked AST

use crate::builder::TreeBuilder;
use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::listener::NoopListener;
use contracts_core::{Ast, Diagnostic, Diagnostics, NodeId, Position};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Position of the first character of the expression in its host file
    pub origin: Position,
    pub max_depth: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            origin: Position::START,
            max_depth: Parser::<NoopListener>::DEFAULT_MAX_DEPTH,
        }
    }
}

/// A successfully compiled clause
#[derive(Debug)]
pub struct Compilation {
    pub ast: Ast,
    /// The clause node, also set as the root of `ast`
    pub root: NodeId,
}

#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compiles one contract clause
    ///
    /// Fails fast: any lexical, syntactic or semantic diagnostic fails the
    /// whole compilation, and all of them are returned sorted by position.
    #[instrument(level = "debug", skip(self, source), fields(len = source.len()))]
    pub fn compile(&self, source: &str) -> Result<Compilation, ParseError> {
        let lexed = Lexer::new(source)
            .with_origin(self.config.origin)
            .tokenize();
        let mut parser = TreeBuilder::new()
            .install(lexed)
            .with_max_depth(self.config.max_depth);
        let clause = parser.parse_clause();
        let (builder, syntax) = parser.finish();
        let mut ast = builder.finish()?;

        let mut diagnostics: Vec<Diagnostic> = syntax;
        diagnostics.extend(ast.all_diagnostics());
        diagnostics.sort_by_key(|d| d.position);
        let diagnostics = diagnostics.into_iter().collect::<Diagnostics>();

        if diagnostics.has_errors() {
            debug!(count = diagnostics.len(), "compilation failed");
            return Err(ParseError::Syntax {
                diagnostics: diagnostics.into_vec(),
            });
        }
        let root = clause.node.ok_or_else(|| {
            ParseError::Internal("clause produced no node and no diagnostics".to_string())
        })?;
        ast.set_root(root)?;
        debug!(nodes = ast.len(), "compilation succeeded");
        Ok(Compilation { ast, root })
    }
}

/// Compiles `source` with the default configuration
pub fn compile(source: &str) -> Result<Compilation, ParseError> {
    Compiler::default().compile(source)
}
