//! `celc parse`: compile an expression and print its tree

use super::diagnostics_error;
use crate::config::Config;
use anyhow::Result;
use contracts_core::{Node, NodeId, Position};
use contracts_parser::{Compiler, ParseError};
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Line of the expression's first character in its host file
    pub line: Option<u32>,
    pub column: u32,
    pub json: bool,
}

#[derive(Serialize)]
struct NodeEntry<'a> {
    id: NodeId,
    position: Option<Position>,
    node: &'a Node,
}

#[derive(Serialize)]
struct ParseReport<'a> {
    root: NodeId,
    sexpr: String,
    nodes: Vec<NodeEntry<'a>>,
}

pub fn render(expression: &str, options: &ParseOptions, config: &Config) -> Result<String> {
    let mut compiler_config = config.compiler.clone();
    if let Some(line) = options.line {
        compiler_config.origin = Position::new(line, options.column)?;
    }

    let compilation = match Compiler::new(compiler_config).compile(expression) {
        Ok(compilation) => compilation,
        Err(ParseError::Syntax { diagnostics }) if options.json => {
            return Err(anyhow::anyhow!(serde_json::to_string_pretty(
                &serde_json::json!({ "diagnostics": diagnostics })
            )?));
        }
        Err(ParseError::Syntax { diagnostics }) => {
            return Err(diagnostics_error("compilation", &diagnostics));
        }
        Err(err) => return Err(err.into()),
    };

    let ast = &compilation.ast;
    let sexpr = ast.to_sexpr(compilation.root);
    if !options.json {
        return Ok(sexpr);
    }

    let report = ParseReport {
        root: compilation.root,
        sexpr,
        nodes: ast
            .iter()
            .map(|(id, node)| NodeEntry {
                id,
                position: ast.position(id),
                node,
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
