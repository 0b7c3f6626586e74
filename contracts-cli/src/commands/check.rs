//! `celc check`: compile an expression and bind its types against a classpath

use super::{class_pool, diagnostics_error};
use crate::config::Config;
use anyhow::Result;
use contracts_classpool::{TypeBinder, RESOLVED_TYPE};
use contracts_parser::{Compiler, ParseError};
use std::fmt::Write;
use std::path::PathBuf;
use tracing::debug;

pub fn render(expression: &str, classpath: &[PathBuf], config: &Config) -> Result<String> {
    let mut compilation = match Compiler::new(config.compiler.clone()).compile(expression) {
        Ok(compilation) => compilation,
        Err(ParseError::Syntax { diagnostics }) => {
            return Err(diagnostics_error("compilation", &diagnostics));
        }
        Err(err) => return Err(err.into()),
    };

    let pool = class_pool(classpath, config);
    let bound = TypeBinder::new(&pool, config.binder.clone())
        .bind(&mut compilation.ast, compilation.root)?;
    debug!(bound, classes = pool.len(), "types bound");

    let ast = &compilation.ast;
    let diagnostics = ast.all_diagnostics();
    if !diagnostics.is_empty() {
        return Err(diagnostics_error("type check", &diagnostics));
    }

    let mut output = String::new();
    for (id, node) in ast.iter() {
        if let Some(class) = ast.annotation(id, RESOLVED_TYPE) {
            let position = ast
                .position(id)
                .map(|p| p.to_string())
                .unwrap_or_default();
            writeln!(output, "{position} {} {class}", node.kind())?;
        }
    }
    write!(output, "ok: {bound} type(s) bound")?;
    Ok(output)
}
