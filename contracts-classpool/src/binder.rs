//! Binds literal and exception types of a compiled clause to pool classes

use crate::ct_class::CtClass;
use crate::error::NotFoundError;
use crate::pool::ClassPool;
use contracts_core::{annotations, Ast, ClassName, Diagnostic, Node, NodeId, Position, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

annotations! {
    /// The class a literal or thrown exception resolved to
    pub RESOLVED_TYPE: Arc<CtClass>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    /// Packages searched for unqualified exception names, in order
    pub implicit_packages: Vec<String>,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            implicit_packages: vec!["java.lang".to_string()],
        }
    }
}

pub struct TypeBinder<'p> {
    pool: &'p ClassPool,
    config: BinderConfig,
}

impl<'p> TypeBinder<'p> {
    pub fn new(pool: &'p ClassPool, config: BinderConfig) -> Self {
        Self { pool, config }
    }

    /// Annotates every literal and throw below `root` with its resolved
    /// class and returns how many were bound
    ///
    /// Nodes whose type cannot be resolved get a diagnostic instead; the
    /// walk always covers the whole tree.
    pub fn bind(&self, ast: &mut Ast, root: NodeId) -> Result<usize> {
        let mut bound = 0;
        let mut pending = vec![root];

        while let Some(id) = pending.pop() {
            let resolved = match ast.node(id) {
                Some(Node::Literal(literal)) => Some(self.literal_type(&literal.class_name())),
                Some(Node::Throw { exception, .. }) => Some(self.exception_type(exception)),
                Some(_) => None,
                None => return Err(contracts_core::Error::NodeNotFound(id)),
            };

            match resolved {
                Some(Ok(class)) => {
                    debug!("Bound node {} to {}", id, class);
                    ast.annotate(id, RESOLVED_TYPE, class)?;
                    bound += 1;
                }
                Some(Err(message)) => {
                    let position = ast.position(id).unwrap_or(Position::START);
                    ast.add_diagnostic(id, Diagnostic::new(position, message))?;
                }
                None => {}
            }
            pending.extend(ast.children(id).iter().rev());
        }
        Ok(bound)
    }

    fn literal_type(&self, name: &ClassName) -> std::result::Result<Arc<CtClass>, String> {
        self.pool
            .get(name)
            .map_err(|e| format!("cannot resolve literal type {name}: {e}"))
    }

    /// Tries the name as written, then under each implicit package when it
    /// has no package of its own
    fn exception_type(&self, written: &ClassName) -> std::result::Result<Arc<CtClass>, String> {
        let unresolved = |e: NotFoundError| format!("cannot resolve exception class {written}: {e}");

        match self.pool.get(written) {
            Ok(class) => return Ok(class),
            Err(e) if !e.is_not_found() || written.name().contains('/') => return Err(unresolved(e)),
            Err(_) => {}
        }

        for package in &self.config.implicit_packages {
            let Ok(candidate) = ClassName::for_binary(&format!("{package}.{}", written.name())) else {
                continue;
            };
            match self.pool.get(&candidate) {
                Ok(class) => return Ok(class),
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(unresolved(e)),
            }
        }
        Err(format!("cannot resolve exception class {written}"))
    }
}
