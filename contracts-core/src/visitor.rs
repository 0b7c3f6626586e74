//! AST visitor

use crate::ast::{Ast, Node, NodeId};

/// Trait for visiting AST nodes
///
/// `visit_node` has no default so every implementation decides, for every
/// node kind, whether to descend. [`Visitor::visit_children`] walks the
/// children in their natural order.
pub trait Visitor {
    /// Visit a node
    fn visit_node(&mut self, ast: &Ast, node_id: NodeId, node: &Node);

    /// Visit a node by ID
    fn visit_node_id(&mut self, ast: &Ast, node_id: NodeId) {
        if let Some(node) = ast.node(node_id) {
            self.visit_node(ast, node_id, node);
        }
    }

    /// Visit every child of a node
    fn visit_children(&mut self, ast: &Ast, node_id: NodeId) {
        for child in ast.children(node_id) {
            self.visit_node_id(ast, *child);
        }
    }

    /// Visit the tree from its root
    fn visit_ast(&mut self, ast: &Ast) {
        if let Some(root) = ast.root() {
            self.visit_node_id(ast, root);
        }
    }
}
