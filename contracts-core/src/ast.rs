//! AST for contract expressions
//!
//! Nodes live in a flat arena ([`Ast`]) and refer to their children by
//! [`NodeId`]. A node is attached to its parent when the parent is added to
//! the arena, and every node can be attached at most once. After that the
//! tree shape never changes; only diagnostics and annotations may be added.

use crate::annotation::Annotation;
use crate::class_name::ClassName;
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::error::{Error, Result};
use crate::kinds::{
    ArithmeticKind, BitwiseKind, EqualityKind, LogicalKind, NodeKind, RelationalKind, ShiftKind,
    UnaryKind,
};
use crate::literal::Literal;
use crate::position::Position;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::num::NonZeroU32;
use std::sync::OnceLock;

/// Unique identifier for a node in an [`Ast`]
///
/// Uses NonZeroU32 internally so `Option<NodeId>` has the same size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub NonZeroU32);

impl NodeId {
    pub fn new(value: u32) -> Option<Self> {
        NonZeroU32::new(value).map(NodeId)
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }

    fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// AST node payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// A complete contract: optional precondition and ordered postconditions
    Clause {
        precondition: Option<NodeId>,
        postconditions: Vec<NodeId>,
    },
    Assertion {
        expression: NodeId,
        is_finally: bool,
    },
    /// Expects the method to throw `exception`, optionally binding it to
    /// `variable` and checking `expression`
    Throw {
        exception: ClassName,
        variable: Option<String>,
        expression: Option<NodeId>,
    },
    /// `!condition || implied`
    Imply {
        condition: NodeId,
        implied: NodeId,
    },
    ConditionalOp {
        condition: NodeId,
        on_true: NodeId,
        on_false: NodeId,
    },
    LogicalOp {
        kind: LogicalKind,
        left: NodeId,
        right: NodeId,
    },
    BitwiseOp {
        kind: BitwiseKind,
        left: NodeId,
        right: NodeId,
    },
    EqualityOp {
        kind: EqualityKind,
        left: NodeId,
        right: NodeId,
    },
    RelationalOp {
        kind: RelationalKind,
        left: NodeId,
        right: NodeId,
    },
    ShiftOp {
        kind: ShiftKind,
        left: NodeId,
        right: NodeId,
    },
    ArithmeticOp {
        kind: ArithmeticKind,
        left: NodeId,
        right: NodeId,
    },
    UnaryOp {
        kind: UnaryKind,
        operand: NodeId,
    },
    IdReference {
        source: Option<NodeId>,
        identifier: String,
    },
    MethodCall {
        source: Option<NodeId>,
        name: String,
        arguments: Vec<NodeId>,
    },
    ArrayAccess {
        source: NodeId,
        index: NodeId,
    },
    Literal(Literal),
    /// Placeholder for a sub-expression that could not be built; the reason
    /// is recorded as a diagnostic on the node
    Blank,
    /// A top-level form that only applies when `condition` holds
    IfExpression {
        condition: NodeId,
        expression: NodeId,
    },
}

/// A child reference together with the field it is stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub field: &'static str,
    pub index: usize,
    pub child: NodeId,
}

impl Slot {
    fn new(field: &'static str, index: usize, child: NodeId) -> Self {
        Self { field, index, child }
    }
}

/// Nodes that select a member, optionally from a source expression
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selector<'a> {
    Id {
        source: Option<NodeId>,
        identifier: &'a str,
    },
    Method {
        source: Option<NodeId>,
        name: &'a str,
        arguments: &'a [NodeId],
    },
}

impl<'a> Selector<'a> {
    pub fn source(&self) -> Option<NodeId> {
        match *self {
            Selector::Id { source, .. } | Selector::Method { source, .. } => source,
        }
    }

    /// The selected identifier or method name
    pub fn name(&self) -> &'a str {
        match *self {
            Selector::Id { identifier, .. } => identifier,
            Selector::Method { name, .. } => name,
        }
    }
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Clause { .. } => NodeKind::Clause,
            Node::Assertion { .. } => NodeKind::Assertion,
            Node::Throw { .. } => NodeKind::Throw,
            Node::Imply { .. } => NodeKind::Imply,
            Node::ConditionalOp { .. } => NodeKind::ConditionalOp,
            Node::LogicalOp { .. } => NodeKind::LogicalOp,
            Node::BitwiseOp { .. } => NodeKind::BitwiseOp,
            Node::EqualityOp { .. } => NodeKind::EqualityOp,
            Node::RelationalOp { .. } => NodeKind::RelationalOp,
            Node::ShiftOp { .. } => NodeKind::ShiftOp,
            Node::ArithmeticOp { .. } => NodeKind::ArithmeticOp,
            Node::UnaryOp { .. } => NodeKind::UnaryOp,
            Node::IdReference { .. } => NodeKind::IdReference,
            Node::MethodCall { .. } => NodeKind::MethodCall,
            Node::ArrayAccess { .. } => NodeKind::ArrayAccess,
            Node::Literal(_) => NodeKind::Literal,
            Node::Blank => NodeKind::Blank,
            Node::IfExpression { .. } => NodeKind::IfExpression,
        }
    }

    pub fn as_selector(&self) -> Option<Selector<'_>> {
        match self {
            Node::IdReference { source, identifier } => Some(Selector::Id {
                source: *source,
                identifier,
            }),
            Node::MethodCall {
                source,
                name,
                arguments,
            } => Some(Selector::Method {
                source: *source,
                name,
                arguments,
            }),
            _ => None,
        }
    }

    /// Child references in evaluation order, labelled with their field
    pub fn slots(&self) -> Vec<Slot> {
        fn binary(left: NodeId, right: NodeId) -> Vec<Slot> {
            vec![Slot::new("left", 0, left), Slot::new("right", 0, right)]
        }

        match self {
            Node::Clause {
                precondition,
                postconditions,
            } => precondition
                .iter()
                .map(|id| Slot::new("precondition", 0, *id))
                .chain(
                    postconditions
                        .iter()
                        .enumerate()
                        .map(|(i, id)| Slot::new("postconditions", i, *id)),
                )
                .collect(),
            Node::Assertion { expression, .. } => vec![Slot::new("expression", 0, *expression)],
            Node::Throw { expression, .. } => expression
                .iter()
                .map(|id| Slot::new("expression", 0, *id))
                .collect(),
            Node::Imply { condition, implied } => vec![
                Slot::new("condition", 0, *condition),
                Slot::new("implied", 0, *implied),
            ],
            Node::ConditionalOp {
                condition,
                on_true,
                on_false,
            } => vec![
                Slot::new("condition", 0, *condition),
                Slot::new("on_true", 0, *on_true),
                Slot::new("on_false", 0, *on_false),
            ],
            Node::LogicalOp { left, right, .. }
            | Node::BitwiseOp { left, right, .. }
            | Node::EqualityOp { left, right, .. }
            | Node::RelationalOp { left, right, .. }
            | Node::ShiftOp { left, right, .. }
            | Node::ArithmeticOp { left, right, .. } => binary(*left, *right),
            Node::UnaryOp { operand, .. } => vec![Slot::new("operand", 0, *operand)],
            Node::IdReference { source, .. } => {
                source.iter().map(|id| Slot::new("source", 0, *id)).collect()
            }
            Node::MethodCall {
                source, arguments, ..
            } => source
                .iter()
                .map(|id| Slot::new("source", 0, *id))
                .chain(
                    arguments
                        .iter()
                        .enumerate()
                        .map(|(i, id)| Slot::new("arguments", i, *id)),
                )
                .collect(),
            Node::ArrayAccess { source, index } => vec![
                Slot::new("source", 0, *source),
                Slot::new("index", 0, *index),
            ],
            Node::Literal(_) | Node::Blank => Vec::new(),
            Node::IfExpression {
                condition,
                expression,
            } => vec![
                Slot::new("condition", 0, *condition),
                Slot::new("expression", 0, *expression),
            ],
        }
    }

    /// Node-specific data other than child references
    pub fn label(&self) -> Option<String> {
        match self {
            Node::Assertion { is_finally, .. } => is_finally.then(|| "finally".to_string()),
            Node::Throw {
                exception,
                variable,
                ..
            } => Some(match variable {
                Some(variable) => format!("{} as {}", exception.to_binary(), variable),
                None => exception.to_binary(),
            }),
            Node::LogicalOp { kind, .. } => Some(kind.name().to_string()),
            Node::BitwiseOp { kind, .. } => Some(kind.name().to_string()),
            Node::EqualityOp { kind, .. } => Some(kind.name().to_string()),
            Node::RelationalOp { kind, .. } => Some(kind.name().to_string()),
            Node::ShiftOp { kind, .. } => Some(kind.name().to_string()),
            Node::ArithmeticOp { kind, .. } => Some(kind.name().to_string()),
            Node::UnaryOp { kind, .. } => Some(kind.name().to_string()),
            Node::IdReference { identifier, .. } => Some(identifier.clone()),
            Node::MethodCall { name, .. } => Some(name.clone()),
            Node::Literal(literal) => Some(literal.to_string()),
            Node::Clause { .. }
            | Node::Imply { .. }
            | Node::ConditionalOp { .. }
            | Node::ArrayAccess { .. }
            | Node::Blank
            | Node::IfExpression { .. } => None,
        }
    }

    /// Compares kind, own fields and child slot layout, ignoring which nodes
    /// the slots refer to
    fn shallow_eq(&self, other: &Node) -> bool {
        if self.kind() != other.kind() {
            return false;
        }
        let own_fields_equal = match (self, other) {
            (Node::Literal(a), Node::Literal(b)) => a == b,
            (
                Node::Throw {
                    exception: ea,
                    variable: va,
                    ..
                },
                Node::Throw {
                    exception: eb,
                    variable: vb,
                    ..
                },
            ) => ea == eb && va == vb,
            _ => self.label() == other.label(),
        };
        own_fields_equal && {
            let a = self.slots();
            let b = other.slots();
            a.len() == b.len()
                && a.iter()
                    .zip(&b)
                    .all(|(x, y)| x.field == y.field && x.index == y.index)
        }
    }
}

struct Entry {
    node: Node,
    position: Position,
    parent: Option<NodeId>,
    diagnostics: Diagnostics,
    children: OnceLock<Vec<NodeId>>,
    annotations: FxHashMap<&'static str, Box<dyn Any + Send + Sync>>,
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("node", &self.node)
            .field("position", &self.position)
            .field("parent", &self.parent)
            .field("diagnostics", &self.diagnostics)
            .field("annotations", &self.annotations.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Arena owning every node of one compiled expression
#[derive(Debug, Default)]
pub struct Ast {
    entries: Vec<Entry>,
    root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and attaches every child it references
    ///
    /// Fails without changing the arena if a child does not exist, already
    /// has a parent, or is referenced twice by this node.
    pub fn add_node(&mut self, position: Position, node: Node) -> Result<NodeId> {
        let raw = u32::try_from(self.entries.len() + 1).map_err(|_| Error::NodeIdOverflow)?;
        let id = NodeId::new(raw).ok_or(Error::NodeIdOverflow)?;

        let children = node.slots();
        for (i, slot) in children.iter().enumerate() {
            let entry = self.entry(slot.child)?;
            if let Some(owner) = entry.parent {
                return Err(Error::Ownership {
                    child: slot.child,
                    owner,
                });
            }
            if children[..i].iter().any(|earlier| earlier.child == slot.child) {
                return Err(Error::Ownership {
                    child: slot.child,
                    owner: id,
                });
            }
        }
        for slot in &children {
            self.entries[slot.child.index()].parent = Some(id);
        }

        self.entries.push(Entry {
            node,
            position,
            parent: None,
            diagnostics: Diagnostics::new(),
            children: OnceLock::new(),
            annotations: FxHashMap::default(),
        });
        Ok(id)
    }

    /// Adds a blank placeholder carrying `message` as its diagnostic
    pub fn add_blank(&mut self, position: Position, message: impl Into<String>) -> Result<NodeId> {
        let id = self.add_node(position, Node::Blank)?;
        self.add_diagnostic(id, Diagnostic::new(position, message))?;
        Ok(id)
    }

    fn entry(&self, id: NodeId) -> Result<&Entry> {
        self.entries.get(id.index()).ok_or(Error::NodeNotFound(id))
    }

    fn entry_mut(&mut self, id: NodeId) -> Result<&mut Entry> {
        self.entries.get_mut(id.index()).ok_or(Error::NodeNotFound(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.entries.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.entry(id).ok().map(|e| &e.node)
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(Node::kind)
    }

    pub fn position(&self, id: NodeId) -> Option<Position> {
        self.entry(id).ok().map(|e| e.position)
    }

    /// The node this one is attached to, `None` for unattached nodes
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entry(id).ok().and_then(|e| e.parent)
    }

    /// Children in kind-specific order; computed on first access
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.entry(id) {
            Ok(entry) => entry
                .children
                .get_or_init(|| entry.node.slots().into_iter().map(|s| s.child).collect())
                .as_slice(),
            Err(_) => &[],
        }
    }

    pub fn diagnostics(&self, id: NodeId) -> Option<&Diagnostics> {
        self.entry(id).ok().map(|e| &e.diagnostics)
    }

    pub fn add_diagnostic(&mut self, id: NodeId, diagnostic: Diagnostic) -> Result<bool> {
        Ok(self.entry_mut(id)?.diagnostics.add(diagnostic))
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) -> Result<()> {
        if self.entry(id)?.parent.is_some() {
            return Err(Error::NotARoot(id));
        }
        self.root = Some(id);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.entries.iter().enumerate().filter_map(|(i, e)| {
            let id = NodeId::new(u32::try_from(i + 1).ok()?)?;
            Some((id, &e.node))
        })
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| e.diagnostics.has_errors())
    }

    /// Every diagnostic in the arena, sorted by position
    ///
    /// The sort is stable and equal diagnostics reported on several nodes
    /// appear once.
    pub fn all_diagnostics(&self) -> Vec<Diagnostic> {
        let mut all: Vec<&Diagnostic> = self
            .entries
            .iter()
            .flat_map(|e| e.diagnostics.iter())
            .collect();
        all.sort_by_key(|d| d.position);
        all.into_iter()
            .cloned()
            .collect::<Diagnostics>()
            .into_vec()
    }

    /// Stores `value` under `key`, returning the previous value
    pub fn annotate<T: Any + Send + Sync>(
        &mut self,
        id: NodeId,
        key: Annotation<T>,
        value: T,
    ) -> Result<Option<T>> {
        let previous = self
            .entry_mut(id)?
            .annotations
            .insert(key.name(), Box::new(value));
        Ok(previous.and_then(|old| old.downcast::<T>().ok()).map(|b| *b))
    }

    pub fn annotation<T: Any + Send + Sync>(&self, id: NodeId, key: Annotation<T>) -> Option<&T> {
        self.entry(id)
            .ok()?
            .annotations
            .get(key.name())?
            .downcast_ref::<T>()
    }

    pub fn remove_annotation<T: Any + Send + Sync>(
        &mut self,
        id: NodeId,
        key: Annotation<T>,
    ) -> Option<T> {
        let value = self.entry_mut(id).ok()?.annotations.remove(key.name())?;
        value.downcast::<T>().ok().map(|b| *b)
    }

    /// Structural equality of `a` in this tree and `b` in `other`
    ///
    /// Both subtrees must match in kind, own fields and children, and both
    /// nodes must sit at an equivalent place in their trees: both are
    /// unattached, or their parents have the same kind and hold them in the
    /// same slot, up to the top. Positions and diagnostics are ignored.
    pub fn structurally_equal(&self, a: NodeId, other: &Ast, b: NodeId) -> bool {
        self.subtree_equal(a, other, b) && self.same_place(a, other, b)
    }

    fn subtree_equal(&self, a: NodeId, other: &Ast, b: NodeId) -> bool {
        let (Some(na), Some(nb)) = (self.node(a), other.node(b)) else {
            return false;
        };
        if !na.shallow_eq(nb) {
            return false;
        }
        self.children(a)
            .iter()
            .zip(other.children(b))
            .all(|(ca, cb)| self.subtree_equal(*ca, other, *cb))
    }

    fn same_place(&self, mut a: NodeId, other: &Ast, mut b: NodeId) -> bool {
        loop {
            match (self.parent(a), other.parent(b)) {
                (None, None) => return true,
                (Some(pa), Some(pb)) => {
                    let (Some(na), Some(nb)) = (self.node(pa), other.node(pb)) else {
                        return false;
                    };
                    if na.kind() != nb.kind() || slot_of(na, a) != slot_of(nb, b) {
                        return false;
                    }
                    a = pa;
                    b = pb;
                }
                _ => return false,
            }
        }
    }

    /// Renders a subtree as an S-expression, e.g.
    /// `(RELATIONAL_OP GT (ID_REFERENCE a) (LITERAL 0))`
    pub fn to_sexpr(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_sexpr(id, &mut out);
        out
    }

    fn write_sexpr(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            out.push_str("<missing>");
            return;
        };
        out.push('(');
        out.push_str(node.kind().name());
        if let Some(label) = node.label() {
            out.push(' ');
            out.push_str(&label);
        }
        for child in self.children(id) {
            out.push(' ');
            self.write_sexpr(*child, out);
        }
        out.push(')');
    }
}

fn slot_of(parent: &Node, child: NodeId) -> Option<(&'static str, usize)> {
    parent
        .slots()
        .into_iter()
        .find(|s| s.child == child)
        .map(|s| (s.field, s.index))
}

#[cfg(test)]
#[path = "ast_tests.rs"]
mod tests;
