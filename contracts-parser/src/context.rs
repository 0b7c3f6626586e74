//! Parse-tree contexts handed to listeners when a rule completes

use crate::lexer::{Token, TokenKind};
use contracts_core::NodeId;

/// Operator families sharing one binary rule shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorFamily {
    Logical,
    Bitwise,
    Equality,
    Relational,
    Shift,
    Arithmetic,
}

/// Grammar rules that produce a context
///
/// Rules that merely forward to a tighter-binding rule (an expression
/// without an operator) produce no context of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Clause,
    Precondition,
    Postcondition,
    /// The top-level form guarded by an `if (...)`
    GuardedBody,
    GuardedExpression,
    FinallyExpression,
    ThrowExpression,
    ClassRef,
    Implication,
    Conditional,
    Binary(OperatorFamily),
    Unary,
    /// A primary followed by selectors
    Factor,
    FieldSelector,
    MethodSelector,
    IndexSelector,
    Identifier,
    /// A method call without a source expression
    Call,
    Parenthesized,
    Literal,
}

/// Result of one completed rule
///
/// `children` holds the contexts of sub-rules in source order, `tokens` the
/// significant terminals (operators, identifiers, literals). Listeners store
/// what they build in `node`.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleContext<'a> {
    pub rule: Rule,
    pub start: Token<'a>,
    pub tokens: Vec<Token<'a>>,
    pub children: Vec<RuleContext<'a>>,
    pub node: Option<NodeId>,
}

impl<'a> RuleContext<'a> {
    pub fn new(rule: Rule, start: Token<'a>) -> Self {
        Self {
            rule,
            start,
            tokens: Vec::new(),
            children: Vec::new(),
            node: None,
        }
    }

    /// First significant token of the given kind
    pub fn token(&self, kind: TokenKind) -> Option<&Token<'a>> {
        self.tokens.iter().find(|t| t.kind == kind)
    }

    pub fn child(&self, index: usize) -> Option<&RuleContext<'a>> {
        self.children.get(index)
    }

    /// Node built for the child at `index`
    pub fn child_node(&self, index: usize) -> Option<NodeId> {
        self.children.get(index).and_then(|c| c.node)
    }

    /// Nodes of all children, or `None` if any child has none
    pub fn child_nodes(&self) -> Option<Vec<NodeId>> {
        self.children.iter().map(|c| c.node).collect()
    }

    pub fn children_of(&self, rule: Rule) -> impl Iterator<Item = &RuleContext<'a>> + '_ {
        self.children.iter().filter(move |c| c.rule == rule)
    }
}
