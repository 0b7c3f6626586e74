//! AST construction from completed parse rules
//!
//! [`TreeBuilder`] listens to the parser and turns each completed rule into
//! arena nodes, storing the new node id back into the rule's context so the
//! parent rule can pick it up. Once a syntax error is reported the builder is
//! detached by [`BuilderErrorStrategy`]; the partial tree is never used.

use crate::context::{OperatorFamily, Rule, RuleContext};
use crate::error::{ParseError, RecognitionError};
use crate::lexer::{Lexed, Token, TokenKind};
use crate::listener::ParseListener;
use crate::literals::literal_node;
use crate::parser::Parser;
use crate::recovery::{ErrorStrategy, Recognizer};
use contracts_core::{
    ArithmeticKind, Ast, BitwiseKind, ClassName, EqualityKind, LogicalKind, Node, NodeId,
    Position, RelationalKind, ShiftKind, UnaryKind,
};
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// Operator token to node kind, per operator family
#[derive(Debug)]
pub struct OperatorTables {
    pub logical: FxHashMap<TokenKind, LogicalKind>,
    pub bitwise: FxHashMap<TokenKind, BitwiseKind>,
    pub equality: FxHashMap<TokenKind, EqualityKind>,
    pub relational: FxHashMap<TokenKind, RelationalKind>,
    pub shift: FxHashMap<TokenKind, ShiftKind>,
    pub arithmetic: FxHashMap<TokenKind, ArithmeticKind>,
    pub unary: FxHashMap<TokenKind, UnaryKind>,
}

pub static OPERATOR_TABLES: Lazy<OperatorTables> = Lazy::new(OperatorTables::new);

impl OperatorTables {
    fn new() -> Self {
        use TokenKind::*;
        Self {
            logical: [(OrOr, LogicalKind::Or), (AndAnd, LogicalKind::And)]
                .into_iter()
                .collect(),
            bitwise: [
                (Pipe, BitwiseKind::Or),
                (Caret, BitwiseKind::Xor),
                (Amp, BitwiseKind::And),
            ]
            .into_iter()
            .collect(),
            equality: [(EqEq, EqualityKind::Equal), (NotEq, EqualityKind::NotEqual)]
                .into_iter()
                .collect(),
            relational: [
                (Gt, RelationalKind::Gt),
                (Ge, RelationalKind::Ge),
                (Lt, RelationalKind::Lt),
                (Le, RelationalKind::Le),
            ]
            .into_iter()
            .collect(),
            shift: [
                (Shl, ShiftKind::Left),
                (Shr, ShiftKind::Right),
                (Ushr, ShiftKind::UnsignedRight),
            ]
            .into_iter()
            .collect(),
            arithmetic: [
                (Plus, ArithmeticKind::Add),
                (Minus, ArithmeticKind::Sub),
                (Star, ArithmeticKind::Mul),
                (Slash, ArithmeticKind::Div),
                (Percent, ArithmeticKind::Mod),
            ]
            .into_iter()
            .collect(),
            unary: [
                (Plus, UnaryKind::Pos),
                (Minus, UnaryKind::Neg),
                (Tilde, UnaryKind::BitwiseNot),
                (Bang, UnaryKind::LogicalNot),
            ]
            .into_iter()
            .collect(),
        }
    }

    /// Binary node for `operator`, or `None` if it is not in `family`
    pub fn binary(
        &self,
        family: OperatorFamily,
        operator: TokenKind,
        left: NodeId,
        right: NodeId,
    ) -> Option<Node> {
        match family {
            OperatorFamily::Logical => self
                .logical
                .get(&operator)
                .map(|&kind| Node::LogicalOp { kind, left, right }),
            OperatorFamily::Bitwise => self
                .bitwise
                .get(&operator)
                .map(|&kind| Node::BitwiseOp { kind, left, right }),
            OperatorFamily::Equality => self
                .equality
                .get(&operator)
                .map(|&kind| Node::EqualityOp { kind, left, right }),
            OperatorFamily::Relational => self
                .relational
                .get(&operator)
                .map(|&kind| Node::RelationalOp { kind, left, right }),
            OperatorFamily::Shift => self
                .shift
                .get(&operator)
                .map(|&kind| Node::ShiftOp { kind, left, right }),
            OperatorFamily::Arithmetic => self
                .arithmetic
                .get(&operator)
                .map(|&kind| Node::ArithmeticOp { kind, left, right }),
        }
    }

    pub fn unary(&self, operator: TokenKind, operand: NodeId) -> Option<Node> {
        self.unary
            .get(&operator)
            .map(|&kind| Node::UnaryOp { kind, operand })
    }
}

/// Parse listener that builds the AST
#[derive(Debug, Default)]
pub struct TreeBuilder {
    ast: Ast,
    failure: Option<ParseError>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser over `lexed` with this builder as its listener and
    /// the parser's error strategy wrapped in a [`BuilderErrorStrategy`]
    pub fn install(self, lexed: Lexed<'_>) -> Parser<'_, TreeBuilder> {
        let mut parser = Parser::new(lexed, self);
        parser.wrap_error_strategy(|inner| Box::new(BuilderErrorStrategy::new(inner)));
        parser
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// The built tree, or the first inconsistency met while building it
    pub fn finish(self) -> Result<Ast, ParseError> {
        match self.failure {
            Some(failure) => Err(failure),
            None => Ok(self.ast),
        }
    }

    fn build(&mut self, ctx: &RuleContext<'_>) -> Result<Option<NodeId>, ParseError> {
        let position = ctx.start.position;
        let id = match ctx.rule {
            Rule::Clause => self.clause(ctx)?,
            Rule::Precondition | Rule::Postcondition | Rule::GuardedBody => {
                self.top_level(ctx)?
            }
            Rule::GuardedExpression => {
                let [condition, expression] = nodes(ctx)?;
                self.add(
                    position,
                    Node::IfExpression {
                        condition,
                        expression,
                    },
                )?
            }
            Rule::FinallyExpression => {
                let [expression] = nodes(ctx)?;
                self.add(
                    position,
                    Node::Assertion {
                        expression,
                        is_finally: true,
                    },
                )?
            }
            Rule::ThrowExpression => self.throw(ctx)?,
            // Consumed by their parent rule
            Rule::ClassRef
            | Rule::FieldSelector
            | Rule::MethodSelector
            | Rule::IndexSelector => return Ok(None),
            Rule::Implication => {
                let [condition, implied] = nodes(ctx)?;
                let position = self.ast.position(condition).unwrap_or(position);
                self.add(position, Node::Imply { condition, implied })?
            }
            Rule::Conditional => {
                let operator = first_token(ctx)?;
                let [condition, on_true, on_false] = nodes(ctx)?;
                self.add(
                    operator.position,
                    Node::ConditionalOp {
                        condition,
                        on_true,
                        on_false,
                    },
                )?
            }
            Rule::Binary(family) => {
                let operator = first_token(ctx)?;
                let [left, right] = nodes(ctx)?;
                let node = OPERATOR_TABLES
                    .binary(family, operator.kind, left, right)
                    .ok_or_else(|| unknown_operator(operator))?;
                self.add(operator.position, node)?
            }
            Rule::Unary => {
                let operator = first_token(ctx)?;
                let [operand] = nodes(ctx)?;
                let node = OPERATOR_TABLES
                    .unary(operator.kind, operand)
                    .ok_or_else(|| unknown_operator(operator))?;
                self.add(operator.position, node)?
            }
            Rule::Factor => self.factor(ctx)?,
            Rule::Identifier => {
                let name = first_token(ctx)?;
                self.add(
                    name.position,
                    Node::IdReference {
                        source: None,
                        identifier: name.text.to_string(),
                    },
                )?
            }
            Rule::Call => {
                let name = first_token(ctx)?;
                let arguments = ctx.child_nodes().ok_or_else(|| incomplete(ctx))?;
                self.add(
                    name.position,
                    Node::MethodCall {
                        source: None,
                        name: name.text.to_string(),
                        arguments,
                    },
                )?
            }
            Rule::Parenthesized => {
                let [inner] = nodes(ctx)?;
                inner
            }
            Rule::Literal => {
                let token = first_token(ctx)?;
                literal_node(&mut self.ast, token)?
            }
        };
        Ok(Some(id))
    }

    fn add(&mut self, position: Position, node: Node) -> Result<NodeId, ParseError> {
        Ok(self.ast.add_node(position, node)?)
    }

    /// Positioned at the precondition, else at `=>`, else at the clause start
    fn clause(&mut self, ctx: &RuleContext<'_>) -> Result<NodeId, ParseError> {
        let precondition = ctx
            .children_of(Rule::Precondition)
            .next()
            .map(|c| c.node.ok_or_else(|| incomplete(c)))
            .transpose()?;
        let postconditions = ctx
            .children_of(Rule::Postcondition)
            .map(|c| c.node.ok_or_else(|| incomplete(c)))
            .collect::<Result<Vec<_>, _>>()?;
        let position = precondition
            .and_then(|id| self.ast.position(id))
            .or_else(|| ctx.token(TokenKind::Arrow).map(|t| t.position))
            .unwrap_or(ctx.start.position);
        self.add(
            position,
            Node::Clause {
                precondition,
                postconditions,
            },
        )
    }

    /// Plain expressions become assertions; the other forms stand alone
    fn top_level(&mut self, ctx: &RuleContext<'_>) -> Result<NodeId, ParseError> {
        let form = ctx.child(0).ok_or_else(|| incomplete(ctx))?;
        let id = form.node.ok_or_else(|| incomplete(form))?;
        match form.rule {
            Rule::FinallyExpression | Rule::ThrowExpression | Rule::GuardedExpression => Ok(id),
            _ => {
                let position = self.ast.position(id).unwrap_or(form.start.position);
                self.add(
                    position,
                    Node::Assertion {
                        expression: id,
                        is_finally: false,
                    },
                )
            }
        }
    }

    fn throw(&mut self, ctx: &RuleContext<'_>) -> Result<NodeId, ParseError> {
        let class_ref = ctx
            .children_of(Rule::ClassRef)
            .next()
            .ok_or_else(|| incomplete(ctx))?;
        let segments: Vec<&str> = class_ref.tokens.iter().map(|t| t.text).collect();
        let variable = ctx
            .token(TokenKind::Identifier)
            .map(|t| t.text.to_string());
        let expression = ctx
            .children
            .iter()
            .find(|c| c.rule != Rule::ClassRef)
            .map(|c| c.node.ok_or_else(|| incomplete(c)))
            .transpose()?;

        match ClassName::for_binary(&segments.join(".")) {
            Ok(exception) if exception.is_primitive() => Ok(self.ast.add_blank(
                class_ref.start.position,
                format!("primitive type {exception} cannot be thrown"),
            )?),
            Ok(exception) => self.add(
                ctx.start.position,
                Node::Throw {
                    exception,
                    variable,
                    expression,
                },
            ),
            Err(err) => Ok(self.ast.add_blank(class_ref.start.position, err.to_string())?),
        }
    }

    /// Folds selectors left to right onto the primary
    fn factor(&mut self, ctx: &RuleContext<'_>) -> Result<NodeId, ParseError> {
        let mut children = ctx.children.iter();
        let primary = children.next().ok_or_else(|| incomplete(ctx))?;
        let mut current = primary.node.ok_or_else(|| incomplete(primary))?;

        for selector in children {
            let token = first_token(selector)?;
            let node = match selector.rule {
                Rule::FieldSelector => Node::IdReference {
                    source: Some(current),
                    identifier: token.text.to_string(),
                },
                Rule::MethodSelector => Node::MethodCall {
                    source: Some(current),
                    name: token.text.to_string(),
                    arguments: selector.child_nodes().ok_or_else(|| incomplete(selector))?,
                },
                Rule::IndexSelector => {
                    let [index] = nodes(selector)?;
                    Node::ArrayAccess {
                        source: current,
                        index,
                    }
                }
                _ => return Err(incomplete(selector)),
            };
            current = self.add(token.position, node)?;
        }
        Ok(current)
    }
}

impl ParseListener for TreeBuilder {
    fn exit_rule(&mut self, ctx: &mut RuleContext<'_>) {
        if self.failure.is_some() {
            return;
        }
        match self.build(ctx) {
            Ok(node) => ctx.node = node,
            Err(err) => {
                warn!(rule = ?ctx.rule, error = %err, "tree builder failed");
                self.failure = Some(err);
            }
        }
    }
}

fn nodes<const N: usize>(ctx: &RuleContext<'_>) -> Result<[NodeId; N], ParseError> {
    let nodes = ctx.child_nodes().ok_or_else(|| incomplete(ctx))?;
    <[NodeId; N]>::try_from(nodes).map_err(|_| incomplete(ctx))
}

fn first_token<'c, 'a>(ctx: &'c RuleContext<'a>) -> Result<&'c Token<'a>, ParseError> {
    ctx.tokens.first().ok_or_else(|| incomplete(ctx))
}

fn incomplete(ctx: &RuleContext<'_>) -> ParseError {
    ParseError::Internal(format!(
        "{:?} rule at {} completed without its children",
        ctx.rule, ctx.start.position
    ))
}

fn unknown_operator(token: &Token<'_>) -> ParseError {
    ParseError::Internal(format!(
        "no operator mapping for {} at {}",
        token.kind, token.position
    ))
}

/// Detaches the tree builder on the first recovery, then delegates
pub struct BuilderErrorStrategy {
    inner: Box<dyn ErrorStrategy>,
}

impl BuilderErrorStrategy {
    pub fn new(inner: Box<dyn ErrorStrategy>) -> Self {
        Self { inner }
    }

    fn detach(recognizer: &mut dyn Recognizer) {
        if recognizer.is_listening() {
            debug!(
                position = %recognizer.current_token().position,
                "syntax error, detaching tree builder"
            );
            recognizer.remove_parse_listener();
        }
    }
}

impl ErrorStrategy for BuilderErrorStrategy {
    fn reset(&mut self, recognizer: &mut dyn Recognizer) {
        self.inner.reset(recognizer);
    }

    fn recover_inline(
        &mut self,
        recognizer: &mut dyn Recognizer,
        expected: TokenKind,
    ) -> Result<(), RecognitionError> {
        Self::detach(recognizer);
        self.inner.recover_inline(recognizer, expected)
    }

    fn recover(&mut self, recognizer: &mut dyn Recognizer, error: &RecognitionError) {
        Self::detach(recognizer);
        self.inner.recover(recognizer, error);
    }

    fn sync(&mut self, recognizer: &mut dyn Recognizer) {
        self.inner.sync(recognizer);
    }

    fn in_error_recovery_mode(&self) -> bool {
        self.inner.in_error_recovery_mode()
    }

    fn report_error(&mut self, recognizer: &mut dyn Recognizer, error: &RecognitionError) {
        self.inner.report_error(recognizer, error);
    }

    fn report_match(&mut self, recognizer: &mut dyn Recognizer) {
        self.inner.report_match(recognizer);
    }
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
