//! Recursive descent parser for contract clauses
//!
//! The parser builds [`RuleContext`] trees and reports every completed rule
//! to its [`ParseListener`]. It never builds AST nodes itself; that is the job
//! of the listener (see [`crate::builder::TreeBuilder`]).

use crate::context::{OperatorFamily, Rule, RuleContext};
use crate::error::RecognitionError;
use crate::lexer::{Lexed, Token, TokenKind};
use crate::listener::ParseListener;
use crate::recovery::{DefaultErrorStrategy, ErrorStrategy, Recognizer};
use contracts_core::{Diagnostic, Position};
use tracing::trace;

pub type RuleResult<'a> = Result<RuleContext<'a>, RecognitionError>;

/// Binary operator precedence levels, loosest first
const BINARY_LEVELS: &[(OperatorFamily, &[TokenKind])] = &[
    (OperatorFamily::Logical, &[TokenKind::OrOr]),
    (OperatorFamily::Logical, &[TokenKind::AndAnd]),
    (OperatorFamily::Bitwise, &[TokenKind::Pipe]),
    (OperatorFamily::Bitwise, &[TokenKind::Caret]),
    (OperatorFamily::Bitwise, &[TokenKind::Amp]),
    (OperatorFamily::Equality, &[TokenKind::EqEq, TokenKind::NotEq]),
    (
        OperatorFamily::Relational,
        &[TokenKind::Gt, TokenKind::Ge, TokenKind::Lt, TokenKind::Le],
    ),
    (
        OperatorFamily::Shift,
        &[TokenKind::Shl, TokenKind::Shr, TokenKind::Ushr],
    ),
    (OperatorFamily::Arithmetic, &[TokenKind::Plus, TokenKind::Minus]),
    (
        OperatorFamily::Arithmetic,
        &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
    ),
];

const UNARY_OPERATORS: &[TokenKind] = &[
    TokenKind::Plus,
    TokenKind::Minus,
    TokenKind::Tilde,
    TokenKind::Bang,
];

/// Buffered tokens plus the state error strategies may inspect or change
#[derive(Debug)]
pub struct TokenStream<'a> {
    tokens: Vec<Token<'a>>,
    index: usize,
    expected: Vec<TokenKind>,
    diagnostics: Vec<Diagnostic>,
    listening: bool,
}

impl<'a> TokenStream<'a> {
    fn new(lexed: Lexed<'a>) -> Self {
        let mut tokens = lexed.tokens;
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let position = tokens.last().map_or(Position::START, |t| t.position);
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: "",
                position,
            });
        }
        Self {
            tokens,
            index: 0,
            expected: Vec::new(),
            diagnostics: lexed.diagnostics,
            listening: true,
        }
    }

    fn lt(&self, k: usize) -> Token<'a> {
        let i = (self.index + k.max(1) - 1).min(self.tokens.len() - 1);
        self.tokens[i]
    }

    fn peek(&self) -> Token<'a> {
        self.lt(1)
    }
}

impl Recognizer for TokenStream<'_> {
    fn la(&self, k: usize) -> TokenKind {
        self.lt(k).kind
    }

    fn current_token(&self) -> Token<'_> {
        self.peek()
    }

    fn index(&self) -> usize {
        self.index
    }

    fn consume(&mut self) {
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
    }

    fn expected(&self) -> &[TokenKind] {
        &self.expected
    }

    fn notify_error(&mut self, position: Position, message: String) {
        trace!(%position, %message, "syntax error");
        self.diagnostics.push(Diagnostic::new(position, message));
    }

    fn remove_parse_listener(&mut self) {
        self.listening = false;
    }

    fn is_listening(&self) -> bool {
        self.listening
    }
}

pub struct Parser<'a, L> {
    input: TokenStream<'a>,
    listener: L,
    strategy: Box<dyn ErrorStrategy>,
    /// Current parsing depth to prevent stack overflow
    depth: usize,
    max_depth: usize,
}

impl<'a, L: ParseListener> Parser<'a, L> {
    /// Default maximum expression nesting
    pub const DEFAULT_MAX_DEPTH: usize = 100;

    /// Creates a parser over `lexed`; lexer diagnostics are kept and returned
    /// by [`Parser::finish`] ahead of the syntax errors
    pub fn new(lexed: Lexed<'a>, listener: L) -> Self {
        Self {
            input: TokenStream::new(lexed),
            listener,
            strategy: Box::new(DefaultErrorStrategy::new()),
            depth: 0,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Replaces the error strategy with one built from the current strategy
    pub fn wrap_error_strategy<F>(&mut self, wrap: F)
    where
        F: FnOnce(Box<dyn ErrorStrategy>) -> Box<dyn ErrorStrategy>,
    {
        let current = std::mem::replace(
            &mut self.strategy,
            Box::new(DefaultErrorStrategy::new()),
        );
        self.strategy = wrap(current);
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Whether rule events still reach the listener
    pub fn is_listening(&self) -> bool {
        self.input.listening
    }

    /// Diagnostics reported so far, lexical ones first
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.input.diagnostics
    }

    pub fn finish(self) -> (L, Vec<Diagnostic>) {
        (self.listener, self.input.diagnostics)
    }

    /// clause : topLevel? ('=>' topLevel (';' topLevel)*)? EOF
    pub fn parse_clause(&mut self) -> RuleContext<'a> {
        self.strategy.reset(&mut self.input);
        let start = self.input.peek();
        let mut ctx = RuleContext::new(Rule::Clause, start);
        if let Err(err) = self.clause_body(&mut ctx) {
            self.report_and_recover(&err);
        }
        self.exit(&mut ctx);
        ctx
    }

    fn clause_body(&mut self, ctx: &mut RuleContext<'a>) -> Result<(), RecognitionError> {
        if !matches!(self.la(), TokenKind::Arrow | TokenKind::Eof) {
            ctx.children.push(self.top_level(Rule::Precondition));
        }
        self.sync(&[TokenKind::Arrow, TokenKind::Eof]);
        if self.la() == TokenKind::Arrow {
            ctx.tokens.push(self.accept());
            ctx.children.push(self.top_level(Rule::Postcondition));
            loop {
                self.sync(&[TokenKind::Semicolon, TokenKind::Eof]);
                if self.la() != TokenKind::Semicolon {
                    break;
                }
                self.accept();
                ctx.children.push(self.top_level(Rule::Postcondition));
            }
        }
        self.expect(TokenKind::Eof)?;
        Ok(())
    }

    // ===== Top-level forms =====

    /// A precondition, postcondition or guarded body; catches its own errors
    fn top_level(&mut self, rule: Rule) -> RuleContext<'a> {
        let mut ctx = RuleContext::new(rule, self.input.peek());
        match self.top_level_form() {
            Ok(form) => ctx.children.push(form),
            Err(err) => self.report_and_recover(&err),
        }
        self.exit(&mut ctx);
        ctx
    }

    fn top_level_form(&mut self) -> RuleResult<'a> {
        match self.la() {
            TokenKind::Finally => {
                let mut ctx = RuleContext::new(Rule::FinallyExpression, self.input.peek());
                ctx.tokens.push(self.accept());
                ctx.children.push(self.expression()?);
                Ok(self.complete(ctx))
            }
            TokenKind::Throw => self.throw_expression(),
            TokenKind::If => self.if_form(true),
            _ => self.expression(),
        }
    }

    /// 'throw' classRef ('as' ID)? expression?
    fn throw_expression(&mut self) -> RuleResult<'a> {
        let mut ctx = RuleContext::new(Rule::ThrowExpression, self.input.peek());
        ctx.tokens.push(self.expect(TokenKind::Throw)?);
        ctx.children.push(self.class_ref()?);
        if self.la() == TokenKind::As {
            self.accept();
            ctx.tokens.push(self.expect(TokenKind::Identifier)?);
        }
        if self.la().starts_expression() {
            ctx.children.push(self.expression()?);
        }
        Ok(self.complete(ctx))
    }

    /// ID ('.' ID)*
    fn class_ref(&mut self) -> RuleResult<'a> {
        let mut ctx = RuleContext::new(Rule::ClassRef, self.input.peek());
        ctx.tokens.push(self.expect(TokenKind::Identifier)?);
        while self.la() == TokenKind::Dot {
            self.accept();
            ctx.tokens.push(self.expect(TokenKind::Identifier)?);
        }
        Ok(self.complete(ctx))
    }

    /// 'if' '(' expression ')' followed by a guarded top-level form when
    /// `top_level` allows one, otherwise by the implied expression
    fn if_form(&mut self, top_level: bool) -> RuleResult<'a> {
        let start = self.input.peek();
        let if_token = self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        let condition = self.expression()?;
        self.expect(TokenKind::RParen)?;

        let guarded = top_level
            && matches!(
                self.la(),
                TokenKind::Throw | TokenKind::Finally | TokenKind::If
            );
        let mut ctx = if guarded {
            let mut ctx = RuleContext::new(Rule::GuardedExpression, start);
            let body = self.top_level(Rule::GuardedBody);
            ctx.children = vec![condition, body];
            ctx
        } else {
            let mut ctx = RuleContext::new(Rule::Implication, start);
            let implied = self.expression()?;
            ctx.children = vec![condition, implied];
            ctx
        };
        ctx.tokens.push(if_token);
        Ok(self.complete(ctx))
    }

    // ===== Expressions =====

    fn expression(&mut self) -> RuleResult<'a> {
        self.enter_recursion()?;
        let result = if self.la() == TokenKind::If {
            self.if_form(false)
        } else {
            self.conditional()
        };
        self.exit_recursion();
        result
    }

    /// binary ('?' expression ':' conditional)?
    fn conditional(&mut self) -> RuleResult<'a> {
        let condition = self.binary(0)?;
        if self.la() != TokenKind::Question {
            return Ok(condition);
        }
        let mut ctx = RuleContext::new(Rule::Conditional, condition.start);
        ctx.tokens.push(self.accept());
        let on_true = self.expression()?;
        self.expect(TokenKind::Colon)?;
        self.enter_recursion()?;
        let on_false = self.conditional();
        self.exit_recursion();
        ctx.children = vec![condition, on_true, on_false?];
        Ok(self.complete(ctx))
    }

    /// Left-associative binary operators from `BINARY_LEVELS[level]` on
    fn binary(&mut self, level: usize) -> RuleResult<'a> {
        let Some(&(family, operators)) = BINARY_LEVELS.get(level) else {
            return self.unary();
        };
        let depth = self.depth;
        let result = self.binary_chain(level, family, operators);
        self.depth = depth;
        result
    }

    /// Each fold nests the chain one level deeper and counts against the limit
    fn binary_chain(
        &mut self,
        level: usize,
        family: OperatorFamily,
        operators: &[TokenKind],
    ) -> RuleResult<'a> {
        let mut left = self.binary(level + 1)?;
        while operators.contains(&self.la()) {
            self.enter_recursion()?;
            let operator = self.accept();
            let right = self.binary(level + 1)?;
            let mut ctx = RuleContext::new(Rule::Binary(family), left.start);
            ctx.tokens.push(operator);
            ctx.children = vec![left, right];
            left = self.complete(ctx);
        }
        Ok(left)
    }

    fn unary(&mut self) -> RuleResult<'a> {
        if !UNARY_OPERATORS.contains(&self.la()) {
            return self.factor();
        }
        let mut ctx = RuleContext::new(Rule::Unary, self.input.peek());
        ctx.tokens.push(self.accept());
        self.enter_recursion()?;
        let operand = self.unary();
        self.exit_recursion();
        ctx.children.push(operand?);
        Ok(self.complete(ctx))
    }

    /// primary ('.' ID arguments? | '[' expression ']')*
    fn factor(&mut self) -> RuleResult<'a> {
        let primary = self.primary()?;
        if !matches!(self.la(), TokenKind::Dot | TokenKind::LBracket) {
            return Ok(primary);
        }
        let depth = self.depth;
        let result = self.selectors(primary);
        self.depth = depth;
        result
    }

    /// Every selector wraps the receiver built so far, so each one counts
    /// against the nesting limit
    fn selectors(&mut self, primary: RuleContext<'a>) -> RuleResult<'a> {
        let mut ctx = RuleContext::new(Rule::Factor, primary.start);
        ctx.children.push(primary);
        loop {
            if matches!(self.la(), TokenKind::Dot | TokenKind::LBracket) {
                self.enter_recursion()?;
            }
            let selector = match self.la() {
                TokenKind::Dot => {
                    let start = self.accept();
                    let name = self.expect(TokenKind::Identifier)?;
                    let mut selector = if self.la() == TokenKind::LParen {
                        let mut selector = RuleContext::new(Rule::MethodSelector, start);
                        self.arguments(&mut selector)?;
                        selector
                    } else {
                        RuleContext::new(Rule::FieldSelector, start)
                    };
                    selector.tokens.insert(0, name);
                    selector
                }
                TokenKind::LBracket => {
                    let mut selector = RuleContext::new(Rule::IndexSelector, self.input.peek());
                    selector.tokens.push(self.accept());
                    selector.children.push(self.expression()?);
                    self.expect(TokenKind::RBracket)?;
                    selector
                }
                _ => break,
            };
            let selector = self.complete(selector);
            ctx.children.push(selector);
        }
        Ok(self.complete(ctx))
    }

    fn primary(&mut self) -> RuleResult<'a> {
        let token = self.input.peek();
        match token.kind {
            kind if kind.is_literal() => {
                let mut ctx = RuleContext::new(Rule::Literal, token);
                ctx.tokens.push(self.accept());
                Ok(self.complete(ctx))
            }
            TokenKind::Identifier => {
                let name = self.accept();
                let mut ctx = if self.la() == TokenKind::LParen {
                    let mut ctx = RuleContext::new(Rule::Call, token);
                    self.arguments(&mut ctx)?;
                    ctx
                } else {
                    RuleContext::new(Rule::Identifier, token)
                };
                ctx.tokens.insert(0, name);
                Ok(self.complete(ctx))
            }
            TokenKind::LParen => self.parenthesized(),
            _ => Err(RecognitionError::no_viable_alternative(&token)),
        }
    }

    /// '(' expression ')'; errors inside are recovered at the closing paren
    fn parenthesized(&mut self) -> RuleResult<'a> {
        let mut ctx = RuleContext::new(Rule::Parenthesized, self.input.peek());
        self.accept();
        match self.expression() {
            Ok(inner) => ctx.children.push(inner),
            Err(err) => self.report_and_recover(&err),
        }
        self.expect(TokenKind::RParen)?;
        Ok(self.complete(ctx))
    }

    /// '(' (expression (',' expression)*)? ')' into `ctx.children`
    fn arguments(&mut self, ctx: &mut RuleContext<'a>) -> Result<(), RecognitionError> {
        self.expect(TokenKind::LParen)?;
        if self.la() != TokenKind::RParen {
            ctx.children.push(self.expression()?);
            while self.la() == TokenKind::Comma {
                self.accept();
                ctx.children.push(self.expression()?);
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(())
    }

    // ===== Plumbing =====

    fn la(&self) -> TokenKind {
        self.input.la(1)
    }

    /// Consumes the current token, known to be acceptable
    fn accept(&mut self) -> Token<'a> {
        let token = self.input.peek();
        self.strategy.report_match(&mut self.input);
        self.input.consume();
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'a>, RecognitionError> {
        let token = self.input.peek();
        if token.kind == kind {
            return Ok(self.accept());
        }
        self.strategy.recover_inline(&mut self.input, kind)?;
        // Repaired in place: stand in for the token that was expected
        Ok(Token {
            kind,
            text: "",
            position: token.position,
        })
    }

    fn sync(&mut self, expected: &[TokenKind]) {
        self.input.expected.clear();
        self.input.expected.extend_from_slice(expected);
        self.strategy.sync(&mut self.input);
    }

    fn report_and_recover(&mut self, err: &RecognitionError) {
        self.strategy.report_error(&mut self.input, err);
        self.strategy.recover(&mut self.input, err);
    }

    fn exit(&mut self, ctx: &mut RuleContext<'a>) {
        if self.input.listening {
            self.listener.exit_rule(ctx);
        }
    }

    fn complete(&mut self, mut ctx: RuleContext<'a>) -> RuleContext<'a> {
        self.exit(&mut ctx);
        ctx
    }

    fn enter_recursion(&mut self) -> Result<(), RecognitionError> {
        if self.depth >= self.max_depth {
            return Err(RecognitionError::too_deep(
                &self.input.peek(),
                self.max_depth,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn exit_recursion(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
