//! Lexer for contract expressions using logos

use contracts_core::{Diagnostic, Position};
use logos::Logos;
use std::fmt;
use std::num::NonZeroU32;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    // Keywords
    #[token("finally", priority = 10)]
    Finally,
    #[token("throw", priority = 10)]
    Throw,
    #[token("as", priority = 10)]
    As,
    #[token("if", priority = 10)]
    If,
    #[token("true", priority = 10)]
    True,
    #[token("false", priority = 10)]
    False,
    #[token("null", priority = 10)]
    Null,

    // Punctuation
    #[token("=>")]
    Arrow,
    #[token(";")]
    Semicolon,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // Operators
    #[token("||")]
    OrOr,
    #[token("&&")]
    AndAnd,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("&")]
    Amp,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token(">>>")]
    Ushr,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("~")]
    Tilde,
    #[token("!")]
    Bang,

    // Literals
    #[regex(r"(0[xX][0-9a-fA-F]+|0[0-7]*|[1-9][0-9]*)[lL]?")]
    IntLiteral,

    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?[fFdD]?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?[fFdD]?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+[fFdD]?")]
    #[regex(r"[0-9]+[fFdD]")]
    FloatLiteral,

    #[regex(r#""([^"\\\r\n]|\\([btnfr"'\\]|u[0-9a-fA-F]{4}|[0-7]{1,3}))*""#)]
    #[regex(r#"'([^'\\\r\n]|\\([btnfr"'\\]|u[0-9a-fA-F]{4}|[0-7]{1,3}))*'"#)]
    StringLiteral,

    #[regex(r#"'([^'\\\r\n]|\\([btnfr"'\\]|u[0-9a-fA-F]{4}|[0-7]{1,3}))'c"#)]
    CharLiteral,

    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*")]
    Identifier,

    /// End of input; never produced by logos, appended by [`Lexer::tokenize`]
    Eof,
}

impl TokenKind {
    /// Human readable form used in diagnostics
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Finally => "'finally'",
            TokenKind::Throw => "'throw'",
            TokenKind::As => "'as'",
            TokenKind::If => "'if'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Null => "'null'",
            TokenKind::Arrow => "'=>'",
            TokenKind::Semicolon => "';'",
            TokenKind::Question => "'?'",
            TokenKind::Colon => "':'",
            TokenKind::Dot => "'.'",
            TokenKind::Comma => "','",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::OrOr => "'||'",
            TokenKind::AndAnd => "'&&'",
            TokenKind::Pipe => "'|'",
            TokenKind::Caret => "'^'",
            TokenKind::Amp => "'&'",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::Gt => "'>'",
            TokenKind::Ge => "'>='",
            TokenKind::Lt => "'<'",
            TokenKind::Le => "'<='",
            TokenKind::Shl => "'<<'",
            TokenKind::Shr => "'>>'",
            TokenKind::Ushr => "'>>>'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Tilde => "'~'",
            TokenKind::Bang => "'!'",
            TokenKind::IntLiteral => "INT",
            TokenKind::FloatLiteral => "FLOAT",
            TokenKind::StringLiteral => "STRING",
            TokenKind::CharLiteral => "CHAR",
            TokenKind::Identifier => "ID",
            TokenKind::Eof => "<EOF>",
        }
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::IntLiteral
                | TokenKind::FloatLiteral
                | TokenKind::StringLiteral
                | TokenKind::CharLiteral
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
    }

    /// Whether an expression may start with this token
    pub fn starts_expression(self) -> bool {
        self.is_literal()
            || matches!(
                self,
                TokenKind::Identifier
                    | TokenKind::LParen
                    | TokenKind::If
                    | TokenKind::Plus
                    | TokenKind::Minus
                    | TokenKind::Tilde
                    | TokenKind::Bang
            )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A token with its source text and position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub position: Position,
}

impl<'a> Token<'a> {
    /// Text for diagnostics; `<EOF>` for the end of input
    pub fn display_text(&self) -> &'a str {
        if self.kind == TokenKind::Eof {
            "<EOF>"
        } else {
            self.text
        }
    }
}

/// Result of tokenizing one expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexed<'a> {
    /// Always ends with an [`TokenKind::Eof`] token
    pub tokens: Vec<Token<'a>>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Turns byte offsets into line/column positions, moving forward only
struct LineTracker<'a> {
    source: &'a str,
    offset: usize,
    line: NonZeroU32,
    line_start: usize,
}

impl<'a> LineTracker<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            line: NonZeroU32::MIN,
            line_start: 0,
        }
    }

    fn position(&mut self, offset: usize) -> Position {
        let skipped = &self.source[self.offset..offset];
        for (i, ch) in skipped.char_indices() {
            if ch == '\n' {
                self.line = self.line.saturating_add(1);
                self.line_start = self.offset + i + 1;
            }
        }
        self.offset = offset;
        let column = self.source[self.line_start..offset].chars().count();
        Position::from_parts(self.line, u32::try_from(column).unwrap_or(u32::MAX))
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    origin: Option<Position>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            origin: None,
        }
    }

    /// Rebases every position on the position of the embedding declaration
    pub fn with_origin(mut self, origin: Position) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn tokenize(self) -> Lexed<'a> {
        let mut tracker = LineTracker::new(self.source);
        let mut tokens = Vec::new();
        let mut diagnostics = Vec::new();
        let rebase = |position: Position| match self.origin {
            Some(origin) => position.rebase(origin),
            None => position,
        };

        let mut inner = TokenKind::lexer(self.source);
        while let Some(result) = inner.next() {
            let span = inner.span();
            let position = rebase(tracker.position(span.start));
            match result {
                Ok(kind) => tokens.push(Token {
                    kind,
                    text: inner.slice(),
                    position,
                }),
                Err(()) => diagnostics.push(Diagnostic::new(
                    position,
                    format!("token recognition error at: '{}'", inner.slice()),
                )),
            }
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            text: "",
            position: rebase(tracker.position(self.source.len())),
        });
        Lexed {
            tokens,
            diagnostics,
        }
    }
}

/// Tokenizes `source` with positions relative to its first character
pub fn tokenize(source: &str) -> Lexed<'_> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
#[path = "lexer_tests.rs"]
mod tests;
