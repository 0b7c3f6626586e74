//! Decoding of literal token text into typed values
//!
//! Integers follow Java rules: an `L` suffix makes a long, `0x` selects hex
//! and a leading `0` octal. Strings are decoded into UTF-16 code units first
//! so that `\uXXXX` escapes may form surrogate pairs.

use crate::lexer::{Token, TokenKind};
use contracts_core::{Ast, Literal, LiteralValue, Node, NodeId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    #[error("integer/long literal out of range: {0}")]
    OutOfRange(String),

    #[error("malformed floating point literal: {0}")]
    MalformedFloat(String),

    #[error("string literal is not valid UTF-16: {0}")]
    InvalidUtf16(String),

    #[error("char literal must denote exactly one character: {0}")]
    NotOneChar(String),

    #[error("{0} is not a literal token")]
    NotALiteral(String),
}

pub fn decode_integer(text: &str) -> Result<LiteralValue, LiteralError> {
    let (digits, long) = match text.strip_suffix(['l', 'L']) {
        Some(digits) => (digits, true),
        None => (text, false),
    };
    let (digits, radix) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (hex, 16)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (&digits[1..], 8)
    } else {
        (digits, 10)
    };

    let out_of_range = || LiteralError::OutOfRange(text.to_string());
    if long {
        i64::from_str_radix(digits, radix)
            .map(LiteralValue::Long)
            .map_err(|_| out_of_range())
    } else {
        i32::from_str_radix(digits, radix)
            .map(LiteralValue::Int)
            .map_err(|_| out_of_range())
    }
}

/// `f`/`F` selects float, `d`/`D` or no suffix double
pub fn decode_float(text: &str) -> Result<LiteralValue, LiteralError> {
    let malformed = |_| LiteralError::MalformedFloat(text.to_string());
    if let Some(body) = text.strip_suffix(['f', 'F']) {
        return body.parse::<f32>().map(LiteralValue::Float).map_err(malformed);
    }
    let body = text.strip_suffix(['d', 'D']).unwrap_or(text);
    body.parse::<f64>().map(LiteralValue::Double).map_err(malformed)
}

/// Decodes escape sequences in a string or char body into UTF-16 units
pub fn unescape(body: &str) -> Vec<u16> {
    let mut units = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    let mut buf = [0u16; 2];

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            units.extend_from_slice(ch.encode_utf16(&mut buf));
            continue;
        }
        let Some(escape) = chars.next() else {
            units.push(u16::from(b'\\'));
            break;
        };
        match escape {
            'b' => units.push(0x08),
            't' => units.push(0x09),
            'n' => units.push(0x0A),
            'f' => units.push(0x0C),
            'r' => units.push(0x0D),
            'u' => {
                let mut value: u16 = 0;
                for _ in 0..4 {
                    match chars.peek().and_then(|c| c.to_digit(16)) {
                        Some(digit) => {
                            chars.next();
                            value = (value << 4) | digit as u16;
                        }
                        None => break,
                    }
                }
                units.push(value);
            }
            '0'..='7' => {
                let mut value = escape.to_digit(8).unwrap_or(0);
                // At most three digits, and only two if the first is 4..=7
                for read in 1..3 {
                    if read == 2 && value >= 32 {
                        break;
                    }
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            chars.next();
                            value = value * 8 + digit;
                        }
                        None => break,
                    }
                }
                units.push(value as u16);
            }
            other => units.extend_from_slice(other.encode_utf16(&mut buf)),
        }
    }
    units
}

/// Decodes a quoted string token (`"..."` or `'...'`)
pub fn decode_string(text: &str) -> Result<LiteralValue, LiteralError> {
    let body = text
        .get(1..text.len().saturating_sub(1))
        .unwrap_or_default();
    String::from_utf16(&unescape(body))
        .map(LiteralValue::String)
        .map_err(|_| LiteralError::InvalidUtf16(text.to_string()))
}

/// Decodes a char token (`'x'c`)
pub fn decode_char(text: &str) -> Result<LiteralValue, LiteralError> {
    let body = text
        .get(1..text.len().saturating_sub(2))
        .unwrap_or_default();
    match unescape(body).as_slice() {
        [unit] => char::from_u32(u32::from(*unit))
            .map(LiteralValue::Char)
            .ok_or_else(|| LiteralError::NotOneChar(text.to_string())),
        _ => Err(LiteralError::NotOneChar(text.to_string())),
    }
}

pub fn decode(kind: TokenKind, text: &str) -> Result<Literal, LiteralError> {
    let value = match kind {
        TokenKind::IntLiteral => decode_integer(text)?,
        TokenKind::FloatLiteral => decode_float(text)?,
        TokenKind::StringLiteral => decode_string(text)?,
        TokenKind::CharLiteral => decode_char(text)?,
        TokenKind::True => LiteralValue::Boolean(true),
        TokenKind::False => LiteralValue::Boolean(false),
        TokenKind::Null => LiteralValue::Null,
        other => return Err(LiteralError::NotALiteral(other.to_string())),
    };
    Ok(Literal::from(value))
}

/// Adds the literal for `token` to `ast`
///
/// A token that cannot be decoded becomes a blank node carrying the reason
/// as a diagnostic; compilation then fails with that diagnostic.
pub fn literal_node(ast: &mut Ast, token: &Token<'_>) -> contracts_core::Result<NodeId> {
    match decode(token.kind, token.text) {
        Ok(literal) => ast.add_node(token.position, Node::Literal(literal)),
        Err(err) => ast.add_blank(token.position, err.to_string()),
    }
}
