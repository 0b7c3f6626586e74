//! Typed literal values

use crate::class_name::ClassName;
use crate::error::{Error, Result};
use crate::kinds::LiteralKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A decoded literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum LiteralValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(String),
    Char(char),
    Null,
}

impl LiteralValue {
    /// The only literal kind this value is valid for
    pub fn kind(&self) -> LiteralKind {
        match self {
            LiteralValue::Int(_) => LiteralKind::Int,
            LiteralValue::Long(_) => LiteralKind::Long,
            LiteralValue::Float(_) => LiteralKind::Float,
            LiteralValue::Double(_) => LiteralKind::Double,
            LiteralValue::Boolean(_) => LiteralKind::Boolean,
            LiteralValue::String(_) => LiteralKind::String,
            LiteralValue::Char(_) => LiteralKind::Char,
            LiteralValue::Null => LiteralKind::Null,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Int(v) => write!(f, "{v}"),
            LiteralValue::Long(v) => write!(f, "{v}L"),
            LiteralValue::Float(v) => write!(f, "{v:?}f"),
            LiteralValue::Double(v) => write!(f, "{v:?}"),
            LiteralValue::Boolean(v) => write!(f, "{v}"),
            LiteralValue::String(v) => write!(f, "{v:?}"),
            LiteralValue::Char(v) => write!(f, "{v:?}"),
            LiteralValue::Null => f.write_str("null"),
        }
    }
}

impl LiteralKind {
    /// The platform type of literals of this kind
    pub fn class_name(self) -> ClassName {
        match self {
            LiteralKind::Int => ClassName::INT,
            LiteralKind::Long => ClassName::LONG,
            LiteralKind::Float => ClassName::FLOAT,
            LiteralKind::Double => ClassName::DOUBLE,
            LiteralKind::Boolean => ClassName::BOOLEAN,
            LiteralKind::String => ClassName::STRING,
            LiteralKind::Char => ClassName::CHAR,
            LiteralKind::Null => ClassName::OBJECT,
        }
    }
}

/// A literal whose value is guaranteed to match its kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LiteralRepr")]
pub struct Literal {
    kind: LiteralKind,
    value: LiteralValue,
}

/// Unchecked wire form of [`Literal`]
#[derive(Deserialize)]
struct LiteralRepr {
    kind: LiteralKind,
    value: LiteralValue,
}

impl TryFrom<LiteralRepr> for Literal {
    type Error = Error;

    fn try_from(repr: LiteralRepr) -> Result<Self> {
        Literal::new(repr.kind, repr.value)
    }
}

impl Literal {
    pub fn new(kind: LiteralKind, value: LiteralValue) -> Result<Self> {
        if value.kind() != kind {
            return Err(Error::IncompatibleLiteral {
                kind,
                found: value.to_string(),
            });
        }
        Ok(Self { kind, value })
    }

    pub fn kind(&self) -> LiteralKind {
        self.kind
    }

    pub fn value(&self) -> &LiteralValue {
        &self.value
    }

    pub fn class_name(&self) -> ClassName {
        self.kind.class_name()
    }
}

impl From<LiteralValue> for Literal {
    fn from(value: LiteralValue) -> Self {
        Self {
            kind: value.kind(),
            value,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}
