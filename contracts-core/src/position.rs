//! Source coordinates

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

/// A (line, column) coordinate inside a contract expression
///
/// Lines start at 1, columns at 0. Positions are ordered line first, then
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    line: NonZeroU32,
    column: u32,
}

impl Position {
    /// The first character of an expression
    pub const START: Position = Position {
        line: NonZeroU32::MIN,
        column: 0,
    };

    /// Creates a position, rejecting line numbers below 1
    pub fn new(line: u32, column: u32) -> Result<Self> {
        let line = NonZeroU32::new(line).ok_or(Error::InvalidPosition { line, column })?;
        Ok(Self { line, column })
    }

    /// Creates a position from an already validated line number
    pub const fn from_parts(line: NonZeroU32, column: u32) -> Self {
        Self { line, column }
    }

    pub fn line(&self) -> u32 {
        self.line.get()
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    /// Composes a position local to an embedded expression with the position
    /// of the declaration that embeds it
    ///
    /// On the first line the columns add up; later lines keep their own column
    /// and only the line number shifts.
    pub fn rebase(&self, base: Position) -> Position {
        if self.line.get() == 1 {
            Position {
                line: base.line,
                column: base.column.saturating_add(self.column),
            }
        } else {
            Position {
                line: base.line.saturating_add(self.line.get() - 1),
                column: self.column,
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
