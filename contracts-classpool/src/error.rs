//! Class resolution error types

use contracts_core::{ClassName, IllegalClassNameError};
use std::io;
use thiserror::Error;

/// Type alias for class resolution results
pub type Result<T> = std::result::Result<T, NotFoundError>;

/// A class file header that cannot be read
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassFormatError {
    #[error("Bad magic number 0x{0:08X}")]
    BadMagic(u32),

    #[error("Unexpected end of class file while reading {0}")]
    Truncated(&'static str),

    #[error("Unknown constant pool tag {tag} at index {index}")]
    UnknownTag { tag: u8, index: u16 },

    #[error("Constant pool index {index} is not a valid {expected} entry")]
    BadConstant { index: u16, expected: &'static str },

    #[error("Invalid modified UTF-8 in constant pool entry {0}")]
    BadUtf8(u16),

    #[error(transparent)]
    IllegalName(#[from] IllegalClassNameError),
}

/// Failure to resolve a class
#[derive(Error, Debug)]
pub enum NotFoundError {
    /// No source knows the class
    #[error("Class {name} not found")]
    NotFound { name: ClassName },

    /// A source has bytes for the class but they are not a class file
    #[error("Malformed class file for {name}")]
    Malformed {
        name: ClassName,
        #[source]
        source: ClassFormatError,
    },

    /// A source failed while looking up or reading the class
    #[error("Error loading class {name}")]
    Io {
        name: ClassName,
        #[source]
        source: io::Error,
    },

    /// The class is its own supertype
    #[error("Circular class hierarchy involving {name}")]
    Circular { name: ClassName },

    /// The class file found for a name declares another class
    #[error("Class file for {expected} declares {found}")]
    Mismatch { expected: ClassName, found: ClassName },
}

impl NotFoundError {
    /// The class whose resolution failed
    pub fn name(&self) -> &ClassName {
        match self {
            NotFoundError::NotFound { name }
            | NotFoundError::Malformed { name, .. }
            | NotFoundError::Io { name, .. }
            | NotFoundError::Circular { name } => name,
            NotFoundError::Mismatch { expected, .. } => expected,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, NotFoundError::NotFound { .. })
    }
}
