//! Class resolution for contract expressions
//!
//! A [`ClassPool`] turns [`ClassName`](contracts_core::ClassName)s into
//! linked [`CtClass`] descriptions read from class file headers. Pools cache
//! what they resolve, delegate to an optional parent first and are safe to
//! share between threads. The [`TypeBinder`] uses a pool to annotate the
//! literals and thrown exceptions of a compiled clause.

pub mod binder;
pub mod class_file;
pub mod ct_class;
pub mod error;
pub mod pool;
pub mod source;

pub use binder::{BinderConfig, TypeBinder, RESOLVED_TYPE};
pub use class_file::ClassFileHeader;
pub use ct_class::CtClass;
pub use error::{ClassFormatError, NotFoundError, Result};
pub use pool::ClassPool;
pub use source::{ClassLocation, ClassSource, FileClassSource, MemoryClassSource};
