//! celc subcommands
//!
//! Each command renders its report as a string so the binary only prints.

pub mod check;
pub mod parse;
pub mod resolve;

use crate::config::Config;
use anyhow::{anyhow, Error};
use contracts_classpool::{ClassPool, FileClassSource};
use contracts_core::Diagnostic;
use std::path::PathBuf;

/// A pool over the command line directories followed by the configured ones
pub fn class_pool(classpath: &[PathBuf], config: &Config) -> ClassPool {
    ClassPool::with_sources(
        classpath
            .iter()
            .chain(&config.classpath)
            .map(FileClassSource::new),
    )
}

/// Error listing every diagnostic, one per line
pub fn diagnostics_error(what: &str, diagnostics: &[Diagnostic]) -> Error {
    let mut message = format!("{what} failed with {} error(s)", diagnostics.len());
    for diagnostic in diagnostics {
        message.push_str("\n  ");
        message.push_str(&diagnostic.to_string());
    }
    anyhow!(message)
}
