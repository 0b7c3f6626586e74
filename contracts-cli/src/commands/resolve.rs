//! `celc resolve`: look up a class and print its hierarchy

use super::class_pool;
use crate::config::Config;
use anyhow::{Context, Result};
use contracts_core::ClassName;
use std::fmt::Write;
use std::path::PathBuf;

pub fn render(binary_name: &str, classpath: &[PathBuf], config: &Config) -> Result<String> {
    let name = ClassName::for_binary(binary_name)?;
    let pool = class_pool(classpath, config);
    let class = pool
        .get(&name)
        .with_context(|| format!("Failed to resolve {binary_name}"))?;

    let mut output = String::new();
    let kind = if class.is_primitive() {
        "primitive"
    } else if class.is_array() {
        "array"
    } else if class.is_interface() {
        "interface"
    } else {
        "class"
    };
    writeln!(output, "{kind} {class}")?;
    writeln!(output, "  origin: {}", class.origin().unwrap_or("<synthesized>"))?;
    if let Some(component) = class.component_type() {
        writeln!(output, "  component: {component}")?;
    }
    for superclass in class.superclasses() {
        writeln!(output, "  extends {superclass}")?;
    }
    for interface in class.interfaces() {
        writeln!(output, "  implements {interface}")?;
    }
    Ok(output.trim_end().to_string())
}
