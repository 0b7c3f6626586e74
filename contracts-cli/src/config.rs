//! Configuration handling for the celc CLI

use anyhow::{Context, Result};
use contracts_classpool::BinderConfig;
use contracts_parser::CompilerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Class directories searched after the ones given on the command line
    #[serde(default)]
    pub classpath: Vec<PathBuf>,

    #[serde(default)]
    pub compiler: CompilerConfig,

    #[serde(default)]
    pub binder: BinderConfig,
}

/// Default location, `~/.contracts/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".contracts").join("config.toml"))
}

/// Load configuration from file or use defaults
///
/// An explicitly given file must exist; the default file is optional.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => read_config(&path),
        None => match default_config_path() {
            Some(path) if path.exists() => read_config(&path),
            _ => Ok(Config::default()),
        },
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}
