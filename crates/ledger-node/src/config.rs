//! Driver configuration: an optional TOML file, overridden by command-line flags.

use anyhow::{ensure, Context, Result};
use clap::ValueEnum;
use ledger_core::constants::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY};
use ledger_core::MiningMode;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "ledger.toml";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// `<data_dir>/chain.json`
    #[default]
    File,
    /// sled database in `<data_dir>`
    Sled,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub data_dir: PathBuf,
    pub store: StoreKind,
    /// Used only when a new chain is created; a loaded chain keeps its own.
    pub difficulty: u32,
    pub mining: MiningMode,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            store: StoreKind::default(),
            difficulty: DEFAULT_DIFFICULTY,
            mining: MiningMode::default(),
        }
    }
}

impl NodeConfig {
    /// Reads `path`, or `ledger.toml` if present, or falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Path::new(DEFAULT_CONFIG_FILE),
            None => return Ok(Self::default()),
        };
        let text =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.difficulty <= MAX_DIFFICULTY,
            "difficulty {} exceeds the {MAX_DIFFICULTY} hex digits of a block hash",
            self.difficulty
        );
        ensure!(
            !self.data_dir.as_os_str().is_empty(),
            "data_dir must not be empty"
        );
        Ok(())
    }
}
