//! YAML application configuration: which statements to load and how,
//! plus the journal knobs passed straight to the core.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use kassa_core::CoreConfig;
use kassa_ingest::CsvLayout;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub statements: Vec<StatementSpec>,
    #[serde(default)]
    pub journal: CoreConfig,
}

/// One statement file and the account it belongs to.
#[derive(Debug, Clone, Deserialize)]
pub struct StatementSpec {
    pub path: PathBuf,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub account_number: String,
    pub account_currency: String,
    pub layout: CsvLayout,
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}
