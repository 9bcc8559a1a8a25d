//! Run configuration loaded from JSON, with CLI overrides applied on top.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::record::DEFAULT_RANK_COLUMN;
use crate::tabular::{ExportOptions, TabularFormat};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MobSortConfig {
    /// Header of the leading rank column on export.
    #[serde(default = "default_rank_column")]
    pub rank_column: String,

    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Optional JSONL decision trace.
    #[serde(default)]
    pub trace: Option<PathBuf>,

    /// Input format; inferred from the file extension when omitted.
    #[serde(default)]
    pub input_format: Option<TabularFormat>,

    /// Output format; inferred from the file extension when omitted.
    #[serde(default)]
    pub output_format: Option<TabularFormat>,
}

fn default_rank_column() -> String {
    DEFAULT_RANK_COLUMN.to_string()
}

fn default_log_filter() -> String {
    "mob_sort=info".to_string()
}

impl Default for MobSortConfig {
    fn default() -> Self {
        Self {
            rank_column: default_rank_column(),
            log_filter: default_log_filter(),
            trace: None,
            input_format: None,
            output_format: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl MobSortConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rank_column.trim().is_empty() {
            return Err(ConfigError::Invalid("rank_column must be non-empty".into()));
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Invalid("log_filter must be non-empty".into()));
        }
        Ok(())
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            rank_column: self.rank_column.clone(),
        }
    }
}

pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<MobSortConfig, ConfigError> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    let config: MobSortConfig = serde_json::from_str(&raw)?;
    config.validate()?;
    Ok(config)
}
