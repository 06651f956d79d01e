//! `lawdelta.toml` loading
//!
//! ```toml
//! db_path = "data/lawdelta.db"
//! log_profile = "production"
//! context_lines = 3
//! max_diff_bytes = 50000
//! workers = 4
//! ```
//!
//! Every key is optional. Command-line flags win over the file.

use std::path::{Path, PathBuf};

use lawdelta_core::logging_facility::Profile;
use lawdelta_engine::commands::batch::{BatchOptions, DEFAULT_WORKERS};
use lawdelta_engine::commands::ingest::{
    IngestOptions, DEFAULT_CONTEXT_LINES, DEFAULT_MAX_DIFF_BYTES,
};
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "lawdelta.toml";
const DEFAULT_DB_PATH: &str = "lawdelta.db";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config value: {0}")]
    Value(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    db_path: Option<PathBuf>,
    log_profile: Option<Profile>,
    context_lines: Option<usize>,
    max_diff_bytes: Option<usize>,
    workers: Option<usize>,
}

impl FileConfig {
    /// An explicit path must exist; the default file is optional.
    fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })
    }
}

/// Effective settings after merging defaults, the file and flags
#[derive(Debug, Clone)]
pub struct Settings {
    pub db_path: PathBuf,
    pub log_profile: Profile,
    pub ingest: IngestOptions,
    pub workers: usize,
}

impl Settings {
    pub fn resolve(
        config_path: Option<&Path>,
        db_flag: Option<PathBuf>,
        profile_flag: Option<Profile>,
    ) -> Result<Self, ConfigError> {
        let file = FileConfig::load(config_path)?;
        Self::merge(file, db_flag, profile_flag)
    }

    fn merge(
        file: FileConfig,
        db_flag: Option<PathBuf>,
        profile_flag: Option<Profile>,
    ) -> Result<Self, ConfigError> {
        let workers = file.workers.unwrap_or(DEFAULT_WORKERS);
        if workers == 0 {
            return Err(ConfigError::Value("workers must be at least 1".to_string()));
        }
        let max_diff_bytes = file.max_diff_bytes.unwrap_or(DEFAULT_MAX_DIFF_BYTES);
        if max_diff_bytes == 0 {
            return Err(ConfigError::Value("max_diff_bytes must be positive".to_string()));
        }

        Ok(Self {
            db_path: db_flag
                .or(file.db_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            log_profile: profile_flag
                .or(file.log_profile)
                .unwrap_or(Profile::Development),
            ingest: IngestOptions {
                context_lines: file.context_lines.unwrap_or(DEFAULT_CONTEXT_LINES),
                max_diff_bytes,
            },
            workers,
        })
    }

    pub fn batch_options(&self, workers_flag: Option<usize>) -> BatchOptions {
        BatchOptions {
            workers: workers_flag.unwrap_or(self.workers),
            ingest: self.ingest.clone(),
        }
    }
}
