//! Ingestion configuration
//!
//! Extractors never download anything. They read source files that were
//! already fetched into a directory tree laid out as
//! `{raw_dir}/{prefix}/{version}/{file}`, and write results under
//! `output_dir`.
//!
//! Configuration is loaded from the environment (and a `.env` file, if
//! present):
//!
//! - `OBO_RAW_DIR`: root of the fetched source files (default `./data/raw`)
//! - `OBO_OUTPUT_DIR`: where OBO/JSON documents go (default `./data/obo`)
//! - `OBO_PARSE_LIMIT`: stop each extractor after this many terms
//! - `OBO_VERSION_<PREFIX>`: version directory for one source, with the prefix
//!   upper-cased and `.` replaced by `_` (e.g. `OBO_VERSION_BIGG_REACTION`)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_RAW_DIR: &str = "./data/raw";
pub const DEFAULT_OUTPUT_DIR: &str = "./data/obo";
/// Version directory used when no version is configured for a source
pub const DEFAULT_VERSION: &str = "latest";

const VERSION_VAR_PREFIX: &str = "OBO_VERSION_";

/// Local input and output locations for an ingestion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub raw_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Source prefix to version directory
    #[serde(default)]
    pub versions: HashMap<String, String>,
    /// Maximum terms per extractor (None = no limit)
    #[serde(default)]
    pub parse_limit: Option<usize>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from(DEFAULT_RAW_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            versions: HashMap::new(),
            parse_limit: None,
        }
    }
}

impl IngestConfig {
    /// Load configuration from `.env` and the environment, then validate
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::from_vars(std::env::vars())?;
        config.validate()?;
        debug!(
            raw_dir = %config.raw_dir.display(),
            output_dir = %config.output_dir.display(),
            versions = config.versions.len(),
            "Loaded ingest configuration"
        );
        Ok(config)
    }

    /// Build a configuration from key/value pairs shaped like env vars
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = Self::default();
        for (key, value) in vars {
            match key.as_str() {
                "OBO_RAW_DIR" => config.raw_dir = PathBuf::from(value),
                "OBO_OUTPUT_DIR" => config.output_dir = PathBuf::from(value),
                "OBO_PARSE_LIMIT" => {
                    let limit = value
                        .trim()
                        .parse::<usize>()
                        .with_context(|| format!("OBO_PARSE_LIMIT must be a number, got {}", value))?;
                    config.parse_limit = Some(limit);
                },
                _ => {
                    if let Some(source) = key.strip_prefix(VERSION_VAR_PREFIX) {
                        config.versions.insert(env_key_to_prefix(source), value);
                    }
                },
            }
        }
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.raw_dir.as_os_str().is_empty() {
            anyhow::bail!("Raw data directory cannot be empty");
        }
        if self.output_dir.as_os_str().is_empty() {
            anyhow::bail!("Output directory cannot be empty");
        }
        if self.parse_limit == Some(0) {
            anyhow::bail!("Parse limit must be greater than 0");
        }
        if let Some((prefix, _)) = self.versions.iter().find(|(_, v)| v.trim().is_empty()) {
            anyhow::bail!("Version for {} cannot be empty", prefix);
        }
        Ok(())
    }

    #[must_use]
    pub fn with_raw_dir(mut self, raw_dir: impl Into<PathBuf>) -> Self {
        self.raw_dir = raw_dir.into();
        self
    }

    #[must_use]
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    #[must_use]
    pub fn with_version(mut self, prefix: impl Into<String>, version: impl Into<String>) -> Self {
        self.versions.insert(prefix.into(), version.into());
        self
    }

    #[must_use]
    pub fn with_parse_limit(mut self, limit: usize) -> Self {
        self.parse_limit = Some(limit);
        self
    }

    /// Configured version for a source, if any
    pub fn version(&self, prefix: &str) -> Option<&str> {
        self.versions.get(prefix).map(String::as_str)
    }

    /// `{raw_dir}/{prefix}/{version}`, falling back to the configured version
    /// and then to [`DEFAULT_VERSION`]
    pub fn source_dir(&self, prefix: &str, version: Option<&str>) -> PathBuf {
        let version = version
            .or_else(|| self.version(prefix))
            .unwrap_or(DEFAULT_VERSION);
        self.raw_dir.join(prefix).join(version)
    }

    pub fn source_path(&self, prefix: &str, version: Option<&str>, file: impl AsRef<Path>) -> PathBuf {
        self.source_dir(prefix, version).join(file)
    }

    /// `{output_dir}/{prefix}.{extension}`
    pub fn output_path(&self, prefix: &str, extension: &str) -> PathBuf {
        self.output_dir.join(format!("{}.{}", prefix, extension))
    }
}

/// `BIGG_REACTION` -> `bigg.reaction`
fn env_key_to_prefix(key: &str) -> String {
    key.to_lowercase().replace('_', ".")
}
