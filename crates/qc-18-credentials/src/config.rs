//! # Subsystem Configuration
//!
//! Node-local knobs only. Anything that changes processing outcomes (length
//! limits, batch size) is a constant in [`crate::domain::limits`], so nodes
//! with different config files still agree on every state delta.
//!
//! ```toml
//! [processing]
//! log_rejections = true
//! trace_state_values = false
//!
//! [digest]
//! max_page_size = 50
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default cap on credential listing pages.
pub const DEFAULT_MAX_PAGE_SIZE: usize = 50;

/// Logging behavior of [`crate::processors::CredentialProcessors`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingConfig {
    /// Log rejected operations at `warn` instead of `debug`.
    pub log_rejections: bool,
    /// Emit every produced merge value at `trace`.
    pub trace_state_values: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            log_rejections: true,
            trace_state_values: false,
        }
    }
}

/// Read-side digest settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestConfig {
    /// Listing pages never exceed this many entries.
    pub max_page_size: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

/// Complete subsystem configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialConfig {
    pub processing: ProcessingConfig,
    pub digest: DigestConfig,
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    processing: ProcessingFile,
    #[serde(default)]
    digest: DigestFile,
}

#[derive(Debug, Deserialize, Default)]
struct ProcessingFile {
    log_rejections: Option<bool>,
    trace_state_values: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct DigestFile {
    max_page_size: Option<usize>,
}

impl CredentialConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string. Missing keys take defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let defaults = Self::default();
        let max_page_size = file
            .digest
            .max_page_size
            .unwrap_or(defaults.digest.max_page_size);
        if max_page_size == 0 {
            return Err(ConfigError::Invalid(
                "digest.max_page_size must be positive".to_string(),
            ));
        }

        Ok(Self {
            processing: ProcessingConfig {
                log_rejections: file
                    .processing
                    .log_rejections
                    .unwrap_or(defaults.processing.log_rejections),
                trace_state_values: file
                    .processing
                    .trace_state_values
                    .unwrap_or(defaults.processing.trace_state_values),
            },
            digest: DigestConfig { max_page_size },
        })
    }
}

/// Errors that can occur during config loading.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read {path}: {error}")]
    Io { path: String, error: String },
    /// TOML parsing error.
    #[error("failed to parse config: {0}")]
    Parse(String),
    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}
