//! Configuration file parser for `atomfeed.toml`.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde (with `deny_unknown_fields` off),
//! though we log a warning when the file contains potential typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::feed::{MetadataOverrides, SummaryMode};
use crate::store::SiteConfig;
use crate::util::{validate_server_url, UrlValidationError};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// `atom_server` is missing or not an absolute http(s) URL.
    #[error("Invalid atom_server '{url}': {reason}")]
    InvalidServer { url: String, reason: String },
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level feed configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site title, used as the feed title unless overridden.
    pub title: String,

    /// Site subtitle, used as the feed subtitle unless overridden.
    pub subtitle: String,

    /// Base URL of the feed server. Required.
    pub atom_server: String,

    /// Path of the feed document below `atom_server`.
    pub feed_path: String,

    /// Directory holding the markdown content files.
    pub content_dir: PathBuf,

    /// Where to write the feed. `None` writes to stdout.
    pub output: Option<PathBuf>,

    /// Number of entries when the feed is built from the newest records.
    pub max_entries: usize,

    /// When set, entries without a summary get the first N words of their body.
    pub summary_words: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            atom_server: String::new(),
            feed_path: crate::feed::metadata::DEFAULT_FEED_PATH.to_string(),
            content_dir: PathBuf::from("content"),
            output: None,
            max_entries: 20,
            summary_words: None,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 8] = [
        "title",
        "subtitle",
        "atom_server",
        "feed_path",
        "content_dir",
        "output",
        "max_entries",
        "summary_words",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading so a stray binary can't exhaust memory
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse the TOML content first as a raw table to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), server = %config.atom_server, "Loaded configuration");
        Ok(config)
    }

    /// Checks the settings feed generation cannot do without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.atom_server.trim().is_empty() {
            return Err(ConfigError::InvalidServer {
                url: self.atom_server.clone(),
                reason: "atom_server is not set".to_string(),
            });
        }
        validate_server_url(&self.atom_server).map_err(|e: UrlValidationError| {
            ConfigError::InvalidServer {
                url: self.atom_server.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(())
    }

    pub fn site(&self) -> SiteConfig {
        SiteConfig {
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            atom_server: self.atom_server.clone(),
        }
    }

    /// Metadata overrides carried by the config file (the feed path).
    pub fn overrides(&self) -> MetadataOverrides {
        MetadataOverrides {
            feed_path: Some(self.feed_path.clone()),
            ..MetadataOverrides::default()
        }
    }

    pub fn summary_mode(&self) -> SummaryMode {
        match self.summary_words {
            Some(words) => SummaryMode::TruncateWords(words),
            None => SummaryMode::Omit,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
