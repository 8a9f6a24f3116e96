use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while loading or looking up content records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with the given identifier exists.
    #[error("Content record not found: {0}")]
    NotFound(String),

    /// Two records resolved to the same identifier.
    #[error("Duplicate content record identifier: {0}")]
    DuplicateId(String),

    /// Reading the content directory failed.
    #[error("Failed to read content: {0}")]
    Io(#[from] std::io::Error),

    /// A record's front matter is not valid TOML.
    #[error("Invalid front matter in {}: {source}", path.display())]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A timestamp field could not be parsed.
    #[error("Invalid timestamp '{value}' in {}", path.display())]
    InvalidTimestamp { path: PathBuf, value: String },
}

// ============================================================================
// Records
// ============================================================================

/// Title prefix marking internal records that never appear in feeds.
pub const SYSTEM_PREFIX: &str = "$:/";

/// A single item of content, as held by a [`ContentStore`](super::ContentStore).
///
/// The feed pipeline only ever reads records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentRecord {
    /// Unique identifier within the store.
    pub id: String,
    /// Display title. Required when the record is fed.
    pub title: Option<String>,
    /// Body markup (markdown for the bundled renderer).
    pub text: String,
    pub modified: Option<DateTime<Utc>>,
    pub creator: Option<String>,
    pub modifier: Option<String>,
    /// Author-written summary. Never synthesized by the store.
    pub summary: Option<String>,
    pub tags: Vec<String>,
    /// Set when this record is an unsaved draft of another record.
    pub draft_of: Option<String>,
}

impl ContentRecord {
    /// Creates a record whose identifier and title are both `title`.
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            id: title.clone(),
            title: Some(title),
            ..Self::default()
        }
    }

    /// True for internal records (`$:/...`), which are never feed candidates.
    pub fn is_system(&self) -> bool {
        self.title
            .as_deref()
            .unwrap_or(&self.id)
            .starts_with(SYSTEM_PREFIX)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Site-wide settings the feed metadata falls back to.
///
/// Passed explicitly to the metadata resolver rather than looked up from
/// global state, so two feeds for two sites can be built side by side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteConfig {
    pub title: String,
    pub subtitle: String,
    /// Base URL of the feed server. Feed and entry links are joined onto it.
    pub atom_server: String,
}
