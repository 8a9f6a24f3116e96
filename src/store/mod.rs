//! Content store seam and the bundled store implementations.
//!
//! The feed pipeline reads content through the [`ContentStore`] trait:
//!
//! - [`MemoryStore`] - records held in memory, used by tests and embedders
//! - [`DirectoryStore`] - markdown files with optional TOML front matter
//!
//! [`ContentStore::filter`] picks feed candidates when the caller does not
//! name the items to feed.

mod directory;
mod memory;
mod types;

use std::collections::HashSet;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;
pub use types::{ContentRecord, SiteConfig, StoreError, SYSTEM_PREFIX};

/// Tag that keeps a record out of generated feeds.
pub const STATIC_TAG: &str = "static";

/// Read access to content records.
pub trait ContentStore: Send + Sync {
    /// Looks up a single record by identifier.
    fn get_record(&self, id: &str) -> Result<ContentRecord, StoreError>;

    /// Every record in the store, in a stable order.
    fn records(&self) -> Vec<&ContentRecord>;

    /// Identifiers of the records matching `query`, newest first.
    ///
    /// Records are ordered by `modified` descending (undated records last),
    /// ties broken by identifier, then cut to `query.limit`.
    fn filter(&self, query: &RecordFilter) -> Vec<String> {
        let records = self.records();
        let tags_in_use: HashSet<&str> = records
            .iter()
            .copied()
            .flat_map(|r| r.tags.iter().map(String::as_str))
            .collect();

        let mut hits: Vec<&ContentRecord> = records
            .iter()
            .copied()
            .filter(|r| query.matches(r, &tags_in_use))
            .collect();
        hits.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.id.cmp(&b.id)));
        if let Some(limit) = query.limit {
            hits.truncate(limit);
        }

        tracing::debug!(matched = hits.len(), "Filtered feed candidates");
        hits.into_iter().map(|r| r.id.clone()).collect()
    }
}

/// Selection rules for [`ContentStore::filter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter {
    /// Keep `$:/` system records.
    pub include_system: bool,
    /// Keep records that are drafts of another record.
    pub include_drafts: bool,
    /// Drop records without any tag.
    pub require_tags: bool,
    /// Drop records carrying this tag.
    pub exclude_tag: Option<String>,
    /// Drop records whose title is used as a tag by some record.
    pub exclude_tag_records: bool,
    pub limit: Option<usize>,
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self {
            include_system: true,
            include_drafts: true,
            require_tags: false,
            exclude_tag: None,
            exclude_tag_records: false,
            limit: None,
        }
    }
}

impl RecordFilter {
    /// The rules used for feeds when no explicit item list is given:
    /// published, tagged, non-static content items that are not themselves
    /// tags, newest `limit` first.
    pub fn feed_default(limit: usize) -> Self {
        Self {
            include_system: false,
            include_drafts: false,
            require_tags: true,
            exclude_tag: Some(STATIC_TAG.to_string()),
            exclude_tag_records: true,
            limit: Some(limit),
        }
    }

    fn matches(&self, record: &ContentRecord, tags_in_use: &HashSet<&str>) -> bool {
        if !self.include_system && record.is_system() {
            return false;
        }
        if !self.include_drafts && record.draft_of.is_some() {
            return false;
        }
        if self.require_tags && record.tags.is_empty() {
            return false;
        }
        if let Some(tag) = &self.exclude_tag {
            if record.has_tag(tag) {
                return false;
            }
        }
        if self.exclude_tag_records {
            let title = record.title.as_deref().unwrap_or(&record.id);
            if tags_in_use.contains(title) {
                return false;
            }
        }
        true
    }
}
