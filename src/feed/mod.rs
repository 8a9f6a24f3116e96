//! Atom feed generation from content store records.
//!
//! Generation is a straight pipeline, run once per [`FeedBuilder::build`]:
//!
//! - [`metadata`] - feed-wide metadata from site settings and the fed records
//! - [`entry`] - per-record entry metadata, falling back to the feed's
//! - [`atom`] - the Atom document tree and its serialization
//! - [`xml`] - the owned element tree the document is assembled from
//!
//! # Example
//!
//! ```
//! use atomfeed::feed::{FeedBuilder, MetadataOverrides};
//! use atomfeed::store::{ContentRecord, MemoryStore, SiteConfig};
//!
//! let store = MemoryStore::from_records([ContentRecord {
//!     text: "Hi".to_string(),
//!     ..ContentRecord::new("Hello")
//! }])?;
//! let site = SiteConfig {
//!     title: "My Site".to_string(),
//!     subtitle: String::new(),
//!     atom_server: "https://example.com/".to_string(),
//! };
//!
//! let xml = FeedBuilder::new(&store, &site).build(&["Hello"], &MetadataOverrides::default())?;
//! assert!(xml.contains("<title>Hello</title>"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod atom;
pub mod entry;
pub mod metadata;
pub mod xml;

use thiserror::Error;

use crate::render::{MarkdownRenderer, RenderError, Renderer};
use crate::store::{ContentRecord, ContentStore, RecordFilter, SiteConfig, StoreError};
use crate::util::{Hasher, Sha256Guid};

pub use atom::FeedAssembler;
pub use entry::{EntryMetadata, EntryResolver, SummaryMode, DEFAULT_SUMMARY_WORDS};
pub use metadata::{FeedMetadata, MetadataOverrides, MetadataResolver};

/// Errors that abort feed generation.
///
/// No partial feed is ever produced: the first failing record ends the build.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A fed record has no title.
    #[error("Content record '{0}' has no title")]
    MissingTitle(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Render(#[from] RenderError),

    /// Writing the document tree failed.
    #[error("Failed to serialize feed: {0}")]
    Serialize(String),
}

/// Entry point for generating a feed from a [`ContentStore`].
///
/// Holds only shared references and immutable collaborators, so one builder
/// can serve concurrent builds when the store allows concurrent reads.
pub struct FeedBuilder<'a, S: ?Sized, R = MarkdownRenderer, H = Sha256Guid> {
    store: &'a S,
    site: &'a SiteConfig,
    renderer: R,
    hasher: H,
    summary_mode: SummaryMode,
}

impl<'a, S: ContentStore + ?Sized> FeedBuilder<'a, S> {
    /// A builder using the markdown renderer and SHA-256 identifiers.
    pub fn new(store: &'a S, site: &'a SiteConfig) -> Self {
        Self {
            store,
            site,
            renderer: MarkdownRenderer::default(),
            hasher: Sha256Guid,
            summary_mode: SummaryMode::default(),
        }
    }
}

impl<'a, S, R, H> FeedBuilder<'a, S, R, H>
where
    S: ContentStore + ?Sized,
    R: Renderer,
    H: Hasher,
{
    pub fn with_renderer<R2: Renderer>(self, renderer: R2) -> FeedBuilder<'a, S, R2, H> {
        FeedBuilder {
            store: self.store,
            site: self.site,
            renderer,
            hasher: self.hasher,
            summary_mode: self.summary_mode,
        }
    }

    pub fn with_hasher<H2: Hasher>(self, hasher: H2) -> FeedBuilder<'a, S, R, H2> {
        FeedBuilder {
            store: self.store,
            site: self.site,
            renderer: self.renderer,
            hasher,
            summary_mode: self.summary_mode,
        }
    }

    pub fn summary_mode(mut self, mode: SummaryMode) -> Self {
        self.summary_mode = mode;
        self
    }

    /// Builds the feed document for `ids`, entries in the same order.
    ///
    /// # Errors
    ///
    /// Fails without output if any identifier is unknown to the store, any
    /// record lacks a title, or rendering fails.
    pub fn build<I: AsRef<str>>(
        &self,
        ids: &[I],
        overrides: &MetadataOverrides,
    ) -> Result<String, FeedError> {
        let records = ids
            .iter()
            .map(|id| self.store.get_record(id.as_ref()))
            .collect::<Result<Vec<ContentRecord>, StoreError>>()?;

        let feed = MetadataResolver::new(self.site, &self.hasher).resolve(&records, overrides);
        tracing::debug!(title = %feed.title, updated = %feed.updated, "Resolved feed metadata");

        let resolver = EntryResolver::new(&self.renderer, &self.hasher, self.summary_mode);
        let entries = records
            .iter()
            .map(|record| resolver.resolve(record, &feed))
            .collect::<Result<Vec<_>, _>>()?;

        let xml = FeedAssembler::new(&self.renderer).assemble(&feed, entries)?;
        tracing::debug!(entries = records.len(), bytes = xml.len(), "Assembled feed");
        Ok(xml)
    }

    /// Builds the feed from the store's own candidates, newest first.
    pub fn build_latest(
        &self,
        filter: &RecordFilter,
        overrides: &MetadataOverrides,
    ) -> Result<String, FeedError> {
        let ids = self.store.filter(filter);
        self.build(ids.as_slice(), overrides)
    }
}
