use super::metadata::FeedMetadata;
use super::xml::Node;
use super::FeedError;
use crate::render::Renderer;
use crate::store::ContentRecord;
use crate::util::{format_updated, path_join, to_file_name, to_permalink, truncate_words, Hasher};

/// Segment below the site root that holds pre-rendered item pages.
pub const STATIC_DIR: &str = "static";

/// Words kept by [`SummaryMode::TruncateWords`] unless configured otherwise.
pub const DEFAULT_SUMMARY_WORDS: usize = 20;

/// What to emit for records without an explicit summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SummaryMode {
    /// No `<summary>` element.
    #[default]
    Omit,
    /// The first `n` words of the body, for readers that expect every
    /// entry to carry a summary.
    TruncateWords(usize),
}

/// Per-entry metadata for one content record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMetadata {
    pub title: String,
    pub updated: String,
    pub uuid: String,
    pub permalink_href: String,
    pub static_href: String,
    pub summary: Option<String>,
    pub author: String,
    pub rendered_body: Vec<Node>,
}

/// Derives [`EntryMetadata`], falling back to feed metadata where needed.
pub struct EntryResolver<'a, R, H> {
    renderer: &'a R,
    hasher: &'a H,
    summary_mode: SummaryMode,
}

impl<'a, R: Renderer, H: Hasher> EntryResolver<'a, R, H> {
    pub fn new(renderer: &'a R, hasher: &'a H, summary_mode: SummaryMode) -> Self {
        Self {
            renderer,
            hasher,
            summary_mode,
        }
    }

    /// # Errors
    ///
    /// [`FeedError::MissingTitle`] when the record has no title, and any
    /// error the renderer reports for the body.
    pub fn resolve(
        &self,
        record: &ContentRecord,
        feed: &FeedMetadata,
    ) -> Result<EntryMetadata, FeedError> {
        let title = match record.title.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => return Err(FeedError::MissingTitle(record.id.clone())),
        };

        let summary = match record.summary.as_deref() {
            Some(s) if !s.is_empty() => Some(s.to_string()),
            _ => match self.summary_mode {
                SummaryMode::Omit => None,
                SummaryMode::TruncateWords(words) => Some(truncate_words(&record.text, words)),
            },
        };

        let author = [record.modifier.as_deref(), record.creator.as_deref()]
            .into_iter()
            .flatten()
            .find(|a| !a.is_empty())
            .unwrap_or(feed.author.as_str());
        let permalink = to_permalink(title);
        let file_name = to_file_name(title);

        Ok(EntryMetadata {
            title: title.to_string(),
            updated: format_updated(record.modified.as_ref()),
            uuid: self.hasher.hash(title),
            permalink_href: path_join(&[feed.site_href.as_str(), permalink.as_str()]),
            static_href: path_join(&[feed.site_href.as_str(), STATIC_DIR, file_name.as_str()]),
            summary,
            author: author.to_string(),
            rendered_body: self.renderer.render_tree(record)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::MarkdownRenderer;
    use crate::util::Sha256Guid;
    use chrono::{TimeZone, Utc};

    fn feed() -> FeedMetadata {
        FeedMetadata {
            title: "My Site".to_string(),
            subtitle: String::new(),
            feed_href: "https://site.example/atom.xml".to_string(),
            site_href: "https://site.example/".to_string(),
            author: "feed-author".to_string(),
            updated: String::new(),
            uuid: Sha256Guid.hash("My Site"),
        }
    }

    fn resolve(record: &ContentRecord, mode: SummaryMode) -> Result<EntryMetadata, FeedError> {
        let renderer = MarkdownRenderer::new();
        EntryResolver::new(&renderer, &Sha256Guid, mode).resolve(record, &feed())
    }

    fn with_authors(creator: Option<&str>, modifier: Option<&str>) -> ContentRecord {
        ContentRecord {
            creator: creator.map(str::to_string),
            modifier: modifier.map(str::to_string),
            ..ContentRecord::new("Post")
        }
    }

    #[test]
    fn test_links_and_ids() {
        let record = ContentRecord {
            modified: Some(Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()),
            ..ContentRecord::new("Hello World")
        };
        let entry = resolve(&record, SummaryMode::Omit).unwrap();
        assert_eq!(entry.title, "Hello World");
        assert_eq!(entry.updated, "2024-05-06T07:08:09Z");
        assert_eq!(entry.uuid, Sha256Guid.hash("Hello World"));
        assert_eq!(entry.permalink_href, "https://site.example/#Hello%20World");
        assert_eq!(
            entry.static_href,
            "https://site.example/static/Hello%2520World.html"
        );
    }

    #[test]
    fn test_undated_record_has_empty_updated() {
        let entry = resolve(&ContentRecord::new("x"), SummaryMode::Omit).unwrap();
        assert_eq!(entry.updated, "");
    }

    #[test]
    fn test_missing_title_is_an_error() {
        let record = ContentRecord {
            id: "untitled".to_string(),
            ..ContentRecord::default()
        };
        let err = resolve(&record, SummaryMode::Omit).unwrap_err();
        assert!(matches!(err, FeedError::MissingTitle(ref id) if id == "untitled"));
    }

    #[test]
    fn test_empty_title_is_an_error() {
        let record = ContentRecord {
            id: "blank".to_string(),
            title: Some(String::new()),
            ..ContentRecord::default()
        };
        assert!(matches!(
            resolve(&record, SummaryMode::Omit),
            Err(FeedError::MissingTitle(_))
        ));
    }

    #[test]
    fn test_author_prefers_modifier() {
        let entry = resolve(&with_authors(Some("creator"), Some("modifier")), SummaryMode::Omit).unwrap();
        assert_eq!(entry.author, "modifier");
    }

    #[test]
    fn test_author_falls_back_to_creator() {
        let entry = resolve(&with_authors(Some("creator"), None), SummaryMode::Omit).unwrap();
        assert_eq!(entry.author, "creator");

        let entry = resolve(&with_authors(Some("creator"), Some("")), SummaryMode::Omit).unwrap();
        assert_eq!(entry.author, "creator");
    }

    #[test]
    fn test_author_falls_back_to_feed() {
        let entry = resolve(&with_authors(None, None), SummaryMode::Omit).unwrap();
        assert_eq!(entry.author, "feed-author");

        let entry = resolve(&with_authors(Some(""), Some("")), SummaryMode::Omit).unwrap();
        assert_eq!(entry.author, "feed-author");
    }

    #[test]
    fn test_summary_verbatim_when_present() {
        let record = ContentRecord {
            summary: Some("Exactly *this*".to_string()),
            text: "body words".to_string(),
            ..ContentRecord::new("Post")
        };
        let entry = resolve(&record, SummaryMode::TruncateWords(1)).unwrap();
        assert_eq!(entry.summary.as_deref(), Some("Exactly *this*"));
    }

    #[test]
    fn test_summary_omitted_by_default() {
        let record = ContentRecord {
            summary: Some(String::new()),
            text: "body words".to_string(),
            ..ContentRecord::new("Post")
        };
        assert_eq!(resolve(&record, SummaryMode::Omit).unwrap().summary, None);
    }

    #[test]
    fn test_summary_truncation_mode() {
        let record = ContentRecord {
            text: "one two three four".to_string(),
            ..ContentRecord::new("Post")
        };
        let entry = resolve(&record, SummaryMode::TruncateWords(3)).unwrap();
        assert_eq!(entry.summary.as_deref(), Some("one two three"));
    }

    #[test]
    fn test_body_is_rendered() {
        let record = ContentRecord {
            text: "Hi".to_string(),
            ..ContentRecord::new("Post")
        };
        let entry = resolve(&record, SummaryMode::Omit).unwrap();
        assert_eq!(entry.rendered_body.len(), 1);
        assert_eq!(entry.rendered_body[0].text_content(), "Hi");
    }
}
