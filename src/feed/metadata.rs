use crate::store::{ContentRecord, SiteConfig};
use crate::util::{format_updated, path_join, Hasher};

/// Path of the feed document below the feed server when not overridden.
pub const DEFAULT_FEED_PATH: &str = "atom.xml";

/// Caller-supplied replacements for site-derived feed metadata.
///
/// Empty strings are treated the same as absent values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataOverrides {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub author: Option<String>,
    pub feed_path: Option<String>,
}

/// Feed-wide metadata, resolved once per build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedMetadata {
    pub title: String,
    pub subtitle: String,
    /// Canonical URL of the feed document itself.
    pub feed_href: String,
    /// Canonical base URL of the site.
    pub site_href: String,
    pub author: String,
    /// ISO timestamp of the freshest record, or empty.
    pub updated: String,
    pub uuid: String,
}

/// Derives [`FeedMetadata`] from site settings and the records being fed.
pub struct MetadataResolver<'a, H> {
    site: &'a SiteConfig,
    hasher: &'a H,
}

impl<'a, H: Hasher> MetadataResolver<'a, H> {
    pub fn new(site: &'a SiteConfig, hasher: &'a H) -> Self {
        Self { site, hasher }
    }

    pub fn resolve(&self, records: &[ContentRecord], overrides: &MetadataOverrides) -> FeedMetadata {
        let title = non_empty(&overrides.title).unwrap_or(self.site.title.as_str());
        let subtitle = non_empty(&overrides.subtitle).unwrap_or(self.site.subtitle.as_str());
        let feed_path = non_empty(&overrides.feed_path).unwrap_or(DEFAULT_FEED_PATH);
        let freshest = freshest_record(records);

        let author = non_empty(&overrides.author)
            .or_else(|| freshest.and_then(|r| r.creator.as_deref()))
            .unwrap_or_default();

        FeedMetadata {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            feed_href: path_join(&[self.site.atom_server.as_str(), feed_path]),
            site_href: self.site.atom_server.clone(),
            author: author.to_string(),
            updated: format_updated(freshest.and_then(|r| r.modified.as_ref())),
            uuid: self.hasher.hash(title),
        }
    }
}

/// The record with the latest `modified` timestamp.
///
/// Strictly greater wins, so among equal timestamps the earliest record in
/// `records` is chosen. Undated records are never the freshest.
pub fn freshest_record(records: &[ContentRecord]) -> Option<&ContentRecord> {
    records
        .iter()
        .filter(|r| r.modified.is_some())
        .fold(None, |best: Option<&ContentRecord>, r| match best {
            Some(b) if r.modified <= b.modified => Some(b),
            _ => Some(r),
        })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Sha256Guid;
    use chrono::{TimeZone, Utc};

    fn site() -> SiteConfig {
        SiteConfig {
            title: "My Site".to_string(),
            subtitle: "Notes and things".to_string(),
            atom_server: "https://site.example/".to_string(),
        }
    }

    fn record(title: &str, modified: i64, creator: Option<&str>) -> ContentRecord {
        ContentRecord {
            modified: Some(Utc.timestamp_opt(modified, 0).unwrap()),
            creator: creator.map(str::to_string),
            ..ContentRecord::new(title)
        }
    }

    #[test]
    fn test_defaults_from_site() {
        let site = site();
        let meta = MetadataResolver::new(&site, &Sha256Guid).resolve(&[], &MetadataOverrides::default());
        assert_eq!(meta.title, "My Site");
        assert_eq!(meta.subtitle, "Notes and things");
        assert_eq!(meta.feed_href, "https://site.example/atom.xml");
        assert_eq!(meta.site_href, "https://site.example/");
        assert_eq!(meta.author, "");
        assert_eq!(meta.updated, "");
        assert_eq!(meta.uuid, Sha256Guid.hash("My Site"));
    }

    #[test]
    fn test_overrides_win() {
        let site = site();
        let overrides = MetadataOverrides {
            title: Some("Other".to_string()),
            subtitle: Some("Sub".to_string()),
            author: Some("carol".to_string()),
            feed_path: Some("/feeds/all.xml".to_string()),
        };
        let records = [record("a", 100, Some("alice"))];
        let meta = MetadataResolver::new(&site, &Sha256Guid).resolve(&records, &overrides);
        assert_eq!(meta.title, "Other");
        assert_eq!(meta.subtitle, "Sub");
        assert_eq!(meta.author, "carol");
        assert_eq!(meta.feed_href, "https://site.example/feeds/all.xml");
        assert_eq!(meta.uuid, Sha256Guid.hash("Other"));
    }

    #[test]
    fn test_empty_overrides_are_ignored() {
        let site = site();
        let overrides = MetadataOverrides {
            title: Some(String::new()),
            author: Some(String::new()),
            ..MetadataOverrides::default()
        };
        let records = [record("a", 100, Some("alice"))];
        let meta = MetadataResolver::new(&site, &Sha256Guid).resolve(&records, &overrides);
        assert_eq!(meta.title, "My Site");
        assert_eq!(meta.author, "alice");
    }

    #[test]
    fn test_freshest_record_drives_author_and_updated() {
        let site = site();
        let records = [
            record("a", 100, Some("alice")),
            record("b", 300, Some("bob")),
            record("c", 200, Some("carol")),
        ];
        let meta =
            MetadataResolver::new(&site, &Sha256Guid).resolve(&records, &MetadataOverrides::default());
        assert_eq!(meta.author, "bob");
        assert_eq!(meta.updated, "1970-01-01T00:05:00Z");
    }

    #[test]
    fn test_freshest_tie_keeps_first() {
        let records = [record("first", 100, None), record("second", 100, None)];
        assert_eq!(freshest_record(&records).unwrap().id, "first");
    }

    #[test]
    fn test_freshest_skips_undated() {
        let undated = ContentRecord::new("undated");
        let records = [undated.clone(), record("dated", 1, None)];
        assert_eq!(freshest_record(&records).unwrap().id, "dated");
        assert!(freshest_record(&[undated]).is_none());
        assert!(freshest_record(&[]).is_none());
    }

    #[test]
    fn test_freshest_without_creator_gives_empty_author() {
        let site = site();
        let records = [record("a", 100, None)];
        let meta =
            MetadataResolver::new(&site, &Sha256Guid).resolve(&records, &MetadataOverrides::default());
        assert_eq!(meta.author, "");
        assert_eq!(meta.updated, "1970-01-01T00:01:40Z");
    }
}
