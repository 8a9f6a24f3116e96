use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::{ContentRecord, ContentStore, MemoryStore, StoreError};
use crate::util::parse_timestamp;

/// Line that opens and closes a TOML front matter block.
const FRONT_MATTER_FENCE: &str = "+++";

/// Extension of the files picked up as content records.
const CONTENT_EXTENSION: &str = "md";

/// Front matter fields recognized on a content file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FrontMatter {
    title: Option<String>,
    modified: Option<toml::Value>,
    creator: Option<String>,
    modifier: Option<String>,
    summary: Option<String>,
    tags: Vec<String>,
    draft_of: Option<String>,
}

/// [`ContentStore`] backed by a directory of markdown files.
///
/// Each `*.md` file below the root (recursively) is one record. A file may
/// open with a TOML front matter block fenced by `+++` lines:
///
/// ```text
/// +++
/// title = "Hello"
/// modified = 2024-01-02T03:04:05Z
/// creator = "alice"
/// tags = ["blog"]
/// +++
/// Body text in *markdown*.
/// ```
///
/// A record's identifier and title are its `title`, or the file stem when
/// the front matter has none. Records are loaded once; the directory is not watched.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    inner: MemoryStore,
}

impl DirectoryStore {
    /// Loads every content file below `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read, a file has
    /// malformed front matter or timestamps, or two files resolve to the
    /// same identifier. Files that are not valid UTF-8 are skipped with a
    /// warning.
    pub fn load(root: &Path) -> Result<Self, StoreError> {
        let mut paths = Vec::new();
        collect_content_files(root, &mut paths)?;
        paths.sort();

        let mut inner = MemoryStore::new();
        for path in &paths {
            let content = match std::fs::read_to_string(path) {
                Ok(c) => c,
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    tracing::warn!(path = %path.display(), "Skipping content file that is not UTF-8");
                    continue;
                }
                Err(e) => return Err(StoreError::Io(e)),
            };
            inner.insert(parse_record(path, &content)?)?;
        }

        tracing::info!(path = %root.display(), records = inner.len(), "Loaded content directory");
        Ok(Self {
            root: root.to_path_buf(),
            inner,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ContentStore for DirectoryStore {
    fn get_record(&self, id: &str) -> Result<ContentRecord, StoreError> {
        self.inner.get_record(id)
    }

    fn records(&self) -> Vec<&ContentRecord> {
        self.inner.records()
    }
}

fn collect_content_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), StoreError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_content_files(&path, out)?;
        } else if file_type.is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(CONTENT_EXTENSION)
        {
            out.push(path);
        }
    }
    Ok(())
}

/// Splits a file into its front matter (if fenced) and body.
fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let Some(first_line_end) = content.find('\n') else {
        return (None, content);
    };
    if content[..first_line_end].trim_end() != FRONT_MATTER_FENCE {
        return (None, content);
    }

    let rest = &content[first_line_end + 1..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FRONT_MATTER_FENCE {
            let body = &rest[offset + line.len()..];
            return (Some(&rest[..offset]), body);
        }
        offset += line.len();
    }

    // Unterminated fence: treat the whole file as body
    (None, content)
}

fn parse_record(path: &Path, content: &str) -> Result<ContentRecord, StoreError> {
    let (front_matter, body) = split_front_matter(content);
    let meta: FrontMatter = match front_matter {
        Some(raw) => toml::from_str(raw).map_err(|source| StoreError::FrontMatter {
            path: path.to_path_buf(),
            source,
        })?,
        None => FrontMatter::default(),
    };

    let id = match &meta.title {
        Some(title) if !title.is_empty() => title.clone(),
        _ => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    Ok(ContentRecord {
        title: Some(id.clone()),
        id,
        text: body.to_string(),
        modified: timestamp_field(path, meta.modified)?,
        creator: meta.creator,
        modifier: meta.modifier,
        summary: meta.summary,
        tags: meta.tags,
        draft_of: meta.draft_of,
    })
}

/// Accepts both quoted strings and native TOML datetimes.
fn timestamp_field(
    path: &Path,
    value: Option<toml::Value>,
) -> Result<Option<chrono::DateTime<chrono::Utc>>, StoreError> {
    let raw = match value {
        None => return Ok(None),
        Some(toml::Value::String(s)) => s,
        Some(toml::Value::Datetime(dt)) => dt.to_string(),
        Some(other) => other.to_string(),
    };
    parse_timestamp(&raw)
        .map(Some)
        .ok_or_else(|| StoreError::InvalidTimestamp {
            path: path.to_path_buf(),
            value: raw,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_split_front_matter() {
        let (meta, body) = split_front_matter("+++\ntitle = \"x\"\n+++\nBody\n");
        assert_eq!(meta, Some("title = \"x\"\n"));
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn test_split_crlf_front_matter() {
        let (meta, body) = split_front_matter("+++\r\ntitle = \"x\"\r\n+++\r\nBody");
        assert_eq!(meta, Some("title = \"x\"\r\n"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_split_without_front_matter() {
        let (meta, body) = split_front_matter("Just text\n+++\n");
        assert_eq!(meta, None);
        assert_eq!(body, "Just text\n+++\n");
    }

    #[test]
    fn test_split_unterminated_front_matter() {
        let (meta, body) = split_front_matter("+++\ntitle = \"x\"\n");
        assert_eq!(meta, None);
        assert_eq!(body, "+++\ntitle = \"x\"\n");
    }

    #[test]
    fn test_parse_record_fields() {
        let content = r#"+++
title = "Hello World"
modified = 2024-01-02T03:04:05Z
creator = "alice"
modifier = "bob"
summary = "A greeting"
tags = ["blog", "intro"]
+++
Hi *there*
"#;
        let record = parse_record(Path::new("posts/hello.md"), content).unwrap();
        assert_eq!(record.id, "Hello World");
        assert_eq!(record.title.as_deref(), Some("Hello World"));
        assert_eq!(record.text, "Hi *there*\n");
        assert_eq!(
            record.modified,
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
        );
        assert_eq!(record.creator.as_deref(), Some("alice"));
        assert_eq!(record.modifier.as_deref(), Some("bob"));
        assert_eq!(record.summary.as_deref(), Some("A greeting"));
        assert_eq!(record.tags, vec!["blog", "intro"]);
        assert_eq!(record.draft_of, None);
    }

    #[test]
    fn test_parse_record_without_title_uses_stem() {
        let record = parse_record(Path::new("notes/todo.md"), "body only").unwrap();
        assert_eq!(record.id, "todo");
        assert_eq!(record.title.as_deref(), Some("todo"));
        assert_eq!(record.text, "body only");
    }

    #[test]
    fn test_parse_record_bad_timestamp() {
        let content = "+++\nmodified = \"last tuesday\"\n+++\n";
        let err = parse_record(Path::new("x.md"), content).unwrap_err();
        assert!(matches!(err, StoreError::InvalidTimestamp { ref value, .. } if value == "last tuesday"));
    }

    #[test]
    fn test_parse_record_bad_toml() {
        let content = "+++\ntitle = \n+++\n";
        let err = parse_record(Path::new("x.md"), content).unwrap_err();
        assert!(matches!(err, StoreError::FrontMatter { .. }));
        assert!(err.to_string().contains("x.md"));
    }

    #[test]
    fn test_load_directory() {
        let dir = std::env::temp_dir().join("atomfeed_store_test_load");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("a.md"), "+++\ntitle = \"Alpha\"\n+++\nA").unwrap();
        std::fs::write(dir.join("nested").join("b.md"), "B").unwrap();
        std::fs::write(dir.join("ignored.txt"), "not content").unwrap();

        let store = DirectoryStore::load(&dir).unwrap();
        let ids: Vec<&str> = store.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["Alpha", "b"]);
        assert_eq!(store.get_record("b").unwrap().text, "B");
        assert_eq!(store.root(), dir.as_path());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_duplicate_titles() {
        let dir = std::env::temp_dir().join("atomfeed_store_test_duplicate");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("one.md"), "+++\ntitle = \"Same\"\n+++\n").unwrap();
        std::fs::write(dir.join("two.md"), "+++\ntitle = \"Same\"\n+++\n").unwrap();

        let result = DirectoryStore::load(&dir);
        assert!(matches!(result, Err(StoreError::DuplicateId(ref id)) if id == "Same"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_missing_directory() {
        let dir = std::env::temp_dir().join("atomfeed_store_test_missing_dir");
        let _ = std::fs::remove_dir_all(&dir);
        assert!(matches!(DirectoryStore::load(&dir), Err(StoreError::Io(_))));
    }
}
