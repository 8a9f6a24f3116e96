use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;
use url::Url;

/// Characters escaped when a title becomes a URL component.
///
/// Leaves `A-Z a-z 0-9 - _ . ! ~ * ' ( )` untouched, which is the same
/// unreserved set browsers use for `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Errors that can occur while validating the feed server base URL.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL has no host component.
    #[error("URL has no host: {0}")]
    MissingHost(String),
}

/// Validates the base URL that feed and entry links are built from.
///
/// Unlike subscription URLs, a feed server may legitimately live on
/// localhost or a private network, so only the shape is checked: the URL
/// must parse, use `http`/`https`, and name a host.
///
/// # Examples
///
/// ```
/// use atomfeed::util::validate_server_url;
///
/// assert!(validate_server_url("https://example.com/blog/").is_ok());
/// assert!(validate_server_url("http://localhost:8080").is_ok());
/// assert!(validate_server_url("file:///var/www").is_err());
/// ```
pub fn validate_server_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlValidationError::MissingHost(url_str.to_owned()));
    }

    Ok(url)
}

/// Joins URL segments with `/` and collapses repeated slashes.
///
/// A run of slashes anywhere in the joined string becomes a single slash,
/// except the `//` directly after a scheme separator (`https://`), which is
/// kept as is.
///
/// # Examples
///
/// ```
/// use atomfeed::util::path_join;
///
/// assert_eq!(
///     path_join(&["https://site.example/", "/atom.xml"]),
///     "https://site.example/atom.xml"
/// );
/// assert_eq!(path_join(&["a//b", "c"]), "a/b/c");
/// ```
pub fn path_join<S: AsRef<str>>(parts: &[S]) -> String {
    let joined = parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("/");

    let (prefix, rest) = match scheme_end(&joined) {
        Some(end) => joined.split_at(end),
        None => ("", joined.as_str()),
    };

    let mut out = String::with_capacity(joined.len());
    out.push_str(prefix);
    // Slashes right after `scheme://` fold into the two already written
    let mut last_was_slash = !prefix.is_empty();
    for c in rest.chars() {
        if c == '/' {
            if last_was_slash {
                continue;
            }
            last_was_slash = true;
        } else {
            last_was_slash = false;
        }
        out.push(c);
    }
    out
}

/// Byte offset just past `scheme://`, if the string starts with one.
fn scheme_end(s: &str) -> Option<usize> {
    let colon = s.find("://")?;
    let scheme = &s[..colon];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        return None;
    }
    Some(colon + 3)
}

/// Percent-encodes a string as a single URL component.
pub fn percent_encode(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Fragment pointing at an item within the site, e.g. `#Hello%20World`.
pub fn to_permalink(title: &str) -> String {
    format!("#{}", percent_encode(title))
}

/// File name of an item's pre-rendered static page.
///
/// Encoded twice: the static file server decodes request paths once before
/// looking up the file, and the files on disk carry the once-encoded title.
pub fn to_file_name(title: &str) -> String {
    format!("{}.html", percent_encode(&percent_encode(title)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_keeps_scheme_slashes() {
        assert_eq!(
            path_join(&["https://site.example/", "/atom.xml"]),
            "https://site.example/atom.xml"
        );
    }

    #[test]
    fn test_join_collapses_runs() {
        assert_eq!(
            path_join(&["http://example.com//blog///", "static", "x.html"]),
            "http://example.com/blog/static/x.html"
        );
    }

    #[test]
    fn test_join_collapses_extra_scheme_slashes() {
        assert_eq!(path_join(&["https:///example.com", "a"]), "https://example.com/a");
    }

    #[test]
    fn test_join_without_scheme() {
        assert_eq!(path_join(&["", "atom.xml"]), "/atom.xml");
        assert_eq!(path_join(&["a", "b"]), "a/b");
    }

    #[test]
    fn test_join_fragment() {
        assert_eq!(
            path_join(&["https://example.com/", "#Hello"]),
            "https://example.com/#Hello"
        );
    }

    #[test]
    fn test_join_not_a_scheme() {
        // "1x" is not a valid scheme, so its slashes collapse like any other
        assert_eq!(path_join(&["1x://a", "b"]), "1x:/a/b");
    }

    #[test]
    fn test_percent_encode_component_set() {
        assert_eq!(percent_encode("Hello World"), "Hello%20World");
        assert_eq!(percent_encode("a/b?c=d&e"), "a%2Fb%3Fc%3Dd%26e");
        assert_eq!(percent_encode("-_.!~*'()"), "-_.!~*'()");
        assert_eq!(percent_encode("café"), "caf%C3%A9");
    }

    #[test]
    fn test_permalink() {
        assert_eq!(to_permalink("Hello World"), "#Hello%20World");
    }

    #[test]
    fn test_file_name_is_double_encoded() {
        assert_eq!(to_file_name("Hello"), "Hello.html");
        assert_eq!(to_file_name("Hello World"), "Hello%2520World.html");
        assert_eq!(to_file_name("50%"), "50%2525.html");
    }

    #[test]
    fn test_validate_server_url() {
        assert!(validate_server_url("https://example.com").is_ok());
        assert!(validate_server_url("http://127.0.0.1:8080/wiki/").is_ok());
        assert!(matches!(
            validate_server_url("ftp://example.com"),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            validate_server_url("not a url"),
            Err(UrlValidationError::InvalidUrl(_))
        ));
    }
}
