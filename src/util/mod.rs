//! Utility functions shared by the feed resolvers.
//!
//! This module provides reusable utilities for:
//!
//! - **URL building**: slash-normalizing joins and component encoding
//! - **Timestamps**: lenient parsing and Atom-style formatting
//! - **Identifiers**: the [`Hasher`] seam that turns titles into stable ids
//! - **Text processing**: XML-safe text and word truncation
//!
//! # Examples
//!
//! ```
//! use atomfeed::util::{path_join, to_file_name, Hasher, Sha256Guid};
//!
//! let file = to_file_name("Hi there");
//! let href = path_join(&["https://example.com/", "static", file.as_str()]);
//! assert_eq!(href, "https://example.com/static/Hi%2520there.html");
//!
//! let id = Sha256Guid.hash("Hi there");
//! assert!(id.starts_with("urn:uuid:"));
//! ```

mod hash;
mod text;
mod time;
mod url;

pub use self::hash::{Hasher, Sha256Guid};
pub use self::text::{strip_invalid_xml_chars, truncate_words};
pub use self::time::{format_updated, parse_timestamp, to_iso_date};
pub use self::url::{
    path_join, percent_encode, to_file_name, to_permalink, validate_server_url,
    UrlValidationError,
};
