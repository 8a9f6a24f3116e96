//! Atom feed generation for markdown content stores.
//!
//! - [`feed`] - metadata resolution, entry resolution and document assembly
//! - [`store`] - the content store seam, with in-memory and directory stores
//! - [`render`] - markdown to plain text and XHTML trees
//! - [`config`] - `atomfeed.toml` loading
//! - [`util`] - URL joining, timestamps and identifiers

pub mod config;
pub mod feed;
pub mod output;
pub mod render;
pub mod store;
pub mod util;
