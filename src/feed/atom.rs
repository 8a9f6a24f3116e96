use super::entry::EntryMetadata;
use super::metadata::FeedMetadata;
use super::xml::{to_xml_string, Element};
use super::FeedError;
use crate::render::Renderer;

pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Declaration line written ahead of every feed document.
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

/// Builds the Atom document tree and serializes it.
pub struct FeedAssembler<'a, R> {
    renderer: &'a R,
}

impl<'a, R: Renderer> FeedAssembler<'a, R> {
    pub fn new(renderer: &'a R) -> Self {
        Self { renderer }
    }

    /// Serializes the feed, entries in the order given.
    pub fn assemble(
        &self,
        feed: &FeedMetadata,
        entries: impl IntoIterator<Item = EntryMetadata>,
    ) -> Result<String, FeedError> {
        let root = self.feed_element(feed, entries)?;
        let body = to_xml_string(&root).map_err(|e| FeedError::Serialize(e.to_string()))?;
        Ok(format!("{}{}", XML_DECLARATION, body))
    }

    /// The `<feed>` element with its header and one `<entry>` per item.
    ///
    /// Title and subtitle go through the renderer's plain-text mode; entry
    /// titles are used as stored.
    pub fn feed_element(
        &self,
        feed: &FeedMetadata,
        entries: impl IntoIterator<Item = EntryMetadata>,
    ) -> Result<Element, FeedError> {
        let title = self.renderer.render_plain(&feed.title)?;
        let subtitle = self.renderer.render_plain(&feed.subtitle)?;

        let header = Element::new("feed")
            .attr("xmlns", ATOM_NAMESPACE)
            .child(Element::new("title").text(title))
            .child(Element::new("subtitle").text(subtitle))
            .child(
                Element::new("link")
                    .attr("href", feed.feed_href.as_str())
                    .attr("rel", "self"),
            )
            .child(Element::new("link").attr("href", feed.site_href.as_str()))
            .child(author(&feed.author))
            .child(Element::new("id").text(feed.uuid.as_str()))
            .child(Element::new("updated").text(feed.updated.as_str()));

        Ok(entries
            .into_iter()
            .fold(header, |root, entry| root.child(entry_element(entry))))
    }
}

fn entry_element(entry: EntryMetadata) -> Element {
    let content = Element::new("content").attr("type", "xhtml").child(
        Element::new("div")
            .attr("xmlns", XHTML_NAMESPACE)
            .children(entry.rendered_body),
    );

    Element::new("entry")
        .child(Element::new("title").text(entry.title))
        .child(Element::new("link").attr("href", entry.permalink_href))
        .child(
            Element::new("link")
                .attr("rel", "alternate")
                .attr("type", "text/html")
                .attr("href", entry.static_href),
        )
        .child(Element::new("id").text(entry.uuid))
        .child(Element::new("updated").text(entry.updated))
        .optional_child(entry.summary.map(|s| Element::new("summary").text(s)))
        .child(content)
        .child(author(&entry.author))
}

fn author(name: &str) -> Element {
    Element::new("author").child(Element::new("name").text(name))
}
