//! Rendering seam between content markup and feed output.
//!
//! The bundled [`MarkdownRenderer`] uses `pulldown-cmark` and builds the
//! entry body directly as an XML tree instead of an HTML string, so whatever
//! the markdown contains, the result embeds as well-formed XHTML. Inline and
//! block HTML is parsed into elements; fragments that do not parse are kept
//! as escaped text.
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::Reader;
use thiserror::Error;

use crate::feed::xml::{Element, Node};
use crate::store::ContentRecord;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to render '{id}': {reason}")]
    Failed { id: String, reason: String },
}

/// Converts record markup into feed-embeddable output.
pub trait Renderer: Send + Sync {
    /// Renders markup to plain text, for fields such as the feed title.
    fn render_plain(&self, markup: &str) -> Result<String, RenderError>;

    /// Renders a record's body to XHTML nodes.
    ///
    /// The caller places the nodes inside an XHTML-namespaced `div`.
    fn render_tree(&self, record: &ContentRecord) -> Result<Vec<Node>, RenderError>;
}

/// CommonMark renderer with the GitHub-style extensions most blogs rely on.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer {
    options: Options,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS,
        }
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for MarkdownRenderer {
    fn render_plain(&self, markup: &str) -> Result<String, RenderError> {
        let mut out = String::new();
        // Next item number per open list; `None` for bullet lists
        let mut lists: Vec<Option<u64>> = Vec::new();
        for event in Parser::new_ext(markup, self.options) {
            match event {
                Event::Text(t) | Event::Code(t) => out.push_str(&t),
                Event::SoftBreak | Event::HardBreak => out.push(' '),
                Event::Start(Tag::List(start)) => lists.push(start),
                Event::End(TagEnd::List(_)) => {
                    lists.pop();
                }
                Event::Start(Tag::Item) => match lists.last_mut() {
                    Some(Some(number)) => {
                        out.push_str(&format!("{}. ", number));
                        *number += 1;
                    }
                    _ => out.push_str("- "),
                },
                Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item) => out.push(' '),
                _ => {}
            }
        }
        Ok(out.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    fn render_tree(&self, record: &ContentRecord) -> Result<Vec<Node>, RenderError> {
        let mut tree = TreeBuilder::default();
        let mut in_table_head = false;

        for event in Parser::new_ext(&record.text, self.options) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    tree.open(Element::new("pre"));
                    let code = match kind {
                        CodeBlockKind::Fenced(info) => match info.split_whitespace().next() {
                            Some(lang) => {
                                Element::new("code").attr("class", format!("language-{}", lang))
                            }
                            None => Element::new("code"),
                        },
                        CodeBlockKind::Indented => Element::new("code"),
                    };
                    tree.open(code);
                }
                Event::Start(Tag::TableHead) => {
                    in_table_head = true;
                    tree.open(Element::new("thead"));
                    tree.open(Element::new("tr"));
                }
                Event::Start(Tag::TableCell) => {
                    tree.open(Element::new(if in_table_head { "th" } else { "td" }));
                }
                Event::Start(tag) => tree.open(element_for(tag)),
                Event::End(TagEnd::CodeBlock) => {
                    tree.close();
                    tree.close();
                }
                Event::End(TagEnd::TableHead) => {
                    in_table_head = false;
                    tree.close();
                    tree.close();
                }
                Event::End(_) => tree.close(),
                Event::Text(t) => tree.push(Node::Text(t.to_string())),
                Event::Html(t) | Event::InlineHtml(t) => push_html(&mut tree, &record.id, &t),
                Event::Code(t) => tree.push(Element::new("code").text(t.to_string()).into()),
                Event::FootnoteReference(label) => tree.push(
                    Element::new("sup")
                        .attr("class", "footnote-reference")
                        .child(
                            Element::new("a")
                                .attr("href", format!("#{}", label))
                                .text(label.to_string()),
                        )
                        .into(),
                ),
                Event::SoftBreak => tree.push(Node::Text("\n".to_string())),
                Event::HardBreak => tree.push(Element::new("br").into()),
                Event::Rule => tree.push(Element::new("hr").into()),
                Event::TaskListMarker(checked) => {
                    let input = Element::new("input")
                        .attr("type", "checkbox")
                        .attr("disabled", "disabled");
                    let input = if checked {
                        input.attr("checked", "checked")
                    } else {
                        input
                    };
                    tree.push(input.into());
                }
                _ => {}
            }
        }

        let nodes = tree.finish();
        tracing::trace!(id = %record.id, nodes = nodes.len(), "Rendered record body");
        Ok(nodes)
    }
}

fn element_for(tag: Tag<'_>) -> Element {
    match tag {
        Tag::Paragraph => Element::new("p"),
        Tag::Heading { level, .. } => Element::new(format!("h{}", level as usize)),
        Tag::BlockQuote(_) => Element::new("blockquote"),
        Tag::List(Some(start)) if start != 1 => {
            Element::new("ol").attr("start", start.to_string())
        }
        Tag::List(Some(_)) => Element::new("ol"),
        Tag::List(None) => Element::new("ul"),
        Tag::Item => Element::new("li"),
        Tag::FootnoteDefinition(label) => Element::new("div")
            .attr("class", "footnote-definition")
            .attr("id", label.to_string()),
        Tag::Table(_) => Element::new("table"),
        Tag::TableRow => Element::new("tr"),
        Tag::Emphasis => Element::new("em"),
        Tag::Strong => Element::new("strong"),
        Tag::Strikethrough => Element::new("del"),
        Tag::Link {
            dest_url, title, ..
        } => with_title(Element::new("a").attr("href", dest_url.to_string()), &title),
        Tag::Image {
            dest_url, title, ..
        } => with_title(Element::new("img").attr("src", dest_url.to_string()), &title),
        _ => Element::new("div"),
    }
}

fn with_title(element: Element, title: &str) -> Element {
    if title.is_empty() {
        element
    } else {
        element.attr("title", title)
    }
}

/// Stack of open elements; closing one appends it to its parent.
///
/// Elements opened by HTML tags are flagged so a markdown end event closes
/// whatever HTML was left open inside its element first.
#[derive(Default)]
struct TreeBuilder {
    open: Vec<(Element, bool)>,
    roots: Vec<Node>,
}

impl TreeBuilder {
    fn open(&mut self, element: Element) {
        self.open.push((element, false));
    }

    fn open_html(&mut self, element: Element) {
        self.open.push((element, true));
    }

    fn push(&mut self, node: Node) {
        match self.open.pop() {
            Some((parent, from_html)) => self.open.push((parent.child(node), from_html)),
            None => self.roots.push(node),
        }
    }

    /// Closes the innermost markdown element.
    fn close(&mut self) {
        while matches!(self.open.last(), Some((_, true))) {
            self.close_top();
        }
        self.close_top();
    }

    /// Closes the HTML element `name` and any HTML opened inside it.
    ///
    /// End tags with no matching open HTML element are dropped.
    fn close_html(&mut self, name: &str) {
        let depth = self
            .open
            .iter()
            .rev()
            .take_while(|(_, from_html)| *from_html)
            .position(|(element, _)| element.name() == name);
        match depth {
            Some(depth) => {
                for _ in 0..=depth {
                    self.close_top();
                }
            }
            None => {
                tracing::trace!(tag = name, "Dropping unmatched HTML end tag");
            }
        }
    }

    fn close_top(&mut self) {
        if let Some((element, from_html)) = self.open.pop() {
            let element = if !from_html && element.name() == "img" {
                image_with_alt(element)
            } else {
                element
            };
            self.push(element.into());
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while !self.open.is_empty() {
            self.close_top();
        }
        self.roots
    }
}

/// HTML elements that never take an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// One piece of an HTML fragment, in document order.
enum HtmlToken {
    Open(Element),
    Void(Element),
    Close(String),
    Text(String),
}

/// Adds a raw HTML fragment to the tree.
///
/// The fragment is tokenized up front, so one that fails to parse is added
/// as escaped text without leaving half of it applied.
fn push_html(tree: &mut TreeBuilder, id: &str, fragment: &str) {
    let tokens = match html_tokens(fragment) {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::debug!(id = %id, error = %e, "Keeping unparseable HTML as text");
            tree.push(Node::Text(fragment.to_string()));
            return;
        }
    };

    for token in tokens {
        match token {
            HtmlToken::Open(element) => tree.open_html(element),
            HtmlToken::Void(element) => tree.push(element.into()),
            HtmlToken::Close(name) => tree.close_html(&name),
            HtmlToken::Text(text) => tree.push(Node::Text(text)),
        }
    }
}

fn html_tokens(fragment: &str) -> Result<Vec<HtmlToken>, quick_xml::Error> {
    let mut reader = Reader::from_str(fragment);
    // Markdown splits HTML at arbitrary tag boundaries
    reader.config_mut().check_end_names = false;
    reader.config_mut().allow_unmatched_ends = true;

    let mut tokens = Vec::new();
    loop {
        match reader.read_event()? {
            XmlEvent::Start(e) => {
                let element = html_element(&e)?;
                if is_void(element.name()) {
                    tokens.push(HtmlToken::Void(element));
                } else {
                    tokens.push(HtmlToken::Open(element));
                }
            }
            XmlEvent::Empty(e) => tokens.push(HtmlToken::Void(html_element(&e)?)),
            XmlEvent::End(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                if !is_void(&name) {
                    tokens.push(HtmlToken::Close(name));
                }
            }
            XmlEvent::Text(t) => {
                // HTML-only entities such as &nbsp; stay as written
                let text = match t.unescape() {
                    Ok(text) => text.into_owned(),
                    Err(_) => String::from_utf8_lossy(&t).into_owned(),
                };
                tokens.push(HtmlToken::Text(text));
            }
            XmlEvent::CData(c) => {
                tokens.push(HtmlToken::Text(String::from_utf8_lossy(&c).into_owned()));
            }
            XmlEvent::Eof => break,
            // Comments, doctypes and processing instructions are dropped
            _ => {}
        }
    }
    Ok(tokens)
}

fn html_element(start: &BytesStart<'_>) -> Result<Element, quick_xml::Error> {
    let name = String::from_utf8_lossy(start.name().as_ref()).to_ascii_lowercase();
    let mut element = Element::new(name);
    for attr in start.html_attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
        let value = match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        };
        element = element.attr(key, value);
    }
    Ok(element)
}

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Moves an image's collected caption text into its `alt` attribute.
fn image_with_alt(image: Element) -> Element {
    let alt = image.text_content();
    image
        .attributes()
        .iter()
        .fold(Element::new("img"), |img, (k, v)| img.attr(k.as_str(), v.as_str()))
        .attr("alt", alt)
}
