//! Minimal owned XML tree with a consuming builder.
//!
//! Trees are assembled bottom-up from finished values:
//!
//! ```
//! use atomfeed::feed::xml::{to_xml_string, Element};
//!
//! let link = Element::new("link").attr("href", "https://example.com/");
//! let feed = Element::new("feed").child(Element::new("title").text("Hi")).child(link);
//!
//! assert_eq!(
//!     to_xml_string(&feed).unwrap(),
//!     r#"<feed><title>Hi</title><link href="https://example.com/"></link></feed>"#
//! );
//! ```
//!
//! Serialization never collapses an element into `<x/>`: every element gets
//! an explicit start and end tag, including HTML void elements such as `br`.
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::util::strip_invalid_xml_chars;

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Node {
    /// Concatenated text of this node and all its descendants.
    pub fn text_content(&self) -> String {
        match self {
            Node::Text(t) => t.clone(),
            Node::Element(e) => e.text_content(),
        }
    }
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Adds an attribute. Attributes serialize in insertion order.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Appends a text child. Empty text adds nothing.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.is_empty() {
            self.children.push(Node::Text(text));
        }
        self
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Appends `child` only when it is `Some`.
    pub fn optional_child(self, child: Option<Element>) -> Self {
        match child {
            Some(child) => self.child(child),
            None => self,
        }
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn child_nodes(&self) -> &[Node] {
        &self.children
    }

    /// Child elements, skipping text nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    pub fn text_content(&self) -> String {
        self.children.iter().map(Node::text_content).collect()
    }
}

/// Serializes a tree to a compact XML string (no declaration, no indentation).
///
/// Text and attribute values are escaped, and characters XML 1.0 forbids are
/// dropped.
pub fn to_xml_string(root: &Element) -> Result<String, std::io::Error> {
    let mut writer = Writer::new(Vec::new());
    write_element(&mut writer, root)?;
    String::from_utf8(writer.into_inner())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), std::io::Error> {
    let mut start = BytesStart::new(element.name.as_str());
    for (name, value) in &element.attributes {
        let value = strip_invalid_xml_chars(value);
        start.push_attribute((name.as_str(), &*value));
    }
    writer.write_event(Event::Start(start)).map_err(into_io)?;

    for child in &element.children {
        match child {
            Node::Element(e) => write_element(writer, e)?,
            Node::Text(t) => {
                let text = strip_invalid_xml_chars(t);
                writer
                    .write_event(Event::Text(BytesText::new(&text)))
                    .map_err(into_io)?;
            }
        }
    }

    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(into_io)
}

/// Normalizes the writer's error type, which differs between quick-xml releases.
fn into_io<E: std::fmt::Display>(err: E) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}
