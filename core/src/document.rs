//! Owned XML tree handed from the transport to the mapper.
//!
//! # Design
//! The transport parses the response body once into an `XmlNode` tree and
//! returns it as plain data. The mapper only walks this tree, so it never
//! depends on the XML library's event API and a test double can build a
//! document by hand or from a fixture string.
//!
//! Element and attribute names are stored by local name: namespace prefixes
//! are dropped at parse time.

use std::borrow::Cow;
use std::fmt;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::TransportError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    /// Raw character data directly inside this element, CDATA included.
    /// Whitespace is kept; `child_text` trims the joined value.
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a `<name>text</name>` leaf child.
    pub fn with_field(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut leaf = XmlNode::new(name);
        leaf.text = text.into();
        self.children.push(leaf);
        self
    }

    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    /// Parse a complete XML document and return its root element.
    ///
    /// Any well-formedness failure is reported as `TransportError::Malformed`.
    pub fn parse(xml: &str) -> Result<Self, TransportError> {
        let mut reader = Reader::from_str(xml);

        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            match reader.read_event().map_err(malformed)? {
                Event::Start(start) => stack.push(open(&start)?),
                Event::Empty(start) => {
                    let node = open(&start)?;
                    attach(&mut stack, &mut root, node)?;
                }
                Event::End(_) => {
                    let node = stack
                        .pop()
                        .ok_or_else(|| malformed("unbalanced end tag"))?;
                    attach(&mut stack, &mut root, node)?;
                }
                Event::Text(text) => {
                    if let Some(node) = stack.last_mut() {
                        node.text.push_str(&text.unescape().map_err(malformed)?);
                    }
                }
                Event::CData(data) => {
                    if let Some(node) = stack.last_mut() {
                        node.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(malformed(format!("unclosed element <{}>", open.name)));
        }
        root.ok_or_else(|| malformed("document has no root element"))
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Trimmed text of the first direct child with the given name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.trim())
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All top-most descendants named `name`, in document order.
    ///
    /// A matching node is not searched for further matches of the same name,
    /// so nested repetitions belong to their outer match.
    pub fn find_all(&self, name: &str) -> Vec<&XmlNode> {
        let mut found = Vec::new();
        collect(&self.children, name, &mut found);
        found
    }
}

fn collect<'a>(nodes: &'a [XmlNode], name: &str, found: &mut Vec<&'a XmlNode>) {
    for node in nodes {
        if node.name == name {
            found.push(node);
        } else {
            collect(&node.children, name, found);
        }
    }
}

fn open(start: &BytesStart<'_>) -> Result<XmlNode, TransportError> {
    let mut node = XmlNode::new(utf8(start.local_name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(malformed)?;
        let value = attr.unescape_value().map_err(malformed)?;
        node.attributes
            .push((utf8(attr.key.local_name().as_ref()).into_owned(), value.into_owned()));
    }
    Ok(node)
}

fn attach(
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
    node: XmlNode,
) -> Result<(), TransportError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => return Err(malformed("multiple root elements")),
    }
    Ok(())
}

fn utf8(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

fn malformed(err: impl fmt::Display) -> TransportError {
    TransportError::Malformed(err.to_string())
}
