//! Generic XML element tree for vCD entity representations.
//!
//! vCD returns namespaced XML for every entity and query result. Rather than
//! one serde type per representation, responses are parsed into a plain
//! element tree keyed by local name, and callers do explicit presence checks
//! (`child` / `attr` return `Option`).

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{VcloudError, VcloudResult};

/// One XML element: local name, attributes, direct text, child elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    /// Local element name with any namespace prefix stripped.
    pub name: String,
    /// Attributes under their document names (`href`, `name`, `status`, …).
    pub attributes: HashMap<String, String>,
    /// Concatenated direct text content, entity-unescaped.
    pub text: String,
    /// Child elements in document order.
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Parse an XML document into its root element.
    pub fn parse(xml: &str) -> VcloudResult<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    stack.push(Self::from_tag(e));
                }
                Ok(Event::Empty(ref e)) => {
                    let element = Self::from_tag(e);
                    attach(&mut stack, &mut root, element);
                }
                Ok(Event::Text(ref e)) => {
                    if let Some(current) = stack.last_mut() {
                        let text = e.unescape().unwrap_or_default();
                        current.text.push_str(&text);
                    }
                }
                Ok(Event::CData(ref e)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(e));
                    }
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| VcloudError::parse("unbalanced closing tag"))?;
                    attach(&mut stack, &mut root, element);
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(VcloudError::from(e)),
            }
            buf.clear();
        }

        root.ok_or_else(|| VcloudError::parse("document contains no root element"))
    }

    fn from_tag(tag: &BytesStart<'_>) -> Self {
        let mut attributes = HashMap::new();
        for attr in tag.attributes().flatten() {
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr
                .unescape_value()
                .map(|v| v.to_string())
                .unwrap_or_default();
            attributes.insert(key, value);
        }
        Self {
            name: local_name(tag.name().as_ref()),
            attributes,
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Attribute value, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// First direct child with the given local name, in document order.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given local name, in document order.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text content of the first direct child with the given name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }
}

fn attach(stack: &mut Vec<XmlElement>, root: &mut Option<XmlElement>, element: XmlElement) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    }
}

/// Extract the local name from a possibly-namespaced XML tag.
fn local_name(raw: &[u8]) -> String {
    let full = String::from_utf8_lossy(raw);
    full.rsplit(':').next().unwrap_or(&full).to_string()
}
