//! Minimal XML tree for the simple measure document
//!
//! The QDM extractor joins clauses across distant parts of the document by
//! uuid, so the document is read into an owned element tree first instead of
//! being processed as a stream.

use indexmap::IndexMap;
use octofhir_qm_diagnostics::{Payload, QM0102, Result, TransferError};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// An XML element with its attributes, child elements and text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<XmlElement>,
    pub text: String,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Attribute value, if present and non-blank
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(|v| v.as_str())
            .filter(|v| !v.trim().is_empty())
    }

    /// First direct child named `name`
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Direct children named `name`
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// All descendants in document order, excluding `self`
    pub fn descendants(&self) -> Vec<&XmlElement> {
        let mut out = Vec::new();
        let mut stack: Vec<&XmlElement> = self.children.iter().rev().collect();
        while let Some(element) = stack.pop() {
            out.push(element);
            stack.extend(element.children.iter().rev());
        }
        out
    }

    /// First descendant named `name`
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        self.descendants().into_iter().find(|e| e.name == name)
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
        for attr in start.attributes() {
            let attr = attr.map_err(|e| malformed(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = unescape_lossy(&String::from_utf8_lossy(&attr.value));
            element.attributes.insert(key, value);
        }
        Ok(element)
    }
}

/// Parse an XML document into its root element
pub fn parse_document(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => stack.push(XmlElement::from_start(&e)?),
            Ok(Event::Empty(e)) => {
                let element = XmlElement::from_start(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| malformed("closing tag without matching opening tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&unescape_lossy(&String::from_utf8_lossy(&e)));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(malformed(format!(
                    "error at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(malformed(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| malformed("document has no root element"))
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    } else {
        return Err(malformed(format!("second root element <{}>", element.name)));
    }
    Ok(())
}

fn unescape_lossy(raw: &str) -> String {
    quick_xml::escape::unescape(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

fn malformed(message: impl Into<String>) -> TransferError {
    TransferError::malformed(QM0102, Payload::SimpleXml, message)
}
