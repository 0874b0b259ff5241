// src/xml.rs

//! Minimal XML element tree
//!
//! The model converts to and from [`Element`] trees; this module is the only
//! place that talks to `quick-xml`. Comments, processing instructions and
//! the declaration are dropped while reading. Whitespace-only text between
//! child elements is discarded, text of leaf elements is kept verbatim.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Cursor;

use crate::error::{Error, Result};

/// One XML element with its attributes, text and children
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: add an attribute
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder: set the text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set or replace an attribute
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Look up an attribute by name
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Element name without any namespace prefix
    pub fn local_name(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map(|(_, local)| local)
            .unwrap_or(&self.name)
    }

    /// First child with the given local name
    pub fn child(&self, local_name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.local_name() == local_name)
    }

    /// All children with the given local name
    pub fn children_named<'a>(&'a self, local_name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children
            .iter()
            .filter(move |c| c.local_name() == local_name)
    }

    /// Text content, `None` when absent
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Serialize this element (no declaration)
    pub fn to_xml(&self, pretty: bool) -> Result<String> {
        let mut writer = if pretty {
            Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2)
        } else {
            Writer::new(Cursor::new(Vec::new()))
        };
        write_element(&mut writer, self)?;
        into_string(writer.into_inner().into_inner())
    }
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    let text = element.text.as_deref().filter(|t| !t.is_empty());
    if text.is_none() && element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(text) = text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

fn into_string(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|e| Error::Xml(quick_xml::Error::NonDecodable(Some(e.utf8_error()))))
}

/// Serialize a whole document
///
/// With `header` the XML declaration comes first; a `comment` is embedded as
/// an XML comment right after it. Literal `\n` sequences in the comment are
/// turned into newlines.
pub fn write_document(
    root: &Element,
    header: bool,
    comment: Option<&str>,
    pretty: bool,
) -> Result<String> {
    let mut out = String::new();
    if header {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        out.push_str(&into_string(writer.into_inner().into_inner())?);
        out.push('\n');
    }
    if let Some(comment) = comment {
        // "--" may not appear inside an XML comment
        let comment = comment.replace("\\n", "\n").replace("--", "- -");
        out.push_str("\n<!-- \n");
        out.push_str(&comment);
        out.push_str("\n-->\n\n");
    }
    out.push_str(&root.to_xml(pretty)?);
    out.push('\n');
    Ok(out)
}

/// Parse a document and return its root element
pub fn parse_document(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(start_element(&e)?),
            Event::Empty(e) => {
                let element = start_element(&e)?;
                close_element(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                if let Some(mut element) = stack.pop() {
                    if !element.children.is_empty()
                        && element.text.as_deref().is_some_and(|t| t.trim().is_empty())
                    {
                        element.text = None;
                    }
                    close_element(&mut stack, &mut root, element);
                }
            }
            Event::Text(t) => {
                if let Some(current) = stack.last_mut() {
                    let text = t.unescape()?;
                    current.text.get_or_insert_with(String::new).push_str(&text);
                }
            }
            Event::CData(c) => {
                if let Some(current) = stack.last_mut() {
                    let text = into_string(c.into_inner().into_owned())?;
                    current.text.get_or_insert_with(String::new).push_str(&text);
                }
            }
            Event::Eof => break,
            // Declaration, comments, processing instructions, doctype
            _ => {}
        }
    }

    root.ok_or_else(|| {
        let reason = "no root element".to_string();
        Error::Xml(quick_xml::Error::UnexpectedEof(reason))
    })
}

fn start_element(e: &BytesStart<'_>) -> Result<Element> {
    let name = into_string(e.name().as_ref().to_vec())?;
    let mut element = Element::new(name);
    for attr in e.attributes() {
        let attr = attr?;
        let key = into_string(attr.key.as_ref().to_vec())?;
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn close_element(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}
