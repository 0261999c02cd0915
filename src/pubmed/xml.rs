//! Minimal streaming element tree over quick-xml.
//!
//! The document root is validated up front, then its direct children are materialized one
//! subtree at a time. Only element names, text, and CDATA are kept; attributes, comments, and
//! processing instructions are dropped.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::types::ExtractError;

/// Node inside a materialized subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// Element with its name and ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct XmlElement {
    pub(crate) name: String,
    pub(crate) children: Vec<XmlNode>,
}

impl XmlElement {
    fn named(name: String) -> Self {
        Self {
            name,
            children: Vec::new(),
        }
    }

    /// Direct child elements in document order.
    pub(crate) fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// First direct child with the given name.
    pub(crate) fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|element| element.name == name)
    }

    /// First descendant (excluding `self`) with the given name, in document order.
    pub(crate) fn descendant(&self, name: &str) -> Option<&XmlElement> {
        for element in self.elements() {
            if element.name == name {
                return Some(element);
            }
            if let Some(found) = element.descendant(name) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants (excluding `self`) with the given name, in document order.
    pub(crate) fn descendants<'a>(&'a self, name: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        for element in self.elements() {
            if element.name == name {
                found.push(element);
            }
            element.collect_descendants(name, found);
        }
    }

    /// Concatenated text of this element and all of its descendants.
    pub(crate) fn text_content(&self) -> String {
        let mut text = String::new();
        self.push_text(&mut text);
        text
    }

    fn push_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(element) => element.push_text(out),
            }
        }
    }
}

/// Iterator-like reader over the direct children of a validated root element.
pub(crate) struct ChildElements<'a> {
    reader: Reader<&'a [u8]>,
    root: String,
    finished: bool,
}

impl<'a> ChildElements<'a> {
    /// Position the reader inside the root element, failing if its tag differs from `expected`.
    pub(crate) fn open(xml: &'a [u8], expected: &'static str) -> Result<Self, ExtractError> {
        let mut reader = Reader::from_reader(xml);

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    let root = element_name(&start);
                    ensure_root(&root, expected)?;
                    return Ok(Self {
                        reader,
                        root,
                        finished: false,
                    });
                }
                Event::Empty(start) => {
                    let root = element_name(&start);
                    ensure_root(&root, expected)?;
                    return Ok(Self {
                        reader,
                        root,
                        finished: true,
                    });
                }
                Event::Eof => return Err(ExtractError::MissingRoot),
                _ => {}
            }
        }
    }

    /// Materialize the next direct child of the root, or `None` once the root is closed.
    pub(crate) fn next_element(&mut self) -> Result<Option<XmlElement>, ExtractError> {
        if self.finished {
            return Ok(None);
        }

        loop {
            match self.reader.read_event()? {
                Event::Start(start) => {
                    let element = XmlElement::named(element_name(&start));
                    return read_subtree(&mut self.reader, element).map(Some);
                }
                Event::Empty(start) => {
                    return Ok(Some(XmlElement::named(element_name(&start))));
                }
                Event::End(_) => {
                    self.finished = true;
                    return Ok(None);
                }
                Event::Eof => return Err(ExtractError::UnexpectedEof(self.root.clone())),
                _ => {}
            }
        }
    }
}

fn ensure_root(found: &str, expected: &'static str) -> Result<(), ExtractError> {
    if found == expected {
        Ok(())
    } else {
        Err(ExtractError::UnexpectedRoot {
            found: found.to_string(),
            expected,
        })
    }
}

fn read_subtree(reader: &mut Reader<&[u8]>, root: XmlElement) -> Result<XmlElement, ExtractError> {
    let mut stack = vec![root];

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(XmlElement::named(element_name(&start))),
            Event::Empty(start) => {
                push_node(&mut stack, XmlNode::Element(XmlElement::named(element_name(&start))));
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(quick_xml::Error::from)?;
                if !text.is_empty() {
                    push_node(&mut stack, XmlNode::Text(text.into_owned()));
                }
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data).into_owned();
                push_node(&mut stack, XmlNode::Text(text));
            }
            Event::End(_) => {
                let Some(finished) = stack.pop() else {
                    return Err(ExtractError::UnexpectedEof(String::new()));
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Element(finished)),
                    None => return Ok(finished),
                }
            }
            Event::Eof => {
                let open = stack.last().map(|element| element.name.clone()).unwrap_or_default();
                return Err(ExtractError::UnexpectedEof(open));
            }
            _ => {}
        }
    }
}

fn push_node(stack: &mut [XmlElement], node: XmlNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}
