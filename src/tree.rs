//! A small owned element tree built from `xml-rs` events.
//!
//! TMX files have to be walked out of document order (layers before
//! tilesets), so the whole document is folded into a tree first.

use std::io::Read;

use xml::attribute::OwnedAttribute;
use xml::reader::{EventReader, XmlEvent};

use crate::error::{Result, TiledError};

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<OwnedAttribute>,
    pub children: Vec<Element>,
    /// Concatenated character and CDATA content, whitespace-only runs excluded.
    pub text: String,
}

impl Element {
    /// Reads a whole document and returns its root element.
    pub fn parse<R: Read>(reader: R) -> Result<Element> {
        let mut parser = EventReader::new(reader);
        let mut stack: Vec<Element> = Vec::new();
        loop {
            match parser.next()? {
                XmlEvent::StartElement {
                    name, attributes, ..
                } => stack.push(Element {
                    name: name.local_name,
                    attributes,
                    ..Element::default()
                }),
                XmlEvent::EndElement { .. } => {
                    let finished = stack.pop().ok_or_else(|| {
                        TiledError::PrematureEnd("Unbalanced closing tag.".to_string())
                    })?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(finished),
                        None => return Ok(finished),
                    }
                }
                XmlEvent::Characters(s) | XmlEvent::CData(s) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&s);
                    }
                }
                XmlEvent::EndDocument => {
                    return Err(TiledError::PrematureEnd(
                        "Document ended before the root element was closed.".to_string(),
                    ))
                }
                _ => {}
            }
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.local_name == name)
            .map(|a| a.value.as_str())
    }

    /// First child with the given tag name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_tree() {
        let root = Element::parse(
            r#"<?xml version="1.0"?>
            <map width="2"><layer name="a"><data>1,2</data></layer><layer name="b"/></map>"#
                .as_bytes(),
        )
        .unwrap();
        assert_eq!(root.name, "map");
        assert_eq!(root.attr("width"), Some("2"));
        assert_eq!(root.children_named("layer").count(), 2);
        let data = root.child("layer").and_then(|l| l.child("data")).unwrap();
        assert_eq!(data.text, "1,2");
    }

    #[test]
    fn missing_attribute_is_none() {
        let root = Element::parse("<tileset/>".as_bytes()).unwrap();
        assert_eq!(root.attr("source"), None);
        assert!(root.child("image").is_none());
    }

    #[test]
    fn truncated_document_fails() {
        assert!(Element::parse("<map><layer>".as_bytes()).is_err());
    }
}
