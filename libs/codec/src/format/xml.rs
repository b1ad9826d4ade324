//! XML boundary adapter
//!
//! XML has no native types at all, so attribute and text values follow
//! the suffix grammar like any text-only target. The element model is
//! attrs plus either a scalar value or a child map; repeated sibling tags
//! collapse to arrays on parse and expand back on emit. Standard entity
//! escaping applies in both directions.

use crate::error::{CodecError, CodecResult};
use crate::format::text::{from_typed_text, to_typed_text};
use crate::hydrate::HydrateContext;
use std::fmt::Write as _;
use tytx_types::TytxValue;

/// One parsed XML element
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    /// Attributes in document order, values hydrated
    pub attrs: Vec<(String, TytxValue)>,
    pub content: XmlContent,
}

/// Element content: scalar text or a child map
#[derive(Debug, Clone, PartialEq)]
pub enum XmlContent {
    Empty,
    /// Hydrated text content
    Value(TytxValue),
    /// Child elements grouped by tag; a group of more than one element
    /// is the collapsed form of repeated siblings
    Children(Vec<(String, Vec<XmlElement>)>),
}

impl XmlElement {
    /// Child group by tag name
    pub fn children(&self, tag: &str) -> &[XmlElement] {
        match &self.content {
            XmlContent::Children(groups) => groups
                .iter()
                .find(|(t, _)| t == tag)
                .map(|(_, elems)| elems.as_slice())
                .unwrap_or(&[]),
            _ => &[],
        }
    }

    /// Attribute value by name
    pub fn attr(&self, name: &str) -> Option<&TytxValue> {
        self.attrs.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Parse an XML document into the element model
///
/// Returns the root tag and the hydrated root element.
pub fn parse_document(
    text: &str,
    ctx: &HydrateContext<'_>,
) -> CodecResult<(String, XmlElement)> {
    let doc = roxmltree::Document::parse(text).map_err(|e| CodecError::xml(e.to_string()))?;
    let root = doc.root_element();
    Ok((root.tag_name().name().to_string(), convert(root, ctx)?))
}

fn convert(node: roxmltree::Node<'_, '_>, ctx: &HydrateContext<'_>) -> CodecResult<XmlElement> {
    let mut attrs = Vec::new();
    for attr in node.attributes() {
        attrs.push((attr.name().to_string(), from_typed_text(attr.value(), ctx)?));
    }

    let mut groups: Vec<(String, Vec<XmlElement>)> = Vec::new();
    for child in node.children().filter(|c| c.is_element()) {
        let tag = child.tag_name().name().to_string();
        let element = convert(child, ctx)?;
        match groups.iter_mut().find(|(t, _)| *t == tag) {
            Some((_, elems)) => elems.push(element),
            None => groups.push((tag, vec![element])),
        }
    }

    let content = if !groups.is_empty() {
        XmlContent::Children(groups)
    } else {
        let text: String = node
            .children()
            .filter_map(|c| c.text())
            .collect::<String>();
        if text.trim().is_empty() {
            XmlContent::Empty
        } else {
            XmlContent::Value(from_typed_text(text.trim(), ctx)?)
        }
    };

    Ok(XmlElement { attrs, content })
}

/// Emit an element as XML text with entity escaping
pub fn emit_document(tag: &str, element: &XmlElement, ctx: &HydrateContext<'_>) -> String {
    let mut out = String::new();
    write_element(&mut out, tag, element, ctx);
    out
}

fn write_element(out: &mut String, tag: &str, element: &XmlElement, ctx: &HydrateContext<'_>) {
    let _ = write!(out, "<{tag}");
    for (name, value) in &element.attrs {
        let _ = write!(out, " {}=\"{}\"", name, escape_attr(&to_typed_text(value, ctx)));
    }
    match &element.content {
        XmlContent::Empty => {
            let _ = write!(out, "/>");
        }
        XmlContent::Value(value) => {
            let _ = write!(out, ">{}</{tag}>", escape_text(&to_typed_text(value, ctx)));
        }
        XmlContent::Children(groups) => {
            let _ = write!(out, ">");
            for (child_tag, elements) in groups {
                for child in elements {
                    write_element(out, child_tag, child, ctx);
                }
            }
            let _ = write!(out, "</{tag}>");
        }
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
