//! Minimal namespace-aware XML tree used for DAV response bodies.
//!
//! Property values in a multistatus response are often structured (resource
//! types, href sets, sharing invites), so they are kept as [`XmlNode`]s and
//! queried structurally instead of being flattened to strings.

use quick_xml::NsReader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

use crate::error::ParseError;
use crate::webdav::property::{NS_DAV, PropertyName};

pub fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// An element with its resolved name, attributes, child elements and the
/// concatenated character data directly inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    pub name: PropertyName,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    pub text: String,
}

impl XmlNode {
    pub fn new(name: PropertyName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children: Vec::new(),
            text: String::new(),
        }
    }

    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.name.is(namespace, local_name)
    }

    pub fn child(&self, namespace: &str, local_name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.is(namespace, local_name))
    }

    pub fn children_named<'a>(
        &'a self,
        namespace: &str,
        local_name: &str,
    ) -> impl Iterator<Item = &'a XmlNode> {
        self.children
            .iter()
            .filter(move |c| c.is(namespace, local_name))
    }

    /// True when a direct child with that name exists, e.g. a resourcetype flag.
    pub fn has_child(&self, namespace: &str, local_name: &str) -> bool {
        self.child(namespace, local_name).is_some()
    }

    pub fn attribute(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == local_name)
            .map(|(_, v)| v.as_str())
    }

    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }

    /// Non-empty `{DAV:}href` children, trimmed, in document order.
    pub fn hrefs(&self) -> Vec<String> {
        self.children_named(NS_DAV, "href")
            .map(|h| h.trimmed_text())
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn href(&self) -> Option<String> {
        self.hrefs().into_iter().next()
    }

    /// Every descendant reached by following `path` one child level per step.
    pub fn select<'a>(&'a self, path: &[(&str, &str)]) -> Vec<&'a XmlNode> {
        let mut current = vec![self];
        for (namespace, local_name) in path {
            current = current
                .into_iter()
                .flat_map(|node| node.children_named(namespace, local_name))
                .collect();
        }
        current
    }
}

/// Parse a complete XML document into its root element.
pub fn parse_document(raw: &[u8]) -> Result<XmlNode, ParseError> {
    let mut reader = NsReader::from_reader(raw);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::with_capacity(8 * 1024);
    let mut stack: Vec<XmlNode> = Vec::with_capacity(16);
    let mut root: Option<XmlNode> = None;

    loop {
        let (resolved, event) = reader
            .read_resolved_event_into(&mut buf)
            .map_err(ParseError::xml)?;
        match event {
            Event::Start(e) => {
                let node = open_node(&resolved, &e)?;
                stack.push(node);
            }
            Event::Empty(e) => {
                let node = open_node(&resolved, &e)?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| ParseError::Xml("unbalanced end tag".to_string()))?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&decode_text(e.as_ref())?);
                }
            }
            Event::CData(e) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::GeneralRef(e) => {
                if let Some(top) = stack.last_mut() {
                    if let Some(ch) = e.resolve_char_ref().map_err(ParseError::xml)? {
                        top.text.push(ch);
                    } else {
                        let entity = e.decode().map_err(ParseError::xml)?;
                        let value = resolve_predefined_entity(&entity).ok_or_else(|| {
                            ParseError::Xml(format!("unknown entity &{entity};"))
                        })?;
                        top.text.push_str(value);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(ParseError::Xml("unexpected end of document".to_string()));
    }
    root.ok_or(ParseError::Empty)
}

fn open_node(resolved: &ResolveResult<'_>, start: &BytesStart<'_>) -> Result<XmlNode, ParseError> {
    let namespace = match resolved {
        ResolveResult::Bound(ns) => String::from_utf8_lossy(ns.as_ref()).into_owned(),
        ResolveResult::Unbound => String::new(),
        ResolveResult::Unknown(prefix) => {
            return Err(ParseError::Xml(format!(
                "undeclared namespace prefix {:?}",
                String::from_utf8_lossy(prefix)
            )));
        }
    };
    let local = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut node = XmlNode::new(PropertyName::new(&namespace, &local));

    for attr in start.attributes().with_checks(false) {
        let attr = attr.map_err(ParseError::xml)?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let name = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value().map_err(ParseError::xml)?.into_owned();
        node.attributes.push((name, value));
    }
    Ok(node)
}

fn attach(
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
    node: XmlNode,
) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => return Err(ParseError::Xml("multiple root elements".to_string())),
    }
    Ok(())
}

pub fn decode_text(raw: &[u8]) -> Result<String, ParseError> {
    match std::str::from_utf8(raw) {
        Ok(s) => Ok(unescape(s).map_err(ParseError::xml)?.into_owned()),
        Err(_) => Ok(String::from_utf8_lossy(raw).into_owned()),
    }
}
