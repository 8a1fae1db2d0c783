//! Decoding of `207 Multi-Status` bodies.
//!
//! Each `<response>` becomes a [`MultistatusEntry`] keyed by its href, holding
//! one property map per HTTP status code reported in its `<propstat>` blocks.

use std::collections::BTreeMap;

use crate::error::ParseError;
use crate::webdav::property::{NS_DAV, PropertyKind, PropertyName};
use crate::webdav::xml::{XmlNode, parse_document};

/// Properties reported under one status code.
pub type PropMap = BTreeMap<PropertyName, XmlNode>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultistatusEntry {
    pub href: String,
    /// Status given directly on the `<response>` (no propstat), e.g. a
    /// deleted member in a sync-collection report.
    pub status: Option<u16>,
    pub propstats: BTreeMap<u16, PropMap>,
}

impl MultistatusEntry {
    /// Properties reported under `status`; `None` when that status is absent.
    pub fn props(&self, status: u16) -> Option<&PropMap> {
        self.propstats.get(&status)
    }

    /// The `200 OK` block.
    pub fn ok(&self) -> Option<&PropMap> {
        self.props(200)
    }

    pub fn prop(&self, status: u16, name: &PropertyName) -> Option<&XmlNode> {
        self.props(status).and_then(|m| m.get(name))
    }

    /// A successfully returned property.
    pub fn ok_prop(&self, kind: PropertyKind) -> Option<&XmlNode> {
        self.prop(200, &kind.into())
    }

    /// Trimmed text of a successfully returned property, `None` when empty.
    pub fn ok_text(&self, kind: PropertyKind) -> Option<String> {
        self.ok_prop(kind)
            .map(|n| n.trimmed_text().to_string())
            .filter(|t| !t.is_empty())
    }

    /// Properties reported under any non-2xx status.
    pub fn refused(&self) -> Vec<PropertyName> {
        self.propstats
            .iter()
            .filter(|(status, _)| !(200..300).contains(*status))
            .flat_map(|(_, props)| props.keys().cloned())
            .collect()
    }
}

/// A decoded multistatus document, entries in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Multistatus {
    entries: Vec<MultistatusEntry>,
    sync_token: Option<String>,
}

impl Multistatus {
    pub fn entries(&self) -> &[MultistatusEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<MultistatusEntry> {
        self.entries
    }

    pub fn get(&self, href: &str) -> Option<&MultistatusEntry> {
        self.entries.iter().find(|e| e.href == href)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-level `<sync-token>` of a sync-collection report (RFC 6578).
    pub fn sync_token(&self) -> Option<&str> {
        self.sync_token.as_deref()
    }
}

/// Parse a `{DAV:}multistatus` document.
///
/// Malformed XML, a different root element, a `<response>` without `<href>`
/// or an unparseable status line are errors, never an empty result.
pub fn parse_multistatus(raw: &[u8]) -> Result<Multistatus, ParseError> {
    let root = parse_document(raw)?;
    if !root.is(NS_DAV, "multistatus") {
        return Err(ParseError::UnexpectedRoot {
            expected: "multistatus",
            found: root.name.to_string(),
        });
    }
    multistatus_from_node(&root)
}

/// Build entries from an already parsed `<multistatus>` element.
pub(crate) fn multistatus_from_node(root: &XmlNode) -> Result<Multistatus, ParseError> {
    let mut out = Multistatus {
        entries: Vec::new(),
        sync_token: root
            .child(NS_DAV, "sync-token")
            .map(|t| t.trimmed_text().to_string())
            .filter(|t| !t.is_empty()),
    };

    for response in root.children_named(NS_DAV, "response") {
        let entry = parse_response(response)?;
        match out.entries.iter_mut().find(|e| e.href == entry.href) {
            Some(existing) => merge(existing, entry),
            None => out.entries.push(entry),
        }
    }
    Ok(out)
}

fn parse_response(response: &XmlNode) -> Result<MultistatusEntry, ParseError> {
    let href = response.href().ok_or(ParseError::MissingHref)?;
    let status = response
        .child(NS_DAV, "status")
        .map(|s| parse_status_line(s.trimmed_text()))
        .transpose()?;

    let mut propstats: BTreeMap<u16, PropMap> = BTreeMap::new();
    for propstat in response.children_named(NS_DAV, "propstat") {
        let code = match propstat.child(NS_DAV, "status") {
            Some(s) => parse_status_line(s.trimmed_text())?,
            None => return Err(ParseError::BadStatus(String::new())),
        };
        let props = propstats.entry(code).or_default();
        for prop in propstat.children_named(NS_DAV, "prop") {
            for value in &prop.children {
                props.insert(value.name.clone(), value.clone());
            }
        }
    }

    Ok(MultistatusEntry {
        href,
        status,
        propstats,
    })
}

fn merge(existing: &mut MultistatusEntry, other: MultistatusEntry) {
    if existing.status.is_none() {
        existing.status = other.status;
    }
    for (code, props) in other.propstats {
        existing.propstats.entry(code).or_default().extend(props);
    }
}

/// Extract the code from `HTTP/1.1 200 OK`.
pub fn parse_status_line(line: &str) -> Result<u16, ParseError> {
    let mut parts = line.split_whitespace();
    let code = match (parts.next(), parts.next()) {
        (Some(version), Some(code)) if version.starts_with("HTTP/") => code,
        _ => return Err(ParseError::BadStatus(line.to_string())),
    };
    code.parse::<u16>()
        .ok()
        .filter(|c| (100..600).contains(c))
        .ok_or_else(|| ParseError::BadStatus(line.to_string()))
}
