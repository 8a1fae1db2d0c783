//! Request bodies for the generic WebDAV methods.
//!
//! Every root element declares the same fixed set of prefixes (see
//! [`NAMESPACE_DECLS`]); properties outside those namespaces get a local
//! `xmlns` declaration on their own element.

use crate::webdav::property::{PropertyKind, PropertyName, prefix_for};
use crate::webdav::xml::escape_xml;

pub(crate) const NAMESPACE_DECLS: &str = concat!(
    r#"xmlns:D="DAV:" "#,
    r#"xmlns:C="urn:ietf:params:xml:ns:caldav" "#,
    r#"xmlns:CR="urn:ietf:params:xml:ns:carddav" "#,
    r#"xmlns:CS="http://calendarserver.org/ns/" "#,
    r#"xmlns:IC="http://apple.com/ns/ical/""#
);

/// Qualified tag plus the extra declaration it needs, if any.
fn qualified(name: &PropertyName) -> (String, String) {
    match prefix_for(name.namespace()) {
        Some(prefix) => (format!("{prefix}:{}", name.local_name()), String::new()),
        None if name.namespace().is_empty() => (name.local_name().to_string(), String::new()),
        None => (
            format!("X:{}", name.local_name()),
            format!(" xmlns:X=\"{}\"", escape_xml(name.namespace())),
        ),
    }
}

pub(crate) fn write_empty(name: &PropertyName, out: &mut String) {
    let (tag, decl) = qualified(name);
    out.push_str(&format!("<{tag}{decl}/>"));
}

fn write_text(name: &PropertyName, text: &str, out: &mut String) {
    let (tag, decl) = qualified(name);
    out.push_str(&format!("<{tag}{decl}>{}</{tag}>", escape_xml(text)));
}

fn write_hrefs(name: &PropertyName, hrefs: &[String], out: &mut String) {
    let (tag, decl) = qualified(name);
    out.push_str(&format!("<{tag}{decl}>"));
    for href in hrefs {
        out.push_str(&format!("<D:href>{}</D:href>", escape_xml(href)));
    }
    out.push_str(&format!("</{tag}>"));
}

/// `<D:prop>` listing the given properties as empty elements.
pub(crate) fn prop_list<'a>(props: impl IntoIterator<Item = &'a PropertyName>) -> String {
    let mut out = String::from("<D:prop>");
    for name in props {
        write_empty(name, &mut out);
    }
    out.push_str("</D:prop>");
    out
}

/// `PROPFIND` body requesting the given properties.
pub fn build_propfind(props: &[PropertyName]) -> String {
    format!(
        "<D:propfind {NAMESPACE_DECLS}>{}</D:propfind>",
        prop_list(props)
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropValue {
    Text(String),
    /// Href-valued property such as `group-member-set`; may be empty.
    Hrefs(Vec<String>),
}

/// The contents of a `PROPPATCH` request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropPatch {
    set: Vec<(PropertyName, PropValue)>,
    remove: Vec<PropertyName>,
}

impl PropPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(mut self, name: impl Into<PropertyName>, value: impl Into<String>) -> Self {
        self.set.push((name.into(), PropValue::Text(value.into())));
        self
    }

    pub fn set_hrefs(mut self, name: impl Into<PropertyName>, hrefs: Vec<String>) -> Self {
        self.set.push((name.into(), PropValue::Hrefs(hrefs)));
        self
    }

    pub fn remove(mut self, name: impl Into<PropertyName>) -> Self {
        self.remove.push(name.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.remove.is_empty()
    }

    /// Every property touched by the patch, sets first.
    pub fn names(&self) -> impl Iterator<Item = &PropertyName> {
        self.set.iter().map(|(n, _)| n).chain(self.remove.iter())
    }
}

pub fn build_proppatch(patch: &PropPatch) -> String {
    let mut out = format!("<D:propertyupdate {NAMESPACE_DECLS}>");
    if !patch.set.is_empty() {
        out.push_str("<D:set><D:prop>");
        for (name, value) in &patch.set {
            match value {
                PropValue::Text(text) => write_text(name, text, &mut out),
                PropValue::Hrefs(hrefs) => write_hrefs(name, hrefs, &mut out),
            }
        }
        out.push_str("</D:prop></D:set>");
    }
    if !patch.remove.is_empty() {
        out.push_str("<D:remove>");
        out.push_str(&prop_list(&patch.remove));
        out.push_str("</D:remove>");
    }
    out.push_str("</D:propertyupdate>");
    out
}

/// Replace the whole `group-member-set` of a principal group.
pub fn build_group_member_set_patch(hrefs: &[String]) -> String {
    build_proppatch(&PropPatch::new().set_hrefs(PropertyKind::GroupMemberSet, hrefs.to_vec()))
}

/// `expand-property` report resolving the calendar homes of every principal
/// this one is a read or write proxy for.
pub fn build_calendar_proxy_expand() -> String {
    let mut out = format!("<D:expand-property {NAMESPACE_DECLS}>");
    for kind in [
        PropertyKind::CalendarProxyReadFor,
        PropertyKind::CalendarProxyWriteFor,
    ] {
        out.push_str(&format!(
            "<D:property name=\"{}\" namespace=\"{}\">",
            kind.local_name(),
            kind.namespace()
        ));
        out.push_str(&format!(
            "<D:property name=\"{}\" namespace=\"{}\"/>",
            PropertyKind::CalendarHomeSet.local_name(),
            PropertyKind::CalendarHomeSet.namespace()
        ));
        out.push_str("</D:property>");
    }
    out.push_str("</D:expand-property>");
    out
}

/// `sync-collection` report (RFC 6578). Without a token the server returns
/// the full member list and a fresh token.
pub fn build_sync_collection(
    sync_token: Option<&str>,
    limit: Option<u32>,
    include_data: bool,
    data_property: PropertyKind,
) -> String {
    let mut body = format!("<D:sync-collection {NAMESPACE_DECLS}>");
    if let Some(token) = sync_token {
        body.push_str("<D:sync-token>");
        body.push_str(&escape_xml(token));
        body.push_str("</D:sync-token>");
    } else {
        body.push_str("<D:sync-token/>");
    }
    body.push_str("<D:sync-level>1</D:sync-level>");
    body.push_str("<D:prop><D:getetag/>");
    if include_data {
        write_empty(&data_property.into(), &mut body);
    }
    body.push_str("</D:prop>");
    if let Some(limit) = limit {
        body.push_str("<D:limit><D:nresults>");
        body.push_str(&limit.to_string());
        body.push_str("</D:nresults></D:limit>");
    }
    body.push_str("</D:sync-collection>");
    body
}
