//! Reading `expand-property` responses.
//!
//! An expanded property holds nested `<response>` elements instead of
//! values, so the answer is walked as a tree rather than through the flat
//! multistatus parser.

use crate::error::ParseError;
use crate::principal::types::{ProxiedFor, ProxyMode};
use crate::webdav::property::{NS_CALDAV, NS_DAV, PropertyKind};
use crate::webdav::xml::{XmlNode, parse_document};

const PROP_PATH: [(&str, &str); 3] = [
    (NS_DAV, "response"),
    (NS_DAV, "propstat"),
    (NS_DAV, "prop"),
];

fn home_sets<'a>(root: &'a XmlNode, expanded: PropertyKind) -> impl Iterator<Item = String> + 'a {
    let outer = root.select(&PROP_PATH);
    outer
        .into_iter()
        .flat_map(move |prop| prop.children_named(expanded.namespace(), expanded.local_name()))
        .flat_map(|relation| relation.select(&PROP_PATH))
        .flat_map(|prop| prop.children_named(NS_CALDAV, "calendar-home-set"))
        .flat_map(XmlNode::hrefs)
}

/// Calendar homes reachable through proxy rights, read entries first.
pub fn parse_proxied_for(raw: &[u8]) -> Result<Vec<ProxiedFor>, ParseError> {
    let root = parse_document(raw)?;
    if !root.is(NS_DAV, "multistatus") {
        return Err(ParseError::UnexpectedRoot {
            expected: "multistatus",
            found: root.name.to_string(),
        });
    }

    let read = home_sets(&root, PropertyKind::CalendarProxyReadFor).map(|href| ProxiedFor {
        href,
        mode: ProxyMode::Read,
    });
    let write = home_sets(&root, PropertyKind::CalendarProxyWriteFor).map(|href| ProxiedFor {
        href,
        mode: ProxyMode::Write,
    });
    Ok(read.chain(write).collect())
}
