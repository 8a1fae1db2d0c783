//! CardDAV report bodies and vCard filters.

use crate::webdav::filter::{DEFAULT_COLLATION, MatchType, PropFilter, TextMatch};
use crate::webdav::request::NAMESPACE_DECLS;
use crate::webdav::xml::escape_xml;

/// Properties a free-text contact search looks at.
pub const SEARCH_PROPERTIES: [&str; 4] = ["FN", "N", "EMAIL", "NICKNAME"];

/// How the prop-filters of an [`AddressFilter`] combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterTest {
    #[default]
    AnyOf,
    AllOf,
}

impl FilterTest {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterTest::AnyOf => "anyof",
            FilterTest::AllOf => "allof",
        }
    }
}

/// A CardDAV `<CR:filter>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressFilter {
    pub test: FilterTest,
    pub props: Vec<PropFilter>,
}

impl AddressFilter {
    pub fn any_of(props: Vec<PropFilter>) -> Self {
        Self {
            test: FilterTest::AnyOf,
            props,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn to_xml(&self) -> String {
        let mut out = format!("<CR:filter test=\"{}\">", self.test.as_str());
        for prop in &self.props {
            prop.write("CR", &mut out);
        }
        out.push_str("</CR:filter>");
        out
    }
}

/// `addressbook-query` returning etags, and card data when `include_data`.
/// Without a filter every card matches.
pub fn build_addressbook_query(filter: Option<&AddressFilter>, include_data: bool) -> String {
    let mut body = format!("<CR:addressbook-query {NAMESPACE_DECLS}><D:prop><D:getetag/>");
    if include_data {
        body.push_str("<CR:address-data/>");
    }
    body.push_str("</D:prop>");
    if let Some(filter) = filter.filter(|f| !f.is_empty()) {
        body.push_str(&filter.to_xml());
    }
    body.push_str("</CR:addressbook-query>");
    body
}

/// `addressbook-multiget` for the given card hrefs. An empty list yields a
/// document without `<D:href>`, which servers reject.
pub fn build_addressbook_multiget(hrefs: &[String]) -> String {
    let mut body = format!(
        "<CR:addressbook-multiget {NAMESPACE_DECLS}><D:prop><D:getetag/><CR:address-data/></D:prop>"
    );
    for href in hrefs {
        body.push_str("<D:href>");
        body.push_str(&escape_xml(href));
        body.push_str("</D:href>");
    }
    body.push_str("</CR:addressbook-multiget>");
    body
}

/// Free-text search over [`SEARCH_PROPERTIES`] plus an optional group
/// (`CATEGORIES`) match, all combined with `anyof`. `None` when neither is
/// given.
pub fn search_filter(search: Option<&str>, group: Option<&str>) -> Option<AddressFilter> {
    let contains = |text: &str| Some(TextMatch::new(text).match_type(MatchType::Contains));
    let mut props = Vec::new();
    if let Some(search) = search.filter(|s| !s.is_empty()) {
        props.extend(
            SEARCH_PROPERTIES
                .iter()
                .map(|name| PropFilter::new(*name, contains(search))),
        );
    }
    if let Some(group) = group.filter(|g| !g.is_empty()) {
        props.push(PropFilter::new("CATEGORIES", contains(group)));
    }
    (!props.is_empty()).then(|| AddressFilter::any_of(props))
}

/// Exact `UID` match.
pub fn uid_filter(uid: &str) -> AddressFilter {
    let text = TextMatch::new(uid)
        .collation(DEFAULT_COLLATION)
        .match_type(MatchType::Equals);
    AddressFilter::any_of(vec![PropFilter::new("UID", Some(text))])
}
