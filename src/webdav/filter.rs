//! Composable `<filter>` terms for calendar-query and addressbook-query.
//!
//! Terms render to XML fragments with an explicit namespace prefix: `C` for
//! CalDAV and `CR` for CardDAV, matching the declarations emitted by the
//! report builders. All user supplied text is escaped.

use crate::webdav::xml::escape_xml;

/// Collation used when none is given.
pub const DEFAULT_COLLATION: &str = "i;unicode-casemap";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchType {
    Equals,
    #[default]
    Contains,
    StartsWith,
    EndsWith,
}

impl MatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::Equals => "equals",
            MatchType::Contains => "contains",
            MatchType::StartsWith => "starts-with",
            MatchType::EndsWith => "ends-with",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    pub text: String,
    /// `None` leaves the attribute out and lets the server pick its default.
    pub collation: Option<String>,
    /// `None` omits `match-type` (plain substring in CalDAV).
    pub match_type: Option<MatchType>,
    pub negate: bool,
}

impl TextMatch {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            collation: None,
            match_type: None,
            negate: false,
        }
    }

    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    pub fn match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = Some(match_type);
        self
    }

    pub fn negate(mut self, negate: bool) -> Self {
        self.negate = negate;
        self
    }

    fn write(&self, prefix: &str, out: &mut String) {
        out.push('<');
        out.push_str(prefix);
        out.push_str(":text-match");
        if let Some(collation) = &self.collation {
            out.push_str(&format!(" collation=\"{}\"", escape_xml(collation)));
        }
        if let Some(match_type) = self.match_type {
            out.push_str(&format!(" match-type=\"{}\"", match_type.as_str()));
        }
        if self.negate {
            out.push_str(" negate-condition=\"yes\"");
        }
        out.push('>');
        out.push_str(&escape_xml(&self.text));
        out.push_str(&format!("</{prefix}:text-match>"));
    }
}

/// Half-open UTC interval in iCalendar basic format (`20240101T000000Z`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl TimeRange {
    pub fn new(start: Option<&str>, end: Option<&str>) -> Self {
        Self {
            start: start.map(str::to_string),
            end: end.map(str::to_string),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    fn write(&self, out: &mut String) {
        if self.is_unbounded() {
            return;
        }
        out.push_str("<C:time-range");
        if let Some(start) = &self.start {
            out.push_str(&format!(" start=\"{}\"", escape_xml(start)));
        }
        if let Some(end) = &self.end {
            out.push_str(&format!(" end=\"{}\"", escape_xml(end)));
        }
        out.push_str("/>");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropFilter {
    pub name: String,
    /// Without a text-match the filter only tests that the property exists.
    pub text_match: Option<TextMatch>,
}

impl PropFilter {
    pub fn new(name: impl Into<String>, text_match: Option<TextMatch>) -> Self {
        Self {
            name: name.into(),
            text_match,
        }
    }

    pub(crate) fn write(&self, prefix: &str, out: &mut String) {
        let name = escape_xml(&self.name);
        match &self.text_match {
            Some(text_match) => {
                out.push_str(&format!("<{prefix}:prop-filter name=\"{name}\">"));
                text_match.write(prefix, out);
                out.push_str(&format!("</{prefix}:prop-filter>"));
            }
            None => out.push_str(&format!("<{prefix}:prop-filter name=\"{name}\"/>")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterTerm {
    Comp(CompFilter),
    Prop(PropFilter),
    TimeRange(TimeRange),
}

impl FilterTerm {
    fn write(&self, out: &mut String) {
        match self {
            FilterTerm::Comp(comp) => comp.write(out),
            FilterTerm::Prop(prop) => prop.write("C", out),
            FilterTerm::TimeRange(range) => range.write(out),
        }
    }
}

impl From<CompFilter> for FilterTerm {
    fn from(value: CompFilter) -> Self {
        FilterTerm::Comp(value)
    }
}

impl From<PropFilter> for FilterTerm {
    fn from(value: PropFilter) -> Self {
        FilterTerm::Prop(value)
    }
}

impl From<TimeRange> for FilterTerm {
    fn from(value: TimeRange) -> Self {
        FilterTerm::TimeRange(value)
    }
}

/// A `comp-filter` on an iCalendar component name such as `VEVENT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompFilter {
    pub name: String,
    pub children: Vec<FilterTerm>,
}

impl CompFilter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with(mut self, term: impl Into<FilterTerm>) -> Self {
        self.children.push(term.into());
        self
    }

    fn write(&self, out: &mut String) {
        out.push_str(&format!("<C:comp-filter name=\"{}\">", escape_xml(&self.name)));
        for child in &self.children {
            child.write(out);
        }
        out.push_str("</C:comp-filter>");
    }
}

/// A complete CalDAV `<C:filter>`, always rooted at `comp-filter(VCALENDAR)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    root: CompFilter,
}

impl Filter {
    pub fn calendar(component_terms: Vec<FilterTerm>) -> Self {
        Self {
            root: CompFilter {
                name: "VCALENDAR".to_string(),
                children: component_terms,
            },
        }
    }

    pub fn root(&self) -> &CompFilter {
        &self.root
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::from("<C:filter>");
        self.root.write(&mut out);
        out.push_str("</C:filter>");
        out
    }
}

/// `<C:time-range .../>` with only the bounds given; empty when both are absent.
pub fn build_time_range_term(start: Option<&str>, end: Option<&str>) -> String {
    let mut out = String::new();
    TimeRange::new(start, end).write(&mut out);
    out
}

/// A CalDAV `prop-filter` with one `text-match`.
pub fn build_prop_filter_term(
    name: &str,
    text: &str,
    collation: Option<&str>,
    match_type: Option<MatchType>,
    negate: bool,
) -> String {
    let mut text_match = TextMatch::new(text).negate(negate);
    text_match.collation = collation.map(str::to_string);
    text_match.match_type = match_type;
    let mut out = String::new();
    PropFilter::new(name, Some(text_match)).write("C", &mut out);
    out
}
