/// Permission granted to a sharee or a proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessLevel {
    Read,
    Write,
}

/// A sharing invite on a calendar (`CS:invite/CS:user`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarShare {
    pub email: String,
    pub access: AccessLevel,
}

/// A calendar collection owned by (not merely shared with) the account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Calendar {
    /// Last path segment of `href`.
    pub id: String,
    pub href: String,
    pub display_name: Option<String>,
    pub ctag: Option<String>,
    pub description: Option<String>,
    /// `#RRGGBB`; longer values (`#RRGGBBAA`) are cut to seven characters.
    pub color: Option<String>,
    pub order: Option<i32>,
    pub owner: Option<String>,
    pub shares: Vec<CalendarShare>,
}

/// Calendar object returned by a calendar-query `REPORT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarObject {
    pub href: String,
    /// Unquoted entity tag.
    pub etag: Option<String>,
    /// Raw iCalendar text.
    pub data: String,
    /// Collection the query was run against.
    pub parent_url: String,
}

impl CalendarObject {
    /// File name part of the href, e.g. `event.ics`.
    pub fn name(&self) -> &str {
        last_segment(&self.href)
    }
}

/// Cut a color value to `#RRGGBB`.
pub fn normalize_color(raw: &str) -> String {
    raw.trim().chars().take(7).collect()
}

/// Last non-empty `/`-separated segment.
pub(crate) fn last_segment(href: &str) -> &str {
    href.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}
