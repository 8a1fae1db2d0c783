//! CalDAV request bodies and the standard calendar-query filters.
//!
//! ```
//! use groupware_dav_rs::caldav::query::{build_calendar_query, events_filter};
//!
//! let body = build_calendar_query(&events_filter(Some("20240101T000000Z"), None));
//! assert!(body.contains(r#"<C:time-range start="20240101T000000Z"/>"#));
//! ```

use crate::webdav::filter::{CompFilter, Filter, PropFilter, TextMatch, TimeRange};
use crate::webdav::request::NAMESPACE_DECLS;
use crate::webdav::xml::escape_xml;

/// `calendar-query` requesting etag and calendar data for matches of `filter`.
pub fn build_calendar_query(filter: &Filter) -> String {
    format!(
        "<C:calendar-query {NAMESPACE_DECLS}><D:prop><D:getetag/><C:calendar-data/></D:prop>{}</C:calendar-query>",
        filter.to_xml()
    )
}

/// `MKCALENDAR` body setting the initial collection properties.
pub fn build_mkcalendar(display_name: &str, description: &str, order: i32, color: &str) -> String {
    format!(
        "<C:mkcalendar {NAMESPACE_DECLS}><D:set><D:prop>\
         <D:displayname>{}</D:displayname>\
         <C:calendar-description>{}</C:calendar-description>\
         <IC:calendar-order>{order}</IC:calendar-order>\
         <IC:calendar-color>{}</IC:calendar-color>\
         </D:prop></D:set></C:mkcalendar>",
        escape_xml(display_name),
        escape_xml(description),
        escape_xml(color),
    )
}

fn with_range(comp: CompFilter, start: Option<&str>, end: Option<&str>) -> CompFilter {
    let range = TimeRange::new(start, end);
    if range.is_unbounded() {
        comp
    } else {
        comp.with(range)
    }
}

/// Events overlapping the range; every event when both bounds are absent.
pub fn events_filter(start: Option<&str>, end: Option<&str>) -> Filter {
    Filter::calendar(vec![with_range(CompFilter::new("VEVENT"), start, end).into()])
}

/// The event whose `UID` equals `uid` (octet collation).
pub fn event_uid_filter(uid: &str) -> Filter {
    let text = TextMatch::new(uid).collation("i;octet");
    Filter::calendar(vec![
        CompFilter::new("VEVENT")
            .with(PropFilter::new("UID", Some(text)))
            .into(),
    ])
}

/// Events carrying an alarm that triggers inside the range.
pub fn alarms_filter(start: Option<&str>, end: Option<&str>) -> Filter {
    let alarm = with_range(CompFilter::new("VALARM"), start, end);
    Filter::calendar(vec![CompFilter::new("VEVENT").with(alarm).into()])
}

/// To-dos in the range. Completed and cancelled ones are excluded unless
/// asked for.
pub fn todos_filter(
    start: Option<&str>,
    end: Option<&str>,
    completed: bool,
    cancelled: bool,
) -> Filter {
    let mut todo = CompFilter::new("VTODO");
    if !completed {
        todo = todo.with(PropFilter::new(
            "STATUS",
            Some(TextMatch::new("COMPLETED").negate(true)),
        ));
    }
    if !cancelled {
        todo = todo.with(PropFilter::new(
            "STATUS",
            Some(TextMatch::new("CANCELLED").negate(true)),
        ));
    }
    Filter::calendar(vec![with_range(todo, start, end).into()])
}

/// Every object in the collection.
pub fn whole_calendar_filter() -> Filter {
    Filter::calendar(Vec::new())
}
