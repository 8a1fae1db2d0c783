pub mod client;
pub mod query;
pub mod types;

pub use client::parse_invites;
pub use query::{
    alarms_filter, build_calendar_query, build_mkcalendar, event_uid_filter, events_filter,
    todos_filter, whole_calendar_filter,
};
pub use types::{AccessLevel, Calendar, CalendarObject, CalendarShare, normalize_color};
