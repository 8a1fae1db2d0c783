use groupware_dav_rs::caldav::{
    alarms_filter, build_calendar_query, event_uid_filter, events_filter, normalize_color,
    todos_filter, whole_calendar_filter,
};
use groupware_dav_rs::webdav::property::{NS_CALDAV, NS_DAV};
use groupware_dav_rs::webdav::{FilterTerm, parse_document};

#[test]
fn test_event_uid_filter_structure() {
    let filter = event_uid_filter("1234@example.com");
    let root = filter.root();
    assert_eq!(root.name, "VCALENDAR");
    assert_eq!(root.children.len(), 1);

    let FilterTerm::Comp(event) = &root.children[0] else {
        panic!("expected VEVENT comp-filter, got {:?}", root.children[0]);
    };
    assert_eq!(event.name, "VEVENT");
    let FilterTerm::Prop(uid) = &event.children[0] else {
        panic!("expected UID prop-filter");
    };
    assert_eq!(uid.name, "UID");
    let text = uid.text_match.as_ref().unwrap();
    assert_eq!(text.text, "1234@example.com");
    assert_eq!(text.collation.as_deref(), Some("i;octet"));
    assert!(!text.negate);
}

#[test]
fn test_events_filter_with_range() {
    let xml = events_filter(Some("20240101T000000Z"), Some("20240201T000000Z")).to_xml();
    assert_eq!(
        xml,
        r#"<C:filter><C:comp-filter name="VCALENDAR"><C:comp-filter name="VEVENT"><C:time-range start="20240101T000000Z" end="20240201T000000Z"/></C:comp-filter></C:comp-filter></C:filter>"#
    );
}

#[test]
fn test_alarms_filter_nests_valarm_in_vevent() {
    let xml = alarms_filter(Some("20240101T000000Z"), None).to_xml();
    assert!(xml.contains(
        r#"<C:comp-filter name="VEVENT"><C:comp-filter name="VALARM"><C:time-range start="20240101T000000Z"/></C:comp-filter></C:comp-filter>"#
    ));
}

#[test]
fn test_todos_filter_flags() {
    let open_only = todos_filter(None, None, false, false).to_xml();
    assert!(open_only.contains(r#"<C:text-match negate-condition="yes">COMPLETED</C:text-match>"#));
    assert!(open_only.contains(r#"<C:text-match negate-condition="yes">CANCELLED</C:text-match>"#));

    let all = todos_filter(None, None, true, true).to_xml();
    assert!(!all.contains("prop-filter"));
    assert!(all.contains(r#"<C:comp-filter name="VTODO"></C:comp-filter>"#));

    let with_completed = todos_filter(None, None, true, false).to_xml();
    assert!(!with_completed.contains(">COMPLETED<"));
    assert!(with_completed.contains(">CANCELLED<"));
}

#[test]
fn test_calendar_query_is_well_formed() {
    let body = build_calendar_query(&whole_calendar_filter());
    let root = parse_document(body.as_bytes()).unwrap();
    assert!(root.is(NS_CALDAV, "calendar-query"));
    let prop = root.child(NS_DAV, "prop").unwrap();
    assert!(prop.has_child(NS_DAV, "getetag"));
    assert!(prop.has_child(NS_CALDAV, "calendar-data"));
    let filter = root.child(NS_CALDAV, "filter").unwrap();
    assert_eq!(
        filter.child(NS_CALDAV, "comp-filter").unwrap().attribute("name"),
        Some("VCALENDAR")
    );
}

#[test]
fn test_uid_with_markup_is_escaped() {
    let body = build_calendar_query(&event_uid_filter("a<b>&c"));
    let root = parse_document(body.as_bytes()).unwrap();
    let text = root.select(&[
        (NS_CALDAV, "filter"),
        (NS_CALDAV, "comp-filter"),
        (NS_CALDAV, "comp-filter"),
        (NS_CALDAV, "prop-filter"),
        (NS_CALDAV, "text-match"),
    ]);
    assert_eq!(text[0].text, "a<b>&c");
}

#[test]
fn test_color_truncation() {
    assert_eq!(normalize_color("#FF0000FF"), "#FF0000");
    assert_eq!(normalize_color(" #abcdef "), "#abcdef");
    assert_eq!(normalize_color("#abc"), "#abc");
}
