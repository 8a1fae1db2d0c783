use groupware_dav_rs::{AccessLevel, DavError, PropertyName};
use hyper::{Method, StatusCode};

use crate::mock::{MockTransport, connected_client, multistatus, ok_response};

#[tokio::test]
async fn test_get_calendars_skips_shared_and_non_calendars() {
    let transport = MockTransport::new();
    let client = connected_client(&transport).await;
    transport.push_multistatus(&multistatus(&[
        ok_response(
            "/dav/calendars/alice/",
            "<D:resourcetype><D:collection/></D:resourcetype>",
        ),
        ok_response(
            "/dav/calendars/alice/work/",
            r##"<D:resourcetype><D:collection/><C:calendar/></D:resourcetype>
                <D:displayname>Work</D:displayname>
                <CS:getctag>ctag-1</CS:getctag>
                <IC:calendar-color>#FF0000FF</IC:calendar-color>
                <IC:calendar-order>2</IC:calendar-order>
                <D:owner><D:href>/dav/principals/alice/</D:href></D:owner>
                <CS:invite><CS:user><D:href>mailto:bob@example.com</D:href><CS:access><CS:read/></CS:access></CS:user></CS:invite>"##,
        ),
        ok_response(
            "/dav/calendars/alice/team/",
            "<D:resourcetype><D:collection/><C:calendar/><CS:shared/></D:resourcetype>",
        ),
    ]
    .concat()));

    let calendars = client.get_calendars("calendars/alice/").await.unwrap();
    assert_eq!(calendars.len(), 1);
    let work = &calendars["work"];
    assert_eq!(work.href, "/dav/calendars/alice/work/");
    assert_eq!(work.display_name.as_deref(), Some("Work"));
    assert_eq!(work.ctag.as_deref(), Some("ctag-1"));
    assert_eq!(work.color.as_deref(), Some("#FF0000"));
    assert_eq!(work.order, Some(2));
    assert_eq!(work.owner.as_deref(), Some("/dav/principals/alice/"));
    assert_eq!(work.shares.len(), 1);
    assert_eq!(work.shares[0].email, "bob@example.com");
    assert_eq!(work.shares[0].access, AccessLevel::Read);

    let request = transport.last_request();
    assert_eq!(request.method.as_str(), "PROPFIND");
    assert_eq!(request.header_str("depth"), Some("1"));
}

#[tokio::test]
async fn test_query_keeps_only_entries_with_ok_block() {
    let transport = MockTransport::new();
    let client = connected_client(&transport).await;
    let missing = r#"<D:response><D:href>/dav/cal/work/missing.ics</D:href><D:propstat><D:prop><D:getetag/></D:prop><D:status>HTTP/1.1 404 Not Found</D:status></D:propstat></D:response>"#;
    transport.push_multistatus(&multistatus(&format!(
        "{}{missing}",
        ok_response(
            "/dav/cal/work/e1.ics",
            r#"<D:getetag>"abc"</D:getetag><C:calendar-data>BEGIN:VCALENDAR
END:VCALENDAR</C:calendar-data>"#,
        )
    )));

    let objects = client.get_events("cal/work", None, None).await.unwrap();
    assert_eq!(objects.len(), 1);
    let event = &objects[0];
    assert_eq!(event.href, "/dav/cal/work/e1.ics");
    assert_eq!(event.name(), "e1.ics");
    assert_eq!(event.etag.as_deref(), Some("abc"));
    assert!(event.data.starts_with("BEGIN:VCALENDAR"));
    assert_eq!(event.parent_url, "cal/work/");

    let request = transport.last_request();
    assert_eq!(request.method.as_str(), "REPORT");
    assert_eq!(request.path, "cal/work/");
    assert_eq!(request.header_str("depth"), Some("1"));
    let body = request.body_str().unwrap();
    assert!(body.contains(r#"<C:comp-filter name="VEVENT"></C:comp-filter>"#));
    assert!(!body.contains("time-range"));
}

#[tokio::test]
async fn test_event_by_uid_not_found() {
    let transport = MockTransport::new();
    let client = connected_client(&transport).await;
    transport.push_multistatus(&multistatus(""));

    let found = client.get_event_by_uid("cal/work/", "nope").await.unwrap();
    assert!(found.is_none());
    assert!(transport.last_request().body_str().unwrap().contains(">nope</C:text-match>"));
}

#[tokio::test]
async fn test_queries_normalize_collection_url() {
    let transport = MockTransport::new();
    let client = connected_client(&transport).await;
    let todo = ok_response(
        "/dav/cal/work/t1.ics",
        "<C:calendar-data>BEGIN:VCALENDAR</C:calendar-data>",
    );
    for _ in 0..3 {
        transport.push_multistatus(&multistatus(&todo));
    }

    let todos = client.get_todos("cal/work", None, None, false, false).await.unwrap();
    assert_eq!(todos[0].parent_url, "cal/work/");
    let found = client.get_event_by_uid("cal/work", "t1").await.unwrap().unwrap();
    assert_eq!(found.parent_url, "cal/work/");
    let all = client.get_calendar_objects("cal/work").await.unwrap();
    assert_eq!(all[0].parent_url, "cal/work/");

    let requests = transport.requests();
    assert!(requests[1..].iter().all(|r| r.path == "cal/work/"));
}

#[tokio::test]
async fn test_malformed_report_is_protocol_error() {
    let transport = MockTransport::new();
    let client = connected_client(&transport).await;
    transport.push_multistatus("<html>oops");

    let err = client.get_calendar_objects("cal/work/").await.unwrap_err();
    assert!(matches!(err, DavError::Protocol { .. }), "{err:?}");
}

#[tokio::test]
async fn test_create_calendar_sends_mkcalendar() {
    let transport = MockTransport::new();
    let client = connected_client(&transport).await;
    transport.push_status(StatusCode::CREATED);

    let url = client
        .create_calendar("calendars/alice", "holidays", "Holidays", "Days off", 4, "#00FF00")
        .await
        .unwrap();
    assert_eq!(url, "calendars/alice/holidays/");

    let request = transport.last_request();
    assert_eq!(request.method.as_str(), "MKCALENDAR");
    assert_eq!(request.path, "calendars/alice/holidays/");
    let body = request.body_str().unwrap();
    assert!(body.contains("<D:displayname>Holidays</D:displayname>"));
    assert!(body.contains("<IC:calendar-order>4</IC:calendar-order>"));
}

#[tokio::test]
async fn test_update_calendar_properties_rejected() {
    let transport = MockTransport::new();
    let client = connected_client(&transport).await;
    transport.push_multistatus(&multistatus(
        r#"<D:response><D:href>/dav/cal/work/</D:href>
          <D:propstat><D:prop><D:displayname/></D:prop><D:status>HTTP/1.1 200 OK</D:status></D:propstat>
          <D:propstat><D:prop><IC:calendar-color/></D:prop><D:status>HTTP/1.1 403 Forbidden</D:status></D:propstat>
        </D:response>"#,
    ));

    let err = client
        .update_calendar_properties("cal/work/", "Work", "", 1, "#123456")
        .await
        .unwrap_err();
    match err {
        DavError::Rejected { properties, .. } => {
            assert_eq!(
                properties,
                vec![PropertyName::from_clark("{http://apple.com/ns/ical/}calendar-color")]
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(transport.last_request().method, Method::from_bytes(b"PROPPATCH").unwrap());
}

#[tokio::test]
async fn test_update_calendar_color_accepts_plain_ok() {
    let transport = MockTransport::new();
    let client = connected_client(&transport).await;
    transport.push_status(StatusCode::OK);

    client.update_calendar_color("cal/work/", "#abcdef").await.unwrap();
    assert!(
        transport
            .last_request()
            .body_str()
            .unwrap()
            .contains("<IC:calendar-color>#abcdef</IC:calendar-color>")
    );
}
