use groupware_dav_rs::ParseError;
use groupware_dav_rs::webdav::{PropertyKind, PropertyName, parse_multistatus};

#[test]
fn test_props_by_status() {
    let doc = br#"<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
      <D:response>
        <D:href>/dav/calendars/alice/work/</D:href>
        <D:propstat>
          <D:prop><D:displayname> Work </D:displayname></D:prop>
          <D:status>HTTP/1.1 200 OK</D:status>
        </D:propstat>
        <D:propstat>
          <D:prop><C:calendar-description/></D:prop>
          <D:status>HTTP/1.1 404 Not Found</D:status>
        </D:propstat>
      </D:response>
    </D:multistatus>"#;
    let ms = parse_multistatus(doc).unwrap();
    let entry = ms.get("/dav/calendars/alice/work/").unwrap();

    assert_eq!(entry.ok_text(PropertyKind::DisplayName).as_deref(), Some("Work"));
    assert!(entry.props(404).unwrap().contains_key(&PropertyName::from(PropertyKind::CalendarDescription)));
    assert!(entry.props(403).is_none());
    assert_eq!(
        entry.refused(),
        vec![PropertyName::from(PropertyKind::CalendarDescription)]
    );
}

#[test]
fn test_absent_status_yields_none() {
    let doc = br#"<D:multistatus xmlns:D="DAV:">
      <D:response><D:href>/x</D:href><D:propstat><D:prop><D:getetag>"1"</D:getetag></D:prop><D:status>HTTP/1.1 200 OK</D:status></D:propstat></D:response>
    </D:multistatus>"#;
    let ms = parse_multistatus(doc).unwrap();
    let entry = &ms.entries()[0];
    assert!(entry.props(404).is_none());
    assert!(entry.status.is_none());
    assert!(entry.refused().is_empty());
}

#[test]
fn test_unknown_properties_are_kept() {
    let doc = br#"<D:multistatus xmlns:D="DAV:" xmlns:X="urn:example">
      <D:response><D:href>/x</D:href><D:propstat><D:prop><X:flavour>vanilla</X:flavour></D:prop><D:status>HTTP/1.1 200 OK</D:status></D:propstat></D:response>
    </D:multistatus>"#;
    let ms = parse_multistatus(doc).unwrap();
    let value = ms.entries()[0]
        .prop(200, &PropertyName::from_clark("{urn:example}flavour"))
        .unwrap();
    assert_eq!(value.text, "vanilla");
}

#[test]
fn test_response_level_status() {
    let doc = br#"<D:multistatus xmlns:D="DAV:">
      <D:response><D:href>/gone.ics</D:href><D:status>HTTP/1.1 410 Gone</D:status></D:response>
    </D:multistatus>"#;
    let ms = parse_multistatus(doc).unwrap();
    assert_eq!(ms.entries()[0].status, Some(410));
    assert!(ms.entries()[0].ok().is_none());
}

#[test]
fn test_empty_multistatus() {
    let ms = parse_multistatus(br#"<D:multistatus xmlns:D="DAV:"/>"#).unwrap();
    assert!(ms.is_empty());
    assert!(ms.sync_token().is_none());
}

#[test]
fn test_malformed_documents_are_errors() {
    assert!(parse_multistatus(b"not xml at all <").is_err());
    assert!(matches!(
        parse_multistatus(br#"<D:error xmlns:D="DAV:"/>"#),
        Err(ParseError::UnexpectedRoot { .. })
    ));
    assert!(matches!(
        parse_multistatus(br#"<D:multistatus xmlns:D="DAV:"><D:response/></D:multistatus>"#),
        Err(ParseError::MissingHref)
    ));
    assert!(matches!(
        parse_multistatus(
            br#"<D:multistatus xmlns:D="DAV:"><D:response><D:href>/a</D:href><D:status>bogus</D:status></D:response></D:multistatus>"#
        ),
        Err(ParseError::BadStatus(_))
    ));
}

#[test]
fn test_default_namespace_and_entities() {
    let doc = br#"<multistatus xmlns="DAV:">
      <response><href>/a%20b/</href><propstat><prop><displayname>Caf&#233; &amp; Bar</displayname></prop><status>HTTP/1.1 200 OK</status></propstat></response>
    </multistatus>"#;
    let ms = parse_multistatus(doc).unwrap();
    assert_eq!(
        ms.get("/a%20b/").unwrap().ok_text(PropertyKind::DisplayName).as_deref(),
        Some("Café & Bar")
    );
}
