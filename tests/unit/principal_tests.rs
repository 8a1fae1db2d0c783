use groupware_dav_rs::principal::parse_proxied_for;
use groupware_dav_rs::webdav::parse_document;
use groupware_dav_rs::webdav::property::NS_DAV;
use groupware_dav_rs::{DavError, ProxiedFor, ProxyMode, ProxyRelation};
use hyper::StatusCode;

use crate::mock::{MockTransport, connected_client, multistatus, ok_response};

const WRITE_GROUP: &str = "principals/alice/calendar-proxy-write/";

fn member_set(hrefs: &[&str]) -> String {
    let hrefs: String = hrefs.iter().map(|h| format!("<D:href>{h}</D:href>")).collect();
    multistatus(&ok_response(
        "/dav/principals/alice/calendar-proxy-write/",
        &format!("<D:group-member-set>{hrefs}</D:group-member-set>"),
    ))
}

fn written_members(body: &str) -> Vec<String> {
    let root = parse_document(body.as_bytes()).unwrap();
    let set = root.select(&[(NS_DAV, "set"), (NS_DAV, "prop"), (NS_DAV, "group-member-set")]);
    assert_eq!(set.len(), 1, "patch must carry exactly one group-member-set");
    set[0].hrefs()
}

#[tokio::test]
async fn test_current_principal_and_homes() {
    let transport = MockTransport::new();
    let client = connected_client(&transport).await;
    transport.push_multistatus(&multistatus(&ok_response(
        "/dav/",
        "<D:current-user-principal><D:href>/dav/principals/alice/</D:href></D:current-user-principal>",
    )));
    transport.push_multistatus(&multistatus(&ok_response(
        "/dav/principals/alice/",
        "<C:calendar-home-set><D:href>/dav/calendars/alice/</D:href></C:calendar-home-set>",
    )));
    transport.push_multistatus(&multistatus(&ok_response("/dav/principals/alice/", "")));

    let principal = client.get_current_principal().await.unwrap().unwrap();
    assert_eq!(principal, "/dav/principals/alice/");
    assert_eq!(transport.last_request().header_str("depth"), Some("0"));

    let home = client.get_calendar_home_set(&principal).await.unwrap();
    assert_eq!(home.as_deref(), Some("/dav/calendars/alice/"));

    let books = client.get_address_book_home_set(&principal).await.unwrap();
    assert!(books.is_none());
}

#[tokio::test]
async fn test_principal_members_failure_is_empty() {
    let transport = MockTransport::new();
    let client = connected_client(&transport).await;
    transport.push_status(StatusCode::FORBIDDEN);

    assert!(client.get_principal_members("principals/alice/").await.is_empty());
}

#[tokio::test]
async fn test_principal_members() {
    let transport = MockTransport::new();
    let client = connected_client(&transport).await;
    transport.push_multistatus(&multistatus(&ok_response(
        "/dav/principals/alice/",
        "<D:group-membership><D:href>/dav/principals/bob/calendar-proxy-read/</D:href></D:group-membership>",
    )));

    assert_eq!(
        client.get_principal_members("principals/alice/").await,
        vec!["/dav/principals/bob/calendar-proxy-read/".to_string()]
    );
}

#[tokio::test]
async fn test_add_proxy_duplicate_does_not_write() {
    let transport = MockTransport::new();
    let client = connected_client(&transport).await;
    transport.push_multistatus(&member_set(&["/dav/principals/bob/"]));

    let added = client.add_proxy(WRITE_GROUP, "bob").await.unwrap();
    assert!(!added);
    let methods: Vec<String> = transport
        .requests()
        .iter()
        .map(|r| r.method.to_string())
        .collect();
    assert_eq!(methods, ["OPTIONS", "PROPFIND"]);
}

#[tokio::test]
async fn test_add_proxy_to_empty_group() {
    let transport = MockTransport::new();
    let client = connected_client(&transport).await;
    transport.push_multistatus(&member_set(&[]));
    transport.push_status(StatusCode::OK);

    assert!(client.add_proxy(WRITE_GROUP, "bob").await.unwrap());
    let patch = transport.last_request();
    assert_eq!(patch.method.as_str(), "PROPPATCH");
    assert_eq!(patch.path, WRITE_GROUP);
    assert_eq!(written_members(patch.body_str().unwrap()), ["/dav/principals/bob"]);
}

#[tokio::test]
async fn test_add_proxy_keeps_existing_members() {
    let transport = MockTransport::new();
    let client = connected_client(&transport).await;
    transport.push_multistatus(&member_set(&["https://dav.example.com/dav/principals/carol/"]));
    transport.push_status(StatusCode::OK);

    let relation = ProxyRelation::new("principals/alice", "bob", ProxyMode::Write);
    assert!(client.add_proxy_relation(&relation).await.unwrap());
    assert_eq!(
        written_members(transport.last_request().body_str().unwrap()),
        ["/dav/principals/carol", "/dav/principals/bob"]
    );
}

#[tokio::test]
async fn test_delete_last_proxy_writes_empty_set() {
    let transport = MockTransport::new();
    let client = connected_client(&transport).await;
    transport.push_multistatus(&member_set(&["/dav/principals/bob/"]));
    transport.push_status(StatusCode::OK);

    client.delete_proxy(WRITE_GROUP, "bob").await.unwrap();
    let patch = transport.last_request();
    assert_eq!(patch.method.as_str(), "PROPPATCH");
    assert!(written_members(patch.body_str().unwrap()).is_empty());
}

#[tokio::test]
async fn test_delegate_id_must_not_be_empty() {
    let transport = MockTransport::new();
    let client = connected_client(&transport).await;

    let err = client.add_proxy(WRITE_GROUP, "/").await.unwrap_err();
    assert!(matches!(err, DavError::Validation(_)));
}

const EXPANDED: &str = r#"<D:multistatus xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav" xmlns:CS="http://calendarserver.org/ns/">
  <D:response>
    <D:href>/dav/principals/alice/</D:href>
    <D:propstat>
      <D:prop>
        <CS:calendar-proxy-write-for>
          <D:response>
            <D:href>/dav/principals/carol/</D:href>
            <D:propstat><D:prop><C:calendar-home-set><D:href>/dav/calendars/carol/</D:href></C:calendar-home-set></D:prop><D:status>HTTP/1.1 200 OK</D:status></D:propstat>
          </D:response>
        </CS:calendar-proxy-write-for>
        <CS:calendar-proxy-read-for>
          <D:response>
            <D:href>/dav/principals/bob/</D:href>
            <D:propstat><D:prop><C:calendar-home-set><D:href>/dav/calendars/bob/</D:href></C:calendar-home-set></D:prop><D:status>HTTP/1.1 200 OK</D:status></D:propstat>
          </D:response>
        </CS:calendar-proxy-read-for>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

#[test]
fn test_parse_proxied_for_read_entries_first() {
    assert_eq!(
        parse_proxied_for(EXPANDED.as_bytes()).unwrap(),
        vec![
            ProxiedFor {
                href: "/dav/calendars/bob/".into(),
                mode: ProxyMode::Read
            },
            ProxiedFor {
                href: "/dav/calendars/carol/".into(),
                mode: ProxyMode::Write
            },
        ]
    );
}

#[tokio::test]
async fn test_get_proxied_for_uses_expand_property() {
    let transport = MockTransport::new();
    let client = connected_client(&transport).await;
    transport.push_multistatus(EXPANDED);

    let proxied = client.get_proxied_for("principals/alice/").await.unwrap();
    assert_eq!(proxied.len(), 2);

    let request = transport.last_request();
    assert_eq!(request.method.as_str(), "REPORT");
    assert_eq!(request.header_str("depth"), Some("0"));
    assert!(request.body_str().unwrap().contains("<D:expand-property"));
}
