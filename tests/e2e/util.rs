use std::sync::atomic::{AtomicU64, Ordering};

use groupware_dav_rs::{ClientConfig, DavClient};

pub const SABREDAV_URL: &str = "http://localhost:8080/";
pub const TEST_USER: &str = "test";
pub const TEST_PASS: &str = "test";

static UNIQUE_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn unique_calendar_name(prefix: &str) -> String {
    let counter = UNIQUE_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!(
        "{}_{}_{}",
        prefix,
        chrono::Utc::now().timestamp_micros(),
        counter
    )
}

pub fn unique_uid(prefix: &str) -> String {
    let counter = UNIQUE_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!(
        "{}-{}-{}@example.com",
        prefix,
        chrono::Utc::now().timestamp_micros(),
        counter
    )
}

pub async fn connected_client() -> DavClient {
    let mut client = DavClient::new(ClientConfig::new(SABREDAV_URL, TEST_USER, TEST_PASS))
        .expect("Failed to create DAV client");
    client.connect().await.expect("OPTIONS probe failed");
    client
}

/// Calendar home of the test user, discovered through the principal.
pub async fn calendar_home(client: &DavClient) -> String {
    let principal = client
        .get_current_principal()
        .await
        .expect("principal lookup failed")
        .expect("no current-user-principal");
    client
        .get_calendar_home_set(&principal)
        .await
        .expect("calendar-home-set lookup failed")
        .expect("no calendar-home-set")
}

pub async fn address_book_home(client: &DavClient) -> String {
    let principal = client
        .get_current_principal()
        .await
        .expect("principal lookup failed")
        .expect("no current-user-principal");
    client
        .get_address_book_home_set(&principal)
        .await
        .expect("addressbook-home-set lookup failed")
        .expect("no addressbook-home-set")
}

pub fn event(uid: &str, summary: &str) -> String {
    format!(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//groupware-dav-rs//e2e//EN\r\nBEGIN:VEVENT\r\nUID:{uid}\r\nDTSTAMP:20240101T000000Z\r\nDTSTART:20240115T100000Z\r\nDTEND:20240115T110000Z\r\nSUMMARY:{summary}\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n"
    )
}

pub fn vcard(uid: &str, full_name: &str) -> String {
    format!("BEGIN:VCARD\r\nVERSION:3.0\r\nUID:{uid}\r\nFN:{full_name}\r\nN:{full_name};;;;\r\nEND:VCARD\r\n")
}
