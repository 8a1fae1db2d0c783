//! Asynchronous CalDAV/CardDAV client for groupware backends.
//!
//! One [`DavClient`] serves one account: it probes the server once with
//! [`DavClient::connect`] and then exposes calendar, address book, principal,
//! proxy delegation and sync operations. Requests go through a
//! [`DavTransport`]; the default [`HyperTransport`] uses hyper 1.x with rustls
//! and transparent response decompression (br/zstd/gzip).
//!
//! # Example
//!
//! ```no_run
//! use groupware_dav_rs::{ClientConfig, DavClient};
//!
//! # async fn run() -> groupware_dav_rs::Result<()> {
//! let mut client = DavClient::new(ClientConfig::new(
//!     "https://dav.example.com/dav/",
//!     "alice",
//!     "secret",
//! ))?;
//! client.connect().await?;
//!
//! if let Some(principal) = client.get_current_principal().await? {
//!     if let Some(home) = client.get_calendar_home_set(&principal).await? {
//!         for (id, calendar) in client.get_calendars(&home).await? {
//!             println!("{id}: {:?}", calendar.display_name);
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Several accounts sharing one server are best held in a [`ClientCache`].

pub mod cache;
pub mod caldav;
pub mod carddav;
pub mod client;
pub mod common;
pub mod config;
pub mod error;
pub mod principal;
pub mod sync;
pub mod webdav;

pub use cache::ClientCache;
pub use caldav::{AccessLevel, Calendar, CalendarObject, CalendarShare};
pub use carddav::{AddressBook, AddressFilter, AddressObject, AddressObjectInfo};
pub use client::DavClient;
pub use common::ContentEncoding;
pub use config::{ClientConfig, Credential};
pub use error::{DavError, ParseError, Result, TransportError};
pub use principal::{ProxiedFor, ProxyMode, ProxyRelation};
pub use sync::{CollectionKind, SyncItem, SyncResponse, SyncToken};
pub use webdav::{
    DavRequest, DavResponse, DavTransport, Depth, Filter, HyperTransport, Multistatus,
    PropPatch, PropertyKind, PropertyName, XmlNode,
};
