use std::collections::BTreeMap;

use tracing::debug;

use crate::caldav::types::last_segment;
use crate::carddav::query::{
    AddressFilter, build_addressbook_multiget, build_addressbook_query, search_filter, uid_filter,
};
use crate::carddav::types::{AddressBook, AddressObject, AddressObjectInfo};
use crate::client::DavClient;
use crate::error::{DavError, Result};
use crate::webdav::multistatus::MultistatusEntry;
use crate::webdav::property::{NS_CARDDAV, PropertyKind, PropertyName};
use crate::webdav::types::{Depth, unquote_etag};

impl DavClient {
    /// `addressbook-query` (Depth 1) returning href and etag of matching cards.
    pub async fn query_address_objects(
        &self,
        url: &str,
        filter: Option<&AddressFilter>,
    ) -> Result<Vec<AddressObjectInfo>> {
        let multistatus = self
            .report(
                "REPORT addressbook-query",
                url,
                Depth::One,
                build_addressbook_query(filter, false),
            )
            .await?;
        Ok(multistatus
            .entries()
            .iter()
            .filter(|entry| has_ok_block(entry))
            .map(|entry| AddressObjectInfo {
                href: entry.href.clone(),
                etag: etag_of(entry),
            })
            .collect())
    }

    /// Fetch full cards by href with `addressbook-multiget`.
    pub async fn query_address_objects_by_href(
        &self,
        url: &str,
        hrefs: &[String],
    ) -> Result<Vec<AddressObject>> {
        if hrefs.is_empty() {
            return Err(DavError::Validation(
                "addressbook-multiget needs at least one href".to_string(),
            ));
        }
        let multistatus = self
            .report(
                "REPORT addressbook-multiget",
                url,
                Depth::One,
                build_addressbook_multiget(hrefs),
            )
            .await?;
        Ok(multistatus
            .entries()
            .iter()
            .filter(|entry| has_ok_block(entry))
            .map(|entry| AddressObject {
                href: entry.href.clone(),
                etag: etag_of(entry),
                data: entry
                    .ok_prop(PropertyKind::AddressData)
                    .map(|n| n.text.clone())
                    .unwrap_or_default(),
                parent_url: url.to_string(),
            })
            .collect())
    }

    /// Cards matching a free-text search and/or belonging to a group.
    pub async fn get_vcards_info(
        &self,
        url: &str,
        search: Option<&str>,
        group: Option<&str>,
    ) -> Result<Vec<AddressObjectInfo>> {
        let filter = search_filter(search, group);
        self.query_address_objects(url, filter.as_ref()).await
    }

    pub async fn get_vcard_by_uid(&self, url: &str, uid: &str) -> Result<Option<AddressObjectInfo>> {
        if uid.is_empty() {
            return Err(DavError::Validation("empty UID".to_string()));
        }
        let found = self
            .query_address_objects(url, Some(&uid_filter(uid)))
            .await?;
        Ok(found.into_iter().next())
    }

    /// Address books below an address book home, keyed by [`AddressBook::id`].
    pub async fn get_address_books(&self, home: &str) -> Result<BTreeMap<String, AddressBook>> {
        let props: [PropertyName; 2] = [
            PropertyKind::ResourceType.into(),
            PropertyKind::DisplayName.into(),
        ];
        let multistatus = self.propfind(home, Depth::One, &props).await?;
        Ok(multistatus
            .entries()
            .iter()
            .filter(|entry| {
                entry
                    .ok_prop(PropertyKind::ResourceType)
                    .is_some_and(|rt| rt.has_child(NS_CARDDAV, "addressbook"))
            })
            .map(|entry| {
                let book = AddressBook {
                    id: last_segment(&entry.href).to_string(),
                    href: entry.href.clone(),
                    display_name: entry.ok_text(PropertyKind::DisplayName),
                };
                (book.id.clone(), book)
            })
            .collect())
    }
}

fn has_ok_block(entry: &MultistatusEntry) -> bool {
    if entry.ok().is_some() {
        return true;
    }
    debug!(href = %entry.href, "skipping response without 200 propstat");
    false
}

fn etag_of(entry: &MultistatusEntry) -> Option<String> {
    entry
        .ok_text(PropertyKind::GetEtag)
        .map(|etag| unquote_etag(&etag))
}
