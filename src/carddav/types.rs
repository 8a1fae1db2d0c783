use crate::caldav::types::last_segment;

/// An address book collection below an address book home.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressBook {
    /// Last path segment of `href`.
    pub id: String,
    pub href: String,
    pub display_name: Option<String>,
}

/// Address object (vCard) returned by an `addressbook-multiget`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressObject {
    pub href: String,
    pub etag: Option<String>,
    /// Raw vCard text.
    pub data: String,
    pub parent_url: String,
}

impl AddressObject {
    pub fn name(&self) -> &str {
        last_segment(&self.href)
    }
}

/// Href and etag of a card matched by an `addressbook-query` that did not
/// ask for card data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressObjectInfo {
    pub href: String,
    pub etag: Option<String>,
}

impl AddressObjectInfo {
    pub fn name(&self) -> &str {
        last_segment(&self.href)
    }
}
