//! Namespaced DAV property names.

use std::fmt;

/// Namespace for properties defined in the WebDAV specifications.
pub const NS_DAV: &str = "DAV:";
/// Namespace for CalDAV (RFC 4791).
pub const NS_CALDAV: &str = "urn:ietf:params:xml:ns:caldav";
/// Namespace for CardDAV (RFC 6352).
pub const NS_CARDDAV: &str = "urn:ietf:params:xml:ns:carddav";
/// Calendar server extensions (ctag, sharing invites, proxies).
pub const NS_CALENDARSERVER: &str = "http://calendarserver.org/ns/";
/// Apple iCal extensions (calendar color and order).
pub const NS_APPLE_ICAL: &str = "http://apple.com/ns/ical/";

/// Properties the client knows how to request and interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKind {
    ResourceType,
    DisplayName,
    CalendarDescription,
    CalendarOrder,
    CalendarColor,
    CalendarData,
    AddressData,
    Owner,
    GetCtag,
    GetEtag,
    CurrentUserPrincipal,
    CalendarHomeSet,
    AddressBookHomeSet,
    Invite,
    GroupMembership,
    GroupMemberSet,
    SyncToken,
    CalendarProxyReadFor,
    CalendarProxyWriteFor,
    GetContentType,
    GetLastModified,
}

impl PropertyKind {
    pub const ALL: [PropertyKind; 21] = [
        Self::ResourceType,
        Self::DisplayName,
        Self::CalendarDescription,
        Self::CalendarOrder,
        Self::CalendarColor,
        Self::CalendarData,
        Self::AddressData,
        Self::Owner,
        Self::GetCtag,
        Self::GetEtag,
        Self::CurrentUserPrincipal,
        Self::CalendarHomeSet,
        Self::AddressBookHomeSet,
        Self::Invite,
        Self::GroupMembership,
        Self::GroupMemberSet,
        Self::SyncToken,
        Self::CalendarProxyReadFor,
        Self::CalendarProxyWriteFor,
        Self::GetContentType,
        Self::GetLastModified,
    ];

    pub fn namespace(self) -> &'static str {
        match self {
            Self::ResourceType
            | Self::DisplayName
            | Self::Owner
            | Self::GetEtag
            | Self::CurrentUserPrincipal
            | Self::GroupMembership
            | Self::GroupMemberSet
            | Self::SyncToken
            | Self::GetContentType
            | Self::GetLastModified => NS_DAV,
            Self::CalendarDescription | Self::CalendarData | Self::CalendarHomeSet => NS_CALDAV,
            Self::AddressData | Self::AddressBookHomeSet => NS_CARDDAV,
            Self::GetCtag
            | Self::Invite
            | Self::CalendarProxyReadFor
            | Self::CalendarProxyWriteFor => NS_CALENDARSERVER,
            Self::CalendarOrder | Self::CalendarColor => NS_APPLE_ICAL,
        }
    }

    pub fn local_name(self) -> &'static str {
        match self {
            Self::ResourceType => "resourcetype",
            Self::DisplayName => "displayname",
            Self::CalendarDescription => "calendar-description",
            Self::CalendarOrder => "calendar-order",
            Self::CalendarColor => "calendar-color",
            Self::CalendarData => "calendar-data",
            Self::AddressData => "address-data",
            Self::Owner => "owner",
            Self::GetCtag => "getctag",
            Self::GetEtag => "getetag",
            Self::CurrentUserPrincipal => "current-user-principal",
            Self::CalendarHomeSet => "calendar-home-set",
            Self::AddressBookHomeSet => "addressbook-home-set",
            Self::Invite => "invite",
            Self::GroupMembership => "group-membership",
            Self::GroupMemberSet => "group-member-set",
            Self::SyncToken => "sync-token",
            Self::CalendarProxyReadFor => "calendar-proxy-read-for",
            Self::CalendarProxyWriteFor => "calendar-proxy-write-for",
            Self::GetContentType => "getcontenttype",
            Self::GetLastModified => "getlastmodified",
        }
    }

    fn lookup(namespace: &str, local_name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.namespace() == namespace && kind.local_name() == local_name)
    }
}

/// A namespaced property identifier such as `{DAV:}displayname`.
///
/// Names are compared by exact namespace and local name. Unrecognized
/// properties are kept verbatim in the `Other` variant; [`PropertyName::new`]
/// always normalizes a known pair to `Known` so the two spellings never
/// coexist as distinct map keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyName {
    Known(PropertyKind),
    Other { namespace: String, local_name: String },
}

impl PropertyName {
    pub fn new(namespace: &str, local_name: &str) -> Self {
        match PropertyKind::lookup(namespace, local_name) {
            Some(kind) => Self::Known(kind),
            None => Self::Other {
                namespace: namespace.to_string(),
                local_name: local_name.to_string(),
            },
        }
    }

    /// Parse Clark notation (`{namespace}local`). A bare name has no namespace.
    pub fn from_clark(raw: &str) -> Self {
        match raw.strip_prefix('{').and_then(|rest| rest.split_once('}')) {
            Some((namespace, local_name)) => Self::new(namespace, local_name),
            None => Self::new("", raw),
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            Self::Known(kind) => kind.namespace(),
            Self::Other { namespace, .. } => namespace,
        }
    }

    pub fn local_name(&self) -> &str {
        match self {
            Self::Known(kind) => kind.local_name(),
            Self::Other { local_name, .. } => local_name,
        }
    }

    pub fn kind(&self) -> Option<PropertyKind> {
        match self {
            Self::Known(kind) => Some(*kind),
            Self::Other { .. } => None,
        }
    }

    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.namespace() == namespace && self.local_name() == local_name
    }
}

impl From<PropertyKind> for PropertyName {
    fn from(kind: PropertyKind) -> Self {
        Self::Known(kind)
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.namespace(), self.local_name())
    }
}

/// Prefix used for a namespace in generated request bodies.
///
/// Every document produced by [`crate::webdav::request`] declares these
/// prefixes on its root element.
pub(crate) fn prefix_for(namespace: &str) -> Option<&'static str> {
    match namespace {
        NS_DAV => Some("D"),
        NS_CALDAV => Some("C"),
        NS_CARDDAV => Some("CR"),
        NS_CALENDARSERVER => Some("CS"),
        NS_APPLE_ICAL => Some("IC"),
        _ => None,
    }
}
