pub mod filter;
pub mod multistatus;
pub mod property;
pub mod request;
pub mod transport;
pub mod types;
pub mod xml;

pub use filter::{
    CompFilter, Filter, FilterTerm, MatchType, PropFilter, TextMatch, TimeRange,
    build_prop_filter_term, build_time_range_term,
};
pub use multistatus::{Multistatus, MultistatusEntry, PropMap, parse_multistatus};
pub use property::{PropertyKind, PropertyName};
pub use request::{
    PropPatch, PropValue, build_calendar_proxy_expand, build_group_member_set_patch,
    build_propfind, build_proppatch, build_sync_collection,
};
pub use transport::{DavTransport, HyperTransport};
pub use types::{DavRequest, DavResponse, Depth, unquote_etag};
pub use xml::{XmlNode, escape_xml, parse_document};
