pub mod client;
pub mod query;
pub mod types;

pub use query::{
    AddressFilter, FilterTest, build_addressbook_multiget, build_addressbook_query,
    search_filter, uid_filter,
};
pub use types::{AddressBook, AddressObject, AddressObjectInfo};
