//! Principals, group membership and calendar proxy delegation.

pub mod client;
pub mod expand;
pub mod types;

pub use expand::parse_proxied_for;
pub use types::{ProxiedFor, ProxyMode, ProxyRelation};
