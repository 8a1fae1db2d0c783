use tracing::{debug, warn};

use crate::client::DavClient;
use crate::error::{DavError, Result};
use crate::principal::expand::parse_proxied_for;
use crate::principal::types::{ProxiedFor, ProxyRelation};
use crate::webdav::property::{PropertyKind, PropertyName};
use crate::webdav::request::{PropPatch, build_calendar_proxy_expand};
use crate::webdav::types::Depth;

impl DavClient {
    /// Hrefs of an href-valued property on a single resource (Depth 0).
    async fn href_property(&self, url: &str, kind: PropertyKind) -> Result<Vec<String>> {
        let multistatus = self.propfind(url, Depth::Zero, &[PropertyName::from(kind)]).await?;
        Ok(multistatus
            .entries()
            .iter()
            .find_map(|entry| entry.ok_prop(kind))
            .map(|node| node.hrefs())
            .unwrap_or_default())
    }

    /// Principal URL of the authenticated user.
    pub async fn get_current_principal(&self) -> Result<Option<String>> {
        Ok(self
            .href_property("", PropertyKind::CurrentUserPrincipal)
            .await?
            .into_iter()
            .next())
    }

    pub async fn get_calendar_home_set(&self, principal: &str) -> Result<Option<String>> {
        Ok(self
            .href_property(principal, PropertyKind::CalendarHomeSet)
            .await?
            .into_iter()
            .next())
    }

    pub async fn get_address_book_home_set(&self, principal: &str) -> Result<Option<String>> {
        Ok(self
            .href_property(principal, PropertyKind::AddressBookHomeSet)
            .await?
            .into_iter()
            .next())
    }

    /// Groups the principal belongs to. Failures are logged and yield an
    /// empty list.
    pub async fn get_principal_members(&self, principal: &str) -> Vec<String> {
        match self
            .href_property(principal, PropertyKind::GroupMembership)
            .await
        {
            Ok(groups) => groups,
            Err(err) => {
                warn!(principal = %principal, error = %err, "group membership lookup failed");
                Vec::new()
            }
        }
    }

    /// Members of a proxy group. Failures are logged and yield an empty list.
    pub async fn get_proxies(&self, proxy_url: &str) -> Vec<String> {
        match self
            .href_property(proxy_url, PropertyKind::GroupMemberSet)
            .await
        {
            Ok(members) => members,
            Err(err) => {
                warn!(proxy = %proxy_url, error = %err, "proxy lookup failed");
                Vec::new()
            }
        }
    }

    /// Current member set of a proxy group as hrefs relative to the DAV root.
    async fn proxy_members(&self, proxy_url: &str) -> Result<Vec<String>> {
        Ok(self
            .href_property(proxy_url, PropertyKind::GroupMemberSet)
            .await?
            .iter()
            .map(|href| self.relative_href(href).trim_end_matches('/').to_string())
            .collect())
    }

    fn delegate_href(&self, delegate_id: &str) -> Result<String> {
        let id = delegate_id.trim_matches('/');
        if id.is_empty() {
            return Err(DavError::Validation("empty delegate id".to_string()));
        }
        Ok(format!("{}{id}", self.principals_prefix()))
    }

    async fn write_proxy_members(&self, proxy_url: &str, members: &[String]) -> Result<()> {
        let hrefs = members
            .iter()
            .map(|m| format!("{}/{m}", self.base_path()))
            .collect();
        let patch = PropPatch::new().set_hrefs(PropertyKind::GroupMemberSet, hrefs);
        self.proppatch(proxy_url, &patch).await
    }

    /// Add `delegate_id` to the proxy group at `proxy_url`.
    ///
    /// Returns `false` without writing anything when the delegate is already
    /// a member.
    pub async fn add_proxy(&self, proxy_url: &str, delegate_id: &str) -> Result<bool> {
        let delegate = self.delegate_href(delegate_id)?;
        let mut members = self.proxy_members(proxy_url).await?;
        if members.contains(&delegate) {
            debug!(proxy = %proxy_url, delegate = %delegate, "already a proxy");
            return Ok(false);
        }
        members.push(delegate);
        self.write_proxy_members(proxy_url, &members).await?;
        Ok(true)
    }

    /// Remove `delegate_id` from the proxy group, writing back the remainder
    /// (possibly an empty set).
    pub async fn delete_proxy(&self, proxy_url: &str, delegate_id: &str) -> Result<()> {
        let delegate = self.delegate_href(delegate_id)?;
        let mut members = self.proxy_members(proxy_url).await?;
        members.retain(|m| *m != delegate);
        self.write_proxy_members(proxy_url, &members).await
    }

    pub async fn add_proxy_relation(&self, relation: &ProxyRelation) -> Result<bool> {
        self.add_proxy(&relation.group_url(), &relation.delegate)
            .await
    }

    pub async fn delete_proxy_relation(&self, relation: &ProxyRelation) -> Result<()> {
        self.delete_proxy(&relation.group_url(), &relation.delegate)
            .await
    }

    /// Calendar homes of every principal that made `principal` a read or
    /// write proxy, read entries first.
    pub async fn get_proxied_for(&self, principal: &str) -> Result<Vec<ProxiedFor>> {
        let resp = self
            .report_raw(
                "REPORT expand-property",
                principal,
                Depth::Zero,
                build_calendar_proxy_expand(),
            )
            .await?;
        parse_proxied_for(&resp.body).map_err(|source| DavError::Protocol {
            operation: "REPORT expand-property",
            url: principal.to_string(),
            source,
        })
    }
}
