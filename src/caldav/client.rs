use std::collections::BTreeMap;

use hyper::Method;
use tracing::debug;

use crate::caldav::query::{
    alarms_filter, build_calendar_query, build_mkcalendar, event_uid_filter, events_filter,
    todos_filter, whole_calendar_filter,
};
use crate::caldav::types::{
    AccessLevel, Calendar, CalendarObject, CalendarShare, last_segment, normalize_color,
};
use crate::client::{DavClient, invalid_method};
use crate::error::Result;
use crate::webdav::filter::Filter;
use crate::webdav::multistatus::{Multistatus, MultistatusEntry};
use crate::webdav::property::{NS_CALDAV, NS_CALENDARSERVER, PropertyKind, PropertyName};
use crate::webdav::request::PropPatch;
use crate::webdav::types::{DavRequest, Depth, unquote_etag};
use crate::webdav::xml::XmlNode;

const CALENDAR_PROPS: [PropertyKind; 8] = [
    PropertyKind::ResourceType,
    PropertyKind::DisplayName,
    PropertyKind::Owner,
    PropertyKind::GetCtag,
    PropertyKind::CalendarDescription,
    PropertyKind::CalendarColor,
    PropertyKind::CalendarOrder,
    PropertyKind::Invite,
];

impl DavClient {
    /// Run a calendar-query `REPORT` (Depth 1) against `url`.
    ///
    /// Only responses with a `200` propstat become objects; the rest are
    /// skipped.
    pub async fn query_calendar_objects(
        &self,
        url: &str,
        filter: &Filter,
    ) -> Result<Vec<CalendarObject>> {
        let multistatus = self
            .report("REPORT calendar-query", url, Depth::One, build_calendar_query(filter))
            .await?;
        Ok(map_calendar_objects(url, multistatus))
    }

    /// Events overlapping `[start, end)`; both bounds optional.
    pub async fn get_events(
        &self,
        url: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<CalendarObject>> {
        self.query_calendar_objects(&collection_url(url), &events_filter(start, end))
            .await
    }

    pub async fn get_event_by_uid(&self, url: &str, uid: &str) -> Result<Option<CalendarObject>> {
        let mut objects = self
            .query_calendar_objects(&collection_url(url), &event_uid_filter(uid))
            .await?;
        Ok(if objects.is_empty() {
            None
        } else {
            Some(objects.swap_remove(0))
        })
    }

    pub async fn get_alarms(
        &self,
        url: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<CalendarObject>> {
        self.query_calendar_objects(&collection_url(url), &alarms_filter(start, end))
            .await
    }

    pub async fn get_todos(
        &self,
        url: &str,
        start: Option<&str>,
        end: Option<&str>,
        completed: bool,
        cancelled: bool,
    ) -> Result<Vec<CalendarObject>> {
        let filter = todos_filter(start, end, completed, cancelled);
        self.query_calendar_objects(&collection_url(url), &filter)
            .await
    }

    /// Every object of the calendar regardless of component type.
    pub async fn get_calendar_objects(&self, url: &str) -> Result<Vec<CalendarObject>> {
        self.query_calendar_objects(&collection_url(url), &whole_calendar_filter())
            .await
    }

    /// Calendars below a calendar home, keyed by [`Calendar::id`].
    ///
    /// Collections that are shared with the account (resourcetype
    /// `CS:shared`) are left out.
    pub async fn get_calendars(&self, home: &str) -> Result<BTreeMap<String, Calendar>> {
        let props: Vec<PropertyName> = CALENDAR_PROPS.into_iter().map(Into::into).collect();
        let multistatus = self.propfind(home, Depth::One, &props).await?;
        Ok(multistatus
            .entries()
            .iter()
            .filter_map(calendar_from_entry)
            .map(|calendar| (calendar.id.clone(), calendar))
            .collect())
    }

    pub async fn update_calendar_properties(
        &self,
        url: &str,
        display_name: &str,
        description: &str,
        order: i32,
        color: &str,
    ) -> Result<()> {
        let patch = PropPatch::new()
            .set_text(PropertyKind::DisplayName, display_name)
            .set_text(PropertyKind::CalendarDescription, description)
            .set_text(PropertyKind::CalendarOrder, order.to_string())
            .set_text(PropertyKind::CalendarColor, color);
        self.proppatch(url, &patch).await
    }

    pub async fn update_calendar_color(&self, url: &str, color: &str) -> Result<()> {
        let patch = PropPatch::new().set_text(PropertyKind::CalendarColor, color);
        self.proppatch(url, &patch).await
    }

    /// `MKCALENDAR` at `parent/system_name/`; returns the new collection URL.
    pub async fn create_calendar(
        &self,
        parent: &str,
        system_name: &str,
        display_name: &str,
        description: &str,
        order: i32,
        color: &str,
    ) -> Result<String> {
        let url = format!("{}{}/", collection_url(parent), system_name.trim_matches('/'));
        let request = DavRequest::new(Method::from_bytes(b"MKCALENDAR").map_err(invalid_method)?, &url)
            .xml(build_mkcalendar(display_name, description, order, color));
        self.execute_ok("MKCALENDAR", request).await?;
        debug!(url = %url, "calendar created");
        Ok(url)
    }
}

/// `url` with exactly one trailing slash.
pub(crate) fn collection_url(url: &str) -> String {
    format!("{}/", url.trim_end_matches('/'))
}

pub(crate) fn map_calendar_objects(parent_url: &str, multistatus: Multistatus) -> Vec<CalendarObject> {
    let mut out = Vec::with_capacity(multistatus.len());
    for entry in multistatus.into_entries() {
        if entry.ok().is_none() {
            debug!(href = %entry.href, "skipping response without 200 propstat");
            continue;
        }
        out.push(CalendarObject {
            etag: entry.ok_text(PropertyKind::GetEtag).map(|e| unquote_etag(&e)),
            data: entry
                .ok_prop(PropertyKind::CalendarData)
                .map(|n| n.text.clone())
                .unwrap_or_default(),
            href: entry.href,
            parent_url: parent_url.to_string(),
        });
    }
    out
}

/// Build a [`Calendar`] from a PROPFIND entry, `None` unless it is an owned
/// calendar collection.
pub(crate) fn calendar_from_entry(entry: &MultistatusEntry) -> Option<Calendar> {
    let resource_type = entry.ok_prop(PropertyKind::ResourceType)?;
    if !resource_type.has_child(NS_CALDAV, "calendar")
        || resource_type.has_child(NS_CALENDARSERVER, "shared")
    {
        return None;
    }

    Some(Calendar {
        id: last_segment(&entry.href).to_string(),
        href: entry.href.clone(),
        display_name: entry.ok_text(PropertyKind::DisplayName),
        ctag: entry.ok_text(PropertyKind::GetCtag),
        description: entry.ok_text(PropertyKind::CalendarDescription),
        color: entry
            .ok_text(PropertyKind::CalendarColor)
            .map(|c| normalize_color(&c)),
        order: entry
            .ok_text(PropertyKind::CalendarOrder)
            .and_then(|o| o.parse().ok()),
        owner: entry.ok_prop(PropertyKind::Owner).and_then(|owner| {
            owner
                .href()
                .or_else(|| Some(owner.trimmed_text().to_string()).filter(|t| !t.is_empty()))
        }),
        shares: entry
            .ok_prop(PropertyKind::Invite)
            .map(parse_invites)
            .unwrap_or_default(),
    })
}

/// Sharees listed in a `CS:invite` property.
pub fn parse_invites(invite: &XmlNode) -> Vec<CalendarShare> {
    invite
        .children_named(NS_CALENDARSERVER, "user")
        .filter_map(|user| {
            let href = user.href()?;
            let email = last_segment(&href);
            let email = email.strip_prefix("mailto:").unwrap_or(email);
            if email.is_empty() {
                return None;
            }
            let access = user.child(NS_CALENDARSERVER, "access")?.children.first()?;
            let access = if access.is(NS_CALENDARSERVER, "read-write") {
                AccessLevel::Write
            } else {
                AccessLevel::Read
            };
            Some(CalendarShare {
                email: email.to_string(),
                access,
            })
        })
        .collect()
}
