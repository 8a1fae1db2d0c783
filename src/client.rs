//! The account-level client: connection state, request execution and the
//! plain object verbs (GET, PUT, MOVE, DELETE).
//!
//! CalDAV, CardDAV and principal operations are implemented on the same
//! [`DavClient`] in their own modules.

use std::sync::Arc;

use hyper::{Method, StatusCode, Uri, header};
use tracing::{debug, info};

use crate::config::{ClientConfig, Credential};
use crate::error::{DavError, Result};
use crate::webdav::multistatus::{Multistatus, parse_multistatus};
use crate::webdav::property::PropertyName;
use crate::webdav::request::{PropPatch, build_propfind, build_proppatch};
use crate::webdav::transport::{DavTransport, HyperTransport};
use crate::webdav::types::{DavRequest, DavResponse, Depth};

/// A CalDAV/CardDAV client bound to one account.
///
/// A new client starts unconnected; [`DavClient::connect`] runs a capability
/// probe (`OPTIONS`) once, and every protocol operation fails with
/// [`DavError::NotConnected`] until it has succeeded.
pub struct DavClient {
    transport: Arc<dyn DavTransport>,
    credential: Credential,
    principals_prefix: String,
    bundled_server: Option<String>,
    protocol: String,
    host: String,
    port: Option<u16>,
    base_path: String,
    connected: bool,
    custom_server: bool,
}

impl DavClient {
    /// Client over the default hyper transport.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HyperTransport::new(&config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn DavTransport>) -> Result<Self> {
        let uri: Uri = config
            .base_url
            .parse()
            .map_err(|err| DavError::Config(format!("invalid base URL {:?}: {err}", config.base_url)))?;
        let (Some(protocol), Some(host)) = (uri.scheme_str(), uri.host()) else {
            return Err(DavError::Config(format!(
                "base URL {:?} must be absolute",
                config.base_url
            )));
        };

        Ok(Self {
            protocol: protocol.to_string(),
            host: host.to_string(),
            port: uri.port_u16(),
            base_path: uri.path().trim_end_matches('/').to_string(),
            credential: config.credential(),
            principals_prefix: config.principals_prefix,
            bundled_server: config.bundled_server,
            transport,
            connected: false,
            custom_server: false,
        })
    }

    /// Probe the server once. A no-op when already connected; a failed
    /// probe leaves the client unconnected.
    pub async fn connect(&mut self) -> Result<()> {
        if self.connected {
            return Ok(());
        }
        let url = self.base_url().to_string();
        let resp = self.send("OPTIONS", DavRequest::new(Method::OPTIONS, "")).await?;
        if !resp.status.is_success() {
            return Err(status_error("OPTIONS", &url, resp.status));
        }

        let server = resp.header_str(header::SERVER);
        self.custom_server = match &self.bundled_server {
            Some(expected) => server != Some(expected.as_str()),
            None => false,
        };
        self.connected = true;
        info!(url = %url, server = server.unwrap_or("-"), custom = self.custom_server, "connected");
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// True when the probe identified a server other than the bundled one.
    pub fn is_custom_server(&self) -> bool {
        self.custom_server
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn base_url(&self) -> &str {
        &self.credential.base_url
    }

    pub fn user(&self) -> &str {
        &self.credential.user_name
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Path of the DAV root without trailing slash (`""` for the server root).
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// `scheme://host[:port]`; the port is left out when it is the scheme default.
    pub fn server_url(&self) -> String {
        let default_port = match self.protocol.as_str() {
            "https" => 443,
            _ => 80,
        };
        match self.port {
            Some(port) if port != default_port => format!("{}://{}:{port}", self.protocol, self.host),
            _ => format!("{}://{}", self.protocol, self.host),
        }
    }

    /// Principal URL of `user` by naming convention, for servers without
    /// principal discovery.
    pub fn principal_url(&self, user: &str) -> String {
        format!(
            "{}{}/{}{user}",
            self.server_url(),
            self.base_path,
            self.principals_prefix
        )
    }

    pub(crate) fn principals_prefix(&self) -> &str {
        &self.principals_prefix
    }

    /// `href` relative to the DAV root, without a leading slash.
    pub(crate) fn relative_href<'a>(&self, href: &'a str) -> &'a str {
        let path = match href.split_once("://") {
            Some((_, rest)) if self.is_own_authority(href) => {
                rest.find('/').map_or("", |idx| &rest[idx..])
            }
            _ => href,
        };
        let path = if self.base_path.is_empty() {
            path
        } else {
            path.strip_prefix(self.base_path.as_str()).unwrap_or(path)
        };
        path.trim_start_matches('/')
    }

    /// True when the absolute `href` points at this client's server, with the
    /// default port written out or not.
    fn is_own_authority(&self, href: &str) -> bool {
        let Ok(uri) = href.parse::<Uri>() else {
            return false;
        };
        let default_port = if self.protocol == "https" { 443 } else { 80 };
        uri.scheme_str() == Some(self.protocol.as_str())
            && uri.host().is_some_and(|host| host.eq_ignore_ascii_case(&self.host))
            && uri.port_u16().unwrap_or(default_port) == self.port.unwrap_or(default_port)
    }

    /// Absolute URL for a `Destination` header.
    fn absolute_url(&self, target: &str) -> String {
        if target.starts_with("http://") || target.starts_with("https://") {
            target.to_string()
        } else if target.starts_with('/') {
            format!("{}{target}", self.server_url())
        } else {
            format!("{}{}/{target}", self.server_url(), self.base_path)
        }
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(DavError::NotConnected)
        }
    }

    async fn send(&self, operation: &'static str, request: DavRequest) -> Result<DavResponse> {
        let method = request.method.clone();
        let url = request.path.clone();
        match self.transport.send(request).await {
            Ok(resp) => {
                debug!(%method, url = %url, status = resp.status.as_u16(), "dav request");
                Ok(resp)
            }
            Err(source) => {
                debug!(%method, url = %url, error = %source, "dav request failed");
                Err(DavError::Transport {
                    operation,
                    url,
                    source,
                })
            }
        }
    }

    /// Send on a connected client; any HTTP status is returned as is.
    pub(crate) async fn execute(
        &self,
        operation: &'static str,
        request: DavRequest,
    ) -> Result<DavResponse> {
        self.ensure_connected()?;
        self.send(operation, request).await
    }

    /// Like [`Self::execute`] but non-2xx statuses become errors.
    pub(crate) async fn execute_ok(
        &self,
        operation: &'static str,
        request: DavRequest,
    ) -> Result<DavResponse> {
        let url = request.path.clone();
        let resp = self.execute(operation, request).await?;
        if resp.status.is_success() {
            Ok(resp)
        } else {
            Err(status_error(operation, &url, resp.status))
        }
    }

    pub(crate) fn parse(
        &self,
        operation: &'static str,
        url: &str,
        resp: &DavResponse,
    ) -> Result<Multistatus> {
        parse_multistatus(&resp.body).map_err(|source| DavError::Protocol {
            operation,
            url: url.to_string(),
            source,
        })
    }

    pub(crate) async fn propfind(
        &self,
        url: &str,
        depth: Depth,
        props: &[PropertyName],
    ) -> Result<Multistatus> {
        let request = DavRequest::new(Method::from_bytes(b"PROPFIND").map_err(invalid_method)?, url)
            .depth(depth)
            .xml(build_propfind(props));
        let resp = self.execute_ok("PROPFIND", request).await?;
        self.parse("PROPFIND", url, &resp)
    }

    pub(crate) async fn report(
        &self,
        operation: &'static str,
        url: &str,
        depth: Depth,
        body: String,
    ) -> Result<Multistatus> {
        let resp = self.report_raw(operation, url, depth, body).await?;
        self.parse(operation, url, &resp)
    }

    pub(crate) async fn report_raw(
        &self,
        operation: &'static str,
        url: &str,
        depth: Depth,
        body: String,
    ) -> Result<DavResponse> {
        let request = DavRequest::new(Method::from_bytes(b"REPORT").map_err(invalid_method)?, url)
            .depth(depth)
            .xml(body);
        self.execute_ok(operation, request).await
    }

    /// Apply `patch`; succeeds only when every property was accepted.
    pub(crate) async fn proppatch(&self, url: &str, patch: &PropPatch) -> Result<()> {
        if patch.is_empty() {
            return Err(DavError::Validation("empty PROPPATCH".to_string()));
        }
        let request = DavRequest::new(Method::from_bytes(b"PROPPATCH").map_err(invalid_method)?, url)
            .xml(build_proppatch(patch));
        let resp = self.execute_ok("PROPPATCH", request).await?;

        // Some servers answer a fully applied patch with a bare 200/204.
        if resp.status != StatusCode::MULTI_STATUS || resp.body.is_empty() {
            return Ok(());
        }
        let multistatus = self.parse("PROPPATCH", url, &resp)?;
        let refused: Vec<PropertyName> = multistatus
            .entries()
            .iter()
            .flat_map(|entry| entry.refused())
            .collect();
        if refused.is_empty() {
            Ok(())
        } else {
            Err(DavError::Rejected {
                operation: "PROPPATCH",
                url: url.to_string(),
                properties: refused,
            })
        }
    }

    /// `GET` a resource and return its body as text.
    pub async fn get_item(&self, url: &str) -> Result<String> {
        let resp = self.execute_ok("GET", DavRequest::new(Method::GET, url)).await?;
        Ok(String::from_utf8_lossy(&resp.body).into_owned())
    }

    /// `PUT` a new object; refused by the server if `url` already exists.
    /// Returns the new etag when the server reports one.
    pub async fn create_object(&self, url: &str, data: &str) -> Result<Option<String>> {
        let request = DavRequest::new(Method::PUT, url)
            .header(header::IF_NONE_MATCH, header::HeaderValue::from_static("*"))
            .header(header::CONTENT_TYPE, content_type_for(url))
            .body(data.to_string());
        let resp = self.execute_ok("PUT", request).await?;
        Ok(resp.etag())
    }

    /// `PUT` over an existing object, only if its etag still matches.
    pub async fn update_object(&self, url: &str, data: &str, etag: &str) -> Result<Option<String>> {
        let if_match = header::HeaderValue::from_str(&if_match_value(etag))
            .map_err(|err| DavError::Validation(format!("invalid etag {etag:?}: {err}")))?;
        let request = DavRequest::new(Method::PUT, url)
            .header(header::IF_MATCH, if_match)
            .header(header::CONTENT_TYPE, content_type_for(url))
            .body(data.to_string());
        let resp = self.execute_ok("PUT", request).await?;
        Ok(resp.etag())
    }

    pub async fn move_resource(&self, url: &str, new_url: &str) -> Result<()> {
        let destination = header::HeaderValue::from_str(&self.absolute_url(new_url))
            .map_err(|err| DavError::Validation(format!("invalid destination {new_url:?}: {err}")))?;
        let request = DavRequest::new(Method::from_bytes(b"MOVE").map_err(invalid_method)?, url)
            .header(header::HeaderName::from_static("destination"), destination);
        let resp = self.execute_ok("MOVE", request).await?;
        self.check_members("MOVE", url, &resp)
    }

    pub async fn delete_resource(&self, url: &str) -> Result<()> {
        let resp = self
            .execute_ok("DELETE", DavRequest::new(Method::DELETE, url))
            .await?;
        self.check_members("DELETE", url, &resp)
    }

    /// A `207` answer to MOVE or DELETE lists the members that failed.
    fn check_members(&self, operation: &'static str, url: &str, resp: &DavResponse) -> Result<()> {
        if resp.status != StatusCode::MULTI_STATUS || resp.body.is_empty() {
            return Ok(());
        }
        let multistatus = self.parse(operation, url, resp)?;
        let failed = multistatus.entries().iter().find_map(|entry| {
            let status = StatusCode::from_u16(entry.status?).ok()?;
            (!status.is_success()).then(|| (entry.href.clone(), status))
        });
        match failed {
            Some((href, status)) => {
                debug!(operation, url = %url, member = %href, status = status.as_u16(), "member failed");
                Err(status_error(operation, url, status))
            }
            None => Ok(()),
        }
    }
}

/// `If-Match` value for `etag`: weak and already quoted tags are sent as
/// they are, bare ones get quoted.
fn if_match_value(etag: &str) -> String {
    let etag = etag.trim();
    if etag.starts_with("W/") || (etag.len() >= 2 && etag.starts_with('"') && etag.ends_with('"')) {
        etag.to_string()
    } else {
        format!("\"{etag}\"")
    }
}

pub(crate) fn status_error(operation: &'static str, url: &str, status: StatusCode) -> DavError {
    if status == StatusCode::PRECONDITION_FAILED {
        DavError::PreconditionFailed {
            operation,
            url: url.to_string(),
        }
    } else {
        DavError::Status {
            operation,
            url: url.to_string(),
            status,
        }
    }
}

pub(crate) fn invalid_method(err: hyper::http::method::InvalidMethod) -> DavError {
    DavError::Validation(err.to_string())
}

fn content_type_for(url: &str) -> header::HeaderValue {
    let lower = url.to_ascii_lowercase();
    if lower.ends_with(".ics") {
        header::HeaderValue::from_static("text/calendar; charset=utf-8")
    } else if lower.ends_with(".vcf") {
        header::HeaderValue::from_static("text/vcard; charset=utf-8")
    } else {
        header::HeaderValue::from_static("application/octet-stream")
    }
}
