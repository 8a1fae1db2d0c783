//! The HTTP boundary.
//!
//! Protocol code only ever talks to a [`DavTransport`]; [`HyperTransport`] is
//! the production implementation (hyper 1 + rustls, Basic auth, transparent
//! response decompression).

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{HeaderMap, Request, Uri, header};
use tokio::time::{Duration, timeout};
use tracing::trace;

use crate::common::compression::{
    ContentEncoding, add_accept_encoding, add_content_encoding, compress_payload, decompress_body,
    detect_encodings,
};
use crate::common::http::{HyperClient, build_hyper_client};
use crate::config::ClientConfig;
use crate::error::{DavError, TransportError};
use crate::webdav::types::{DavRequest, DavResponse};

/// Sends one request and returns the complete response.
///
/// Implementations report only failures to obtain a response; any HTTP
/// status, including 4xx/5xx, is a successful send.
#[async_trait]
pub trait DavTransport: Send + Sync {
    async fn send(&self, request: DavRequest) -> Result<DavResponse, TransportError>;
}

#[derive(Clone)]
pub struct HyperTransport {
    base: Uri,
    client: HyperClient,
    auth_header: header::HeaderValue,
    user_agent: header::HeaderValue,
    timeout: Duration,
    request_compression: ContentEncoding,
}

impl HyperTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, DavError> {
        let base: Uri = config
            .base_url
            .parse()
            .map_err(|err| DavError::Config(format!("invalid base URL {:?}: {err}", config.base_url)))?;
        if base.scheme().is_none() || base.host().is_none() {
            return Err(DavError::Config(format!(
                "base URL {:?} must be absolute",
                config.base_url
            )));
        }

        let token = format!("{}:{}", config.user_name, config.secret);
        let mut auth_header = header::HeaderValue::from_str(&format!("Basic {}", B64.encode(token)))
            .map_err(|err| DavError::Config(format!("invalid credentials: {err}")))?;
        auth_header.set_sensitive(true);
        let user_agent = header::HeaderValue::from_str(&config.user_agent)
            .map_err(|err| DavError::Config(format!("invalid user agent: {err}")))?;

        Ok(Self {
            base,
            client: build_hyper_client(),
            auth_header,
            user_agent,
            timeout: config.timeout(),
            request_compression: config.request_compression,
        })
    }

    /// Resolve `path` against the base URL. Absolute URLs pass through,
    /// absolute paths replace the base path, relative paths are appended.
    pub fn build_uri(&self, path: &str) -> Result<Uri, TransportError> {
        let invalid = |err: &dyn std::fmt::Display| TransportError::InvalidUri(format!("{path}: {err}"));

        if path.starts_with("http://") || path.starts_with("https://") {
            return path.parse().map_err(|err| invalid(&err));
        }

        let mut parts = self.base.clone().into_parts();
        let existing_path = parts
            .path_and_query
            .as_ref()
            .map(|pq| pq.path())
            .unwrap_or("/");

        let (path_only, query) = match path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (path, None),
        };

        let combined = if path_only.is_empty() {
            existing_path.to_string()
        } else if path_only.starts_with('/') {
            path_only.to_string()
        } else {
            format!("{}/{}", existing_path.trim_end_matches('/'), path_only)
        };

        let path_and_query = match query {
            Some(q) => format!("{combined}?{q}"),
            None => combined,
        };
        parts.path_and_query = Some(path_and_query.parse().map_err(|err| invalid(&err))?);
        Uri::from_parts(parts).map_err(|err| invalid(&err))
    }

    async fn prepare_body(&self, payload: Bytes, headers: &mut HeaderMap) -> Bytes {
        headers.remove(header::CONTENT_ENCODING);
        if self.request_compression == ContentEncoding::Identity {
            return payload;
        }
        match compress_payload(payload.clone(), self.request_compression).await {
            Ok(compressed) => {
                add_content_encoding(headers, self.request_compression);
                compressed
            }
            Err(err) => {
                trace!(error = %err, "request compression failed, sending identity");
                payload
            }
        }
    }
}

#[async_trait]
impl DavTransport for HyperTransport {
    async fn send(&self, request: DavRequest) -> Result<DavResponse, TransportError> {
        let uri = self.build_uri(&request.path)?;
        let mut headers = request.headers;
        add_accept_encoding(&mut headers);
        headers.insert(header::AUTHORIZATION, self.auth_header.clone());
        headers.insert(header::USER_AGENT, self.user_agent.clone());

        let body = match request.body {
            Some(payload) => self.prepare_body(payload, &mut headers).await,
            None => Bytes::new(),
        };

        let mut builder = Request::builder().method(request.method).uri(uri);
        if let Some(h) = builder.headers_mut() {
            h.extend(headers);
        }
        let req = builder.body(Full::new(body))?;

        let resp = timeout(self.timeout, self.client.request(req))
            .await
            .map_err(|_| TransportError::Timeout)??;

        let encodings = detect_encodings(resp.headers());
        let (mut parts, body) = resp.into_parts();
        let body = decompress_body(body, &encodings).await?;

        if !encodings.is_empty() {
            parts.headers.remove(header::CONTENT_ENCODING);
            parts.headers.insert(header::CONTENT_LENGTH, header::HeaderValue::from(body.len()));
        }

        Ok(DavResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}
