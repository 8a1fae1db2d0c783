use bytes::Bytes;
use hyper::{HeaderMap, Method, StatusCode, header};

/// WebDAV Depth
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Depth {
    Zero,
    One,
    Infinity,
}
impl Depth {
    pub fn as_str(self) -> &'static str {
        match self {
            Depth::Zero => "0",
            Depth::One => "1",
            Depth::Infinity => "infinity",
        }
    }
}

/// A request as handed to a [`crate::DavTransport`].
///
/// `path` is either absolute (`https://...`) or resolved against the
/// transport's base URL.
#[derive(Debug, Clone)]
pub struct DavRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl DavRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: header::HeaderName, value: header::HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn depth(self, depth: Depth) -> Self {
        self.header(
            header::HeaderName::from_static("depth"),
            header::HeaderValue::from_static(depth.as_str()),
        )
    }

    /// XML body with `Content-Type: application/xml; charset=utf-8`.
    pub fn xml(mut self, body: String) -> Self {
        self.headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/xml; charset=utf-8"),
        );
        self.body = Some(Bytes::from(body));
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body_str(&self) -> Option<&str> {
        self.body.as_ref().and_then(|b| std::str::from_utf8(b).ok())
    }
}

/// A fully received (and decompressed) response.
#[derive(Debug, Clone)]
pub struct DavResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl DavResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn header_str(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// `ETag` header with surrounding quotes removed.
    pub fn etag(&self) -> Option<String> {
        self.header_str(header::ETAG).map(unquote_etag)
    }
}

/// Strip surrounding double quotes from an entity tag.
pub fn unquote_etag(raw: &str) -> String {
    let raw = raw.trim();
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw)
        .to_string()
}
