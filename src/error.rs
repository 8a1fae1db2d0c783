//! Error types surfaced by the client.
//!
//! Three layers fail independently: the transport ([`TransportError`]), the
//! XML decoding of a response ([`ParseError`]) and the protocol operation
//! itself ([`DavError`]), which wraps the other two together with the
//! operation name and target URL.

use hyper::StatusCode;
use thiserror::Error;

use crate::webdav::property::PropertyName;

pub type Result<T, E = DavError> = std::result::Result<T, E>;

/// Failure of a protocol operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DavError {
    /// The request never produced an HTTP response.
    #[error("{operation} {url}: transport failure")]
    Transport {
        operation: &'static str,
        url: String,
        #[source]
        source: TransportError,
    },

    /// The server answered with a non-success status.
    #[error("{operation} {url}: server answered {status}")]
    Status {
        operation: &'static str,
        url: String,
        status: StatusCode,
    },

    /// A conditional write (`If-Match` / `If-None-Match`) was refused.
    #[error("{operation} {url}: precondition failed")]
    PreconditionFailed { operation: &'static str, url: String },

    /// The response was received but could not be understood.
    #[error("{operation} {url}: unexpected response")]
    Protocol {
        operation: &'static str,
        url: String,
        #[source]
        source: ParseError,
    },

    /// A PROPPATCH was answered but some properties were refused.
    #[error("{operation} {url}: server refused {}", display_properties(.properties))]
    Rejected {
        operation: &'static str,
        url: String,
        properties: Vec<PropertyName>,
    },

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("client is not connected")]
    NotConnected,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DavError {
    /// True for `412 Precondition Failed` on a conditional write.
    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, Self::PreconditionFailed { .. })
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::PreconditionFailed { .. } => Some(StatusCode::PRECONDITION_FAILED),
            _ => None,
        }
    }
}

fn display_properties(properties: &[PropertyName]) -> String {
    properties
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure reported by a [`crate::DavTransport`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("invalid request URI: {0}")]
    InvalidUri(String),

    #[error(transparent)]
    Http(#[from] hyper::http::Error),

    #[error(transparent)]
    Client(#[from] hyper_util::client::legacy::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure decoding an XML response body.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    #[error("malformed XML: {0}")]
    Xml(String),

    #[error("document has no root element")]
    Empty,

    #[error("expected <{expected}> root element, found <{found}>")]
    UnexpectedRoot { expected: &'static str, found: String },

    #[error("<response> element without <href>")]
    MissingHref,

    #[error("unparseable status line {0:?}")]
    BadStatus(String),
}

impl ParseError {
    pub(crate) fn xml(err: impl std::fmt::Display) -> Self {
        Self::Xml(err.to_string())
    }
}
