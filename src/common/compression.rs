//! Content-Encoding handling for DAV bodies.
//!
//! Responses are decoded according to their `Content-Encoding` chain; request
//! bodies are optionally compressed when [`crate::ClientConfig`] asks for it.

use std::io::{self, Cursor};

use async_compression::tokio::bufread::{
    BrotliDecoder, BrotliEncoder, GzipDecoder, GzipEncoder, ZstdDecoder, ZstdEncoder,
};
use bytes::Bytes;
use futures_util::TryStreamExt;
use http_body_util::BodyStream;
use hyper::body::Incoming;
use hyper::{HeaderMap, header};
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncReadExt, BufReader};
use tokio_util::io::StreamReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentEncoding {
    #[default]
    Identity,
    Br,
    Gzip,
    Zstd,
}

impl ContentEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentEncoding::Identity => "identity",
            ContentEncoding::Br => "br",
            ContentEncoding::Gzip => "gzip",
            ContentEncoding::Zstd => "zstd",
        }
    }
}

/// Encodings listed in `Content-Encoding`, in the order they were applied.
/// Empty means identity.
pub fn detect_encodings(headers: &HeaderMap) -> Vec<ContentEncoding> {
    let Some(raw) = headers
        .get(header::CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
    else {
        return Vec::new();
    };

    raw.split(',')
        .filter_map(|token| match token.trim().to_ascii_lowercase().as_str() {
            "br" => Some(ContentEncoding::Br),
            "gzip" | "x-gzip" => Some(ContentEncoding::Gzip),
            "zstd" | "zst" => Some(ContentEncoding::Zstd),
            _ => None,
        })
        .collect()
}

pub fn add_accept_encoding(headers: &mut HeaderMap) {
    if !headers.contains_key(header::ACCEPT_ENCODING) {
        headers.insert(
            header::ACCEPT_ENCODING,
            header::HeaderValue::from_static("br, zstd, gzip"),
        );
    }
}

pub fn add_content_encoding(headers: &mut HeaderMap, encoding: ContentEncoding) {
    if encoding != ContentEncoding::Identity {
        headers.insert(
            header::CONTENT_ENCODING,
            header::HeaderValue::from_static(encoding.as_str()),
        );
    }
}

type BoxedRead = Box<dyn AsyncBufRead + Unpin + Send>;

fn wrap_decoders(reader: BoxedRead, encodings: &[ContentEncoding]) -> BoxedRead {
    encodings.iter().rev().fold(reader, |current, encoding| match encoding {
        ContentEncoding::Identity => current,
        ContentEncoding::Br => Box::new(BufReader::new(BrotliDecoder::new(current))),
        ContentEncoding::Gzip => Box::new(BufReader::new(GzipDecoder::new(current))),
        ContentEncoding::Zstd => Box::new(BufReader::new(ZstdDecoder::new(current))),
    })
}

async fn read_all(mut reader: BoxedRead) -> io::Result<Bytes> {
    let mut out = Vec::with_capacity(32 * 1024);
    reader.read_to_end(&mut out).await?;
    Ok(Bytes::from(out))
}

/// Aggregate a response body, undoing every listed encoding.
pub async fn decompress_body(body: Incoming, encodings: &[ContentEncoding]) -> io::Result<Bytes> {
    let stream = BodyStream::new(body)
        .map_ok(|frame| frame.into_data().unwrap_or_default())
        .map_err(io::Error::other);
    let reader: BoxedRead = Box::new(BufReader::new(StreamReader::new(stream)));
    read_all(wrap_decoders(reader, encodings)).await
}

/// Decode an already aggregated body.
pub async fn decompress_bytes(data: Bytes, encodings: &[ContentEncoding]) -> io::Result<Bytes> {
    if encodings.is_empty() {
        return Ok(data);
    }
    let reader: BoxedRead = Box::new(BufReader::new(Cursor::new(data)));
    read_all(wrap_decoders(reader, encodings)).await
}

pub async fn compress_payload(data: Bytes, encoding: ContentEncoding) -> io::Result<Bytes> {
    let source = BufReader::new(Cursor::new(data.clone()));
    let encoder: BoxedRead = match encoding {
        ContentEncoding::Identity => return Ok(data),
        ContentEncoding::Br => Box::new(BufReader::new(BrotliEncoder::new(source))),
        ContentEncoding::Gzip => Box::new(BufReader::new(GzipEncoder::new(source))),
        ContentEncoding::Zstd => Box::new(BufReader::new(ZstdEncoder::new(source))),
    };
    read_all(encoder).await
}
