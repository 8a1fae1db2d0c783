use bytes::Bytes;
use groupware_dav_rs::common::{
    ContentEncoding, add_accept_encoding, add_content_encoding, compress_payload,
    decompress_bytes, detect_encodings,
};
use hyper::HeaderMap;
use hyper::header::{ACCEPT_ENCODING, CONTENT_ENCODING, HeaderValue};

const BODY: &[u8] = br#"<?xml version="1.0"?><D:multistatus xmlns:D="DAV:"><D:response><D:href>/a</D:href></D:response></D:multistatus>"#;

#[tokio::test]
async fn test_each_encoding_decodes_back() {
    for encoding in [ContentEncoding::Br, ContentEncoding::Gzip, ContentEncoding::Zstd] {
        let packed = compress_payload(Bytes::from_static(BODY), encoding)
            .await
            .unwrap();
        let unpacked = decompress_bytes(packed, &[encoding]).await.unwrap();
        assert_eq!(unpacked, Bytes::from_static(BODY), "{encoding:?}");
    }
}

#[tokio::test]
async fn test_chained_encodings_are_undone_in_reverse() {
    let gz = compress_payload(Bytes::from_static(BODY), ContentEncoding::Gzip)
        .await
        .unwrap();
    let gz_br = compress_payload(gz, ContentEncoding::Br).await.unwrap();

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip, br"));
    let chain = detect_encodings(&headers);
    assert_eq!(chain, [ContentEncoding::Gzip, ContentEncoding::Br]);

    let unpacked = decompress_bytes(gz_br, &chain).await.unwrap();
    assert_eq!(unpacked, Bytes::from_static(BODY));
}

#[tokio::test]
async fn test_identity_is_passthrough() {
    let data = Bytes::from_static(BODY);
    assert_eq!(
        compress_payload(data.clone(), ContentEncoding::Identity)
            .await
            .unwrap(),
        data
    );
    assert_eq!(decompress_bytes(data.clone(), &[]).await.unwrap(), data);
}

#[test]
fn test_detect_ignores_unknown_and_aliases() {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_ENCODING, HeaderValue::from_static("X-GZIP, compress, zst"));
    assert_eq!(
        detect_encodings(&headers),
        [ContentEncoding::Gzip, ContentEncoding::Zstd]
    );
    assert!(detect_encodings(&HeaderMap::new()).is_empty());
}

#[test]
fn test_header_helpers() {
    let mut headers = HeaderMap::new();
    add_accept_encoding(&mut headers);
    assert_eq!(headers.get(ACCEPT_ENCODING).unwrap(), "br, zstd, gzip");

    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
    add_accept_encoding(&mut headers);
    assert_eq!(headers.get(ACCEPT_ENCODING).unwrap(), "gzip");

    add_content_encoding(&mut headers, ContentEncoding::Identity);
    assert!(headers.get(CONTENT_ENCODING).is_none());
    add_content_encoding(&mut headers, ContentEncoding::Zstd);
    assert_eq!(headers.get(CONTENT_ENCODING).unwrap(), "zstd");
}
