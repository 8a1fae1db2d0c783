use bytes::Bytes;
use http_body_util::Full;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use tracing::debug;

/// Pooled hyper client shared by every request of one transport.
pub type HyperClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, Full<Bytes>>;

/// HTTP/1.1 + HTTP/2 client over rustls, plain `http://` allowed.
///
/// Native roots are preferred; the bundled WebPKI store is used when the
/// platform store cannot be loaded.
pub fn build_hyper_client() -> HyperClient {
    let https_builder = HttpsConnectorBuilder::new()
        .with_native_roots()
        .unwrap_or_else(|err| {
            debug!(error = %err, "native roots unavailable, using webpki roots");
            HttpsConnectorBuilder::new().with_webpki_roots()
        });

    let https = https_builder
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build();

    Client::builder(TokioExecutor::new())
        .http2_adaptive_window(true)
        .pool_max_idle_per_host(32)
        .build::<_, Full<Bytes>>(https)
}
