//! Client configuration.

use std::fmt;
use std::time::Duration;

use crate::common::ContentEncoding;

/// Connection settings for one DAV account. `Debug` never prints the secret.
#[derive(Clone, serde::Deserialize)]
pub struct ClientConfig {
    /// Server URL including the DAV root, e.g. `https://dav.example.com/dav`.
    pub base_url: String,
    pub user_name: String,
    pub secret: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Relative prefix of principal hrefs (`principals/<user>`).
    #[serde(default = "default_principals_prefix")]
    pub principals_prefix: String,
    /// Encoding applied to outgoing request bodies.
    #[serde(default)]
    pub request_compression: ContentEncoding,
    /// `Server` header of the bundled DAV server. Any other value reported
    /// by the capability probe marks the server as custom.
    #[serde(default)]
    pub bundled_server: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

const fn default_timeout() -> u64 {
    3600
}

fn default_principals_prefix() -> String {
    "principals/".to_string()
}

fn default_user_agent() -> String {
    concat!("groupware-dav-rs/", env!("CARGO_PKG_VERSION")).to_string()
}

impl ClientConfig {
    pub fn new(
        base_url: impl Into<String>,
        user_name: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            user_name: user_name.into(),
            secret: secret.into(),
            timeout_secs: default_timeout(),
            principals_prefix: default_principals_prefix(),
            request_compression: ContentEncoding::default(),
            bundled_server: None,
            user_agent: default_user_agent(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn credential(&self) -> Credential {
        Credential {
            base_url: self.base_url.clone(),
            user_name: self.user_name.clone(),
            secret: self.secret.clone(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("user_name", &self.user_name)
            .field("secret", &"***")
            .field("timeout_secs", &self.timeout_secs)
            .field("principals_prefix", &self.principals_prefix)
            .field("request_compression", &self.request_compression)
            .field("bundled_server", &self.bundled_server)
            .finish_non_exhaustive()
    }
}

/// Account credential. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub base_url: String,
    pub user_name: String,
    secret: String,
}

impl Credential {
    pub fn new(
        base_url: impl Into<String>,
        user_name: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            user_name: user_name.into(),
            secret: secret.into(),
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("base_url", &self.base_url)
            .field("user_name", &self.user_name)
            .field("secret", &"***")
            .finish()
    }
}
