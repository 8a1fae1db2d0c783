//! Per-user client memoization.
//!
//! A [`ClientCache`] belongs to one session or request context. It is a plain
//! map, not a synchronization primitive: callers sharing it across tasks wrap
//! it in their own lock.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use tracing::debug;

use crate::client::DavClient;
use crate::config::{ClientConfig, Credential};
use crate::error::{DavError, Result};
use crate::webdav::transport::DavTransport;

type TransportFactory =
    Box<dyn Fn(&ClientConfig) -> Result<Arc<dyn DavTransport>> + Send + Sync>;

pub struct ClientCache {
    settings: ClientConfig,
    factory: Option<TransportFactory>,
    clients: HashMap<String, DavClient>,
}

impl ClientCache {
    /// Clients built from `settings` with the user and secret of each
    /// credential substituted in.
    pub fn new(settings: ClientConfig) -> Self {
        Self {
            settings,
            factory: None,
            clients: HashMap::new(),
        }
    }

    /// Use `factory` instead of the default hyper transport.
    pub fn with_transport_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&ClientConfig) -> Result<Arc<dyn DavTransport>> + Send + Sync + 'static,
    {
        self.factory = Some(Box::new(factory));
        self
    }

    /// The client of `credential.user_name`, created on first use.
    ///
    /// The credential must target the cache's server. A cached client whose
    /// secret differs from `credential` is replaced by a new, unconnected one.
    pub fn client(&mut self, credential: &Credential) -> Result<&mut DavClient> {
        if credential.base_url != self.settings.base_url {
            return Err(DavError::Config(format!(
                "credential for {} used with cache for {}",
                credential.base_url, self.settings.base_url
            )));
        }
        let Self {
            settings,
            factory,
            clients,
        } = self;
        match clients.entry(credential.user_name.clone()) {
            Entry::Occupied(mut entry) => {
                if entry.get().credential().secret() != credential.secret() {
                    debug!(user = %credential.user_name, "secret changed, rebuilding client");
                    entry.insert(build_client(settings, factory.as_ref(), credential)?);
                }
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let client = build_client(settings, factory.as_ref(), credential)?;
                Ok(entry.insert(client))
            }
        }
    }

    /// Like [`Self::client`], connecting the client if needed.
    pub async fn connected_client(&mut self, credential: &Credential) -> Result<&mut DavClient> {
        let client = self.client(credential)?;
        client.connect().await?;
        Ok(client)
    }

    pub fn get(&self, user_name: &str) -> Option<&DavClient> {
        self.clients.get(user_name)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

fn build_client(
    settings: &ClientConfig,
    factory: Option<&TransportFactory>,
    credential: &Credential,
) -> Result<DavClient> {
    let mut config = settings.clone();
    config.user_name = credential.user_name.clone();
    config.secret = credential.secret().to_string();
    match factory {
        Some(factory) => {
            let transport = factory(&config)?;
            DavClient::with_transport(config, transport)
        }
        None => DavClient::new(config),
    }
}
