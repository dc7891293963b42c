use crate::client::core::AuthClient;
use crate::client::public::PublicClient;
use crate::config::ClientConfig;
use crate::session::{
    FileTimestampStore, HttpSessionRefresher, MemoryTimestampStore, SessionRefresher,
    SessionState, TimestampStore,
};
use crate::transport::{HttpTransport, Transport};
use crate::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Builder for creating clients with custom configuration.
///
/// Every collaborator has a default derived from [`ClientConfig`]; the setters
/// exist mainly to swap in test doubles.
pub struct AuthClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    refresher: Option<Arc<dyn SessionRefresher>>,
    store: Option<Arc<dyn TimestampStore>>,
}

impl AuthClientBuilder {
    pub fn new() -> Self {
        Self::from_config(ClientConfig::default())
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            refresher: None,
            store: None,
        }
    }

    /// Start from `TESOROS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_config(ClientConfig::from_env()?))
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Persist the last refresh time in this file.
    pub fn session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.session_file = Some(path.into());
        self
    }

    /// Redirect target attached to session-expired errors.
    pub fn login_redirect(mut self, path: impl Into<String>) -> Self {
        self.config.login_redirect = path.into();
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn refresher(mut self, refresher: Arc<dyn SessionRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    pub fn timestamp_store(mut self, store: Arc<dyn TimestampStore>) -> Self {
        self.store = Some(store);
        self
    }

    fn resolve_transport(&self) -> Result<Arc<dyn Transport>> {
        match &self.transport {
            Some(t) => Ok(t.clone()),
            None => Ok(Arc::new(HttpTransport::new(&self.config)?)),
        }
    }

    /// Build the authenticated client.
    pub fn build(self) -> Result<AuthClient> {
        self.config.validate()?;
        let transport = self.resolve_transport()?;

        let store: Arc<dyn TimestampStore> = match (self.store, &self.config.session_file) {
            (Some(s), _) => s,
            (None, Some(path)) => Arc::new(FileTimestampStore::new(path.clone())),
            (None, None) => Arc::new(MemoryTimestampStore::new()),
        };

        let refresher: Arc<dyn SessionRefresher> = match self.refresher {
            Some(r) => r,
            None => Arc::new(HttpSessionRefresher::new(
                transport.clone(),
                store.clone(),
                self.config.refresh_endpoint.clone(),
            )),
        };

        Ok(AuthClient {
            transport,
            refresher,
            store,
            session: Arc::new(SessionState::new()),
            login_endpoint: self.config.login_endpoint,
            refresh_endpoint: self.config.refresh_endpoint,
            login_redirect: self.config.login_redirect,
        })
    }

    /// Build a public client with the same transport settings.
    ///
    /// Use [`AuthClient::public`] instead when both clients must share cookies.
    pub fn build_public(self) -> Result<PublicClient> {
        self.config.validate()?;
        Ok(PublicClient::new(self.resolve_transport()?))
    }
}

impl Default for AuthClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
