use crate::error::NormalizedError;
use crate::session::{Admission, SessionRefresher, SessionState, TimestampStore};
use crate::transport::{Transport, TransportError};
use crate::types::{RequestConfig, Response};
use crate::{Error, Result};
use async_recursion::async_recursion;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::api::ApiClient;
use super::error_classification::normalize_payload;
use super::public::PublicClient;

/// Client for calls that need the user's session.
///
/// Cloning is cheap and clones share the same session bookkeeping, so at most
/// one refresh runs at a time across all of them.
#[derive(Clone)]
pub struct AuthClient {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) refresher: Arc<dyn SessionRefresher>,
    pub(crate) store: Arc<dyn TimestampStore>,
    pub(crate) session: Arc<SessionState>,
    pub(crate) login_endpoint: String,
    pub(crate) refresh_endpoint: String,
    pub(crate) login_redirect: String,
}

/// Settles the refresh as failed if the leader is dropped before settling.
pub(crate) struct RefreshGuard<'a> {
    session: &'a SessionState,
    settled: bool,
}

impl<'a> RefreshGuard<'a> {
    pub(crate) fn new(session: &'a SessionState) -> Self {
        Self {
            session,
            settled: false,
        }
    }

    pub(crate) fn settle(mut self, succeeded: bool) -> usize {
        self.settled = true;
        self.session.settle(succeeded)
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.session.settle(false);
        }
    }
}

impl AuthClient {
    /// Shared refresh state, for inspection.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// A public client on the same transport (and cookie jar).
    pub fn public(&self) -> PublicClient {
        PublicClient::new(self.transport.clone())
    }

    fn session_expired(&self) -> Error {
        NormalizedError::session_expired(self.login_redirect.as_str()).into()
    }

    #[async_recursion]
    async fn dispatch(&self, mut config: RequestConfig) -> Result<Response> {
        if !config.is_retry && !config.targets(&self.refresh_endpoint) {
            self.preflight(&mut config).await;
        }

        let start = Instant::now();
        match self.transport.send(&config).await {
            Ok(resp) => Ok(resp),
            Err(err) => {
                info!(
                    http_status = err.status(),
                    url = config.url.as_str(),
                    is_retry = config.is_retry,
                    duration_ms = start.elapsed().as_millis() as u64,
                    error = %err,
                    "request failed"
                );
                self.recover(config, err).await
            }
        }
    }

    /// Post-flight handling of a failed call.
    async fn recover(&self, config: RequestConfig, err: TransportError) -> Result<Response> {
        let Some(status) = err.status() else {
            return match err {
                TransportError::NoResponse(_) => Err(NormalizedError::connectivity().into()),
                other => Err(other.into()),
            };
        };

        if status == 401 && config.targets(&self.login_endpoint) {
            return Err(NormalizedError::invalid_credentials().into());
        }

        if status == 401 && !config.targets(&self.refresh_endpoint) {
            return self.reauthenticate(config).await;
        }

        let normalized = err.body().and_then(|b| normalize_payload(b));
        match normalized {
            Some(normalized) => Err(normalized.into()),
            None => Err(err.into()),
        }
    }

    /// Reactive refresh for a 401 outside the auth endpoints.
    async fn reauthenticate(&self, mut config: RequestConfig) -> Result<Response> {
        if config.is_retry {
            self.session.abandon();
            info!(url = config.url.as_str(), "replayed request rejected; session expired");
            return Err(self.session_expired());
        }

        match self.session.admit() {
            Admission::Leader => {
                let guard = RefreshGuard::new(&self.session);
                config.is_retry = true;
                debug!(url = config.url.as_str(), "refreshing session after 401");
                match self.refresher.refresh().await {
                    Ok(()) => {
                        let released = guard.settle(true);
                        debug!(released, "session refreshed; replaying request");
                        self.dispatch(config).await
                    }
                    Err(e) => {
                        let dropped = guard.settle(false);
                        info!(error = %e, dropped, "session refresh failed; session expired");
                        Err(self.session_expired())
                    }
                }
            }
            Admission::Waiter(released) => {
                debug!(url = config.url.as_str(), "waiting for in-flight session refresh");
                match released.await {
                    Ok(()) => {
                        // a second 401 on the replay is terminal
                        config.is_retry = true;
                        self.dispatch(config).await
                    }
                    Err(_) => Err(self.session_expired()),
                }
            }
        }
    }
}

#[async_trait]
impl ApiClient for AuthClient {
    async fn request(&self, config: RequestConfig) -> Result<Response> {
        self.dispatch(config).await
    }
}
