//! Session renewal against the backend.

use crate::transport::Transport;
use crate::types::RequestConfig;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{info, warn};

use super::store::TimestampStore;

/// Obtains a renewed session credential.
///
/// Implementations record the refresh time in durable storage on success.
#[async_trait]
pub trait SessionRefresher: Send + Sync {
    async fn refresh(&self) -> Result<()>;
}

/// POSTs the refresh endpoint; the backend rotates the session cookies.
pub struct HttpSessionRefresher {
    transport: Arc<dyn Transport>,
    store: Arc<dyn TimestampStore>,
    endpoint: String,
}

impl HttpSessionRefresher {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn TimestampStore>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            store,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SessionRefresher for HttpSessionRefresher {
    async fn refresh(&self) -> Result<()> {
        let start = std::time::Instant::now();
        let request = RequestConfig::post(self.endpoint.as_str());
        match self.transport.send(&request).await {
            Ok(_) => {
                // the cookies are already renewed; a lost timestamp only means an
                // earlier proactive refresh next time
                if let Err(e) = self.store.save(SystemTime::now()) {
                    warn!(error = %e, "failed to record refresh timestamp");
                }
                info!(
                    duration_ms = start.elapsed().as_millis() as u64,
                    "session refreshed"
                );
                Ok(())
            }
            Err(e) => {
                info!(
                    http_status = e.status(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    error = %e,
                    "session refresh failed"
                );
                Err(e.into())
            }
        }
    }
}
