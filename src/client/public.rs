use crate::error::NormalizedError;
use crate::transport::{Transport, TransportError};
use crate::types::{RequestConfig, Response};
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::api::ApiClient;

/// Client for endpoints that need no session (catalogue, login, sign-up).
///
/// Only connectivity failures are normalized; every other failure is returned
/// as the raw transport error.
#[derive(Clone)]
pub struct PublicClient {
    transport: Arc<dyn Transport>,
}

impl PublicClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl ApiClient for PublicClient {
    async fn request(&self, config: RequestConfig) -> Result<Response> {
        match self.transport.send(&config).await {
            Ok(resp) => Ok(resp),
            Err(TransportError::NoResponse(reason)) => {
                info!(url = config.url.as_str(), reason = reason.as_str(), "no response from server");
                Err(NormalizedError::connectivity().into())
            }
            Err(e) => Err(e.into()),
        }
    }
}
