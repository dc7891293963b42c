//! Network transport seam.
//!
//! The clients only talk to the network through [`Transport`], so the session
//! logic can be exercised against scripted transports in tests.

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;

use crate::types::{RequestConfig, Response};

/// Executes one HTTP attempt.
///
/// Implementations must treat every status outside 2xx as a failure and report
/// it as [`TransportError::Status`] with the response body attached.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RequestConfig) -> Result<Response, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request was sent (or attempted) but no HTTP response came back.
    #[error("no response received: {0}")]
    NoResponse(String),

    #[error("HTTP {status}")]
    Status {
        status: u16,
        headers: HeaderMap,
        body: Bytes,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&Bytes> {
        match self {
            TransportError::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Shorthand for a status failure without headers.
    pub fn status_with_body(status: u16, body: impl Into<Bytes>) -> Self {
        TransportError::Status {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            TransportError::InvalidRequest(e.to_string())
        } else {
            TransportError::NoResponse(e.to_string())
        }
    }
}
