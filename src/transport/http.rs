use crate::config::ClientConfig;
use crate::types::{FormValue, RequestBody, RequestConfig, Response};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use super::{Transport, TransportError};

/// Correlation id sent with every attempt.
const REQUEST_ID_HEADER: &str = "x-request-id";

/// `reqwest`-backed transport.
///
/// Session credentials travel as cookies, so the client keeps a cookie store
/// shared by every request made through this transport.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .pool_idle_timeout(Some(std::time::Duration::from_secs(90)))
            .build()
            .map_err(|e| {
                Error::configuration_with_context(
                    format!("failed to build HTTP client: {e}"),
                    ErrorContext::new().with_source("http_transport"),
                )
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URLs are used as-is; anything else is appended to the base URL.
    fn resolve(&self, url: &str) -> std::result::Result<Url, TransportError> {
        let full = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.base_url, url.trim_start_matches('/'))
        };
        Url::parse(&full).map_err(|e| TransportError::InvalidRequest(format!("{full}: {e}")))
    }

    fn multipart(parts: &[crate::types::FormPart]) -> std::result::Result<Form, TransportError> {
        let mut form = Form::new();
        for p in parts {
            form = match &p.value {
                FormValue::Text(v) => form.text(p.name.clone(), v.clone()),
                FormValue::File {
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let mut part = Part::bytes(bytes.to_vec()).file_name(file_name.clone());
                    if let Some(ct) = content_type {
                        part = part.mime_str(ct)?;
                    }
                    form.part(p.name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RequestConfig) -> std::result::Result<Response, TransportError> {
        if let Some(e) = request.build_error() {
            return Err(TransportError::InvalidRequest(e.to_string()));
        }
        let url = self.resolve(&request.url)?;
        let request_id = Uuid::new_v4().to_string();

        let mut req = self
            .client
            .request(request.method.clone(), url)
            .headers(request.headers.clone())
            .header(REQUEST_ID_HEADER, request_id.as_str());

        if !request.query.is_empty() {
            req = req.query(&request.query);
        }

        req = match &request.body {
            RequestBody::Empty => req,
            RequestBody::Json(v) => req.json(v),
            RequestBody::Text(t) => req.body(t.clone()),
            RequestBody::Form(parts) => req.multipart(Self::multipart(parts)?),
        };

        let resp = req.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        debug!(
            http_status = status.as_u16(),
            request_id = request_id.as_str(),
            url = request.url.as_str(),
            "response received"
        );

        if status.is_success() {
            let body = resp.bytes().await?;
            return Ok(Response {
                status: status.as_u16(),
                headers,
                body,
            });
        }

        // The status already arrived; a body read failure leaves it empty rather
        // than turning this into a connectivity failure.
        let body = resp.bytes().await.unwrap_or_default();
        Err(TransportError::Status {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}
