//! Description of one outbound HTTP call.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;

/// Payload of a request.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Text(String),
    /// Multipart form. The transport owns the `content-type` header (it carries
    /// the boundary), so any explicit one is dropped before sending.
    Form(Vec<FormPart>),
}

impl RequestBody {
    pub fn is_form(&self) -> bool {
        matches!(self, RequestBody::Form(_))
    }
}

/// One field of a multipart form.
#[derive(Debug, Clone)]
pub struct FormPart {
    pub name: String,
    pub value: FormValue,
}

#[derive(Debug, Clone)]
pub enum FormValue {
    Text(String),
    File {
        file_name: String,
        content_type: Option<String>,
        bytes: Bytes,
    },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }

    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Option<&str>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            value: FormValue::File {
                file_name: file_name.into(),
                content_type: content_type.map(str::to_string),
                bytes: bytes.into(),
            },
        }
    }
}

/// One logical HTTP call.
///
/// `url` is either a path relative to the client's base URL or an absolute URL.
/// Header names are case-insensitive and setting a header replaces any previous
/// value for that name.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Set once this exact call has been replayed after a refresh.
    pub is_retry: bool,
    /// First header or body that failed to build; reported by the transport at send time.
    pub(crate) deferred_error: Option<String>,
}

impl RequestConfig {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: RequestBody::Empty,
            is_retry: false,
            deferred_error: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Set a header, replacing any previous value with the same (case-insensitive) name.
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        V: TryInto<HeaderValue>,
    {
        match (key.try_into(), value.try_into()) {
            (Ok(k), Ok(v)) => {
                self.headers.insert(k, v);
            }
            _ => {
                if self.deferred_error.is_none() {
                    self.deferred_error = Some("invalid header name or value".to_string());
                }
            }
        }
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// JSON body. Serialization failures surface when the request is sent.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(v) => self.body = RequestBody::Json(v),
            Err(e) => self.deferred_error = Some(format!("body serialization failed: {e}")),
        }
        self
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = RequestBody::Text(body.into());
        self
    }

    pub fn form(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Form(parts);
        self
    }

    /// Whether `url` targets the given endpoint (substring match on the path).
    pub fn targets(&self, endpoint: &str) -> bool {
        !endpoint.is_empty() && self.url.contains(endpoint)
    }

    /// Drop an explicit `content-type` for form bodies.
    pub(crate) fn strip_form_content_type(&mut self) {
        if self.body.is_form() {
            self.headers.remove(CONTENT_TYPE);
        }
    }

    pub(crate) fn build_error(&self) -> Option<&str> {
        self.deferred_error.as_deref()
    }
}
