use crate::transport::TransportError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Message shown when no HTTP response reached the client.
pub const CONNECTIVITY_MESSAGE: &str =
    "No se pudo conectar con el servidor. Verifica tu conexión a internet.";

/// Message shown when the login endpoint rejects the submitted credentials.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "El correo o la contraseña son incorrectos";

/// Message shown when the session could not be renewed.
pub const SESSION_EXPIRED_MESSAGE: &str =
    "Tu sesión ha expirado. Por favor, inicia sesión nuevamente.";

/// Structured error context for configuration and storage failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Configuration key or file that caused the error (e.g., "TESOROS_API_URL")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., the rejected value)
    pub details: Option<String>,
    /// Source of the error (e.g., "client_config", "timestamp_store")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Which class of failure a [`NormalizedError`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No HTTP response reached the client.
    Connectivity,
    /// 401 from the login endpoint.
    InvalidCredentials,
    /// 401 after an exhausted or failed refresh.
    SessionExpired,
    /// The backend described the failure in a structured payload.
    BackendValidation,
}

/// Form field a UI should attach an error message to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldHint {
    Email,
    Password,
    #[default]
    General,
    Authentication,
}

impl FieldHint {
    /// Parse a backend `type` value. Anything outside the known set is `General`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "email" => FieldHint::Email,
            "password" => FieldHint::Password,
            "authentication" => FieldHint::Authentication,
            _ => FieldHint::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldHint::Email => "email",
            FieldHint::Password => "password",
            FieldHint::General => "general",
            FieldHint::Authentication => "authentication",
        }
    }
}

impl fmt::Display for FieldHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single error shape consumed by the UI layer.
///
/// Built once per failed call and never mutated afterwards, so the fields are
/// private and only exposed through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{message}")]
pub struct NormalizedError {
    kind: ErrorKind,
    message: String,
    #[serde(rename = "type")]
    field: FieldHint,
    #[serde(rename = "redirectTo", skip_serializing_if = "Option::is_none")]
    redirect_to: Option<String>,
}

impl NormalizedError {
    pub fn connectivity() -> Self {
        Self {
            kind: ErrorKind::Connectivity,
            message: CONNECTIVITY_MESSAGE.to_string(),
            field: FieldHint::General,
            redirect_to: None,
        }
    }

    pub fn invalid_credentials() -> Self {
        Self {
            kind: ErrorKind::InvalidCredentials,
            message: INVALID_CREDENTIALS_MESSAGE.to_string(),
            field: FieldHint::General,
            redirect_to: None,
        }
    }

    pub fn session_expired(login_redirect: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::SessionExpired,
            message: SESSION_EXPIRED_MESSAGE.to_string(),
            field: FieldHint::Authentication,
            redirect_to: Some(login_redirect.into()),
        }
    }

    pub fn backend(
        message: impl Into<String>,
        field: FieldHint,
        redirect_to: Option<String>,
    ) -> Self {
        Self {
            kind: ErrorKind::BackendValidation,
            message: message.into(),
            field,
            redirect_to,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn field(&self) -> FieldHint {
        self.field
    }

    pub fn redirect_to(&self) -> Option<&str> {
        self.redirect_to.as_deref()
    }
}

/// Unified error type for the client.
#[derive(Debug, Error)]
pub enum Error {
    /// A failure already translated into the UI-facing shape.
    #[error(transparent)]
    Normalized(#[from] NormalizedError),

    /// Transport failure surfaced unchanged (no usable structured body).
    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// The normalized error, if this failure was normalized.
    pub fn normalized(&self) -> Option<&NormalizedError> {
        match self {
            Error::Normalized(n) => Some(n),
            _ => None,
        }
    }

    /// Shorthand for `normalized().map(|n| n.kind())`.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.normalized().map(NormalizedError::kind)
    }

    /// HTTP status of a passthrough transport failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Transport(t) => t.status(),
            _ => None,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }
}
