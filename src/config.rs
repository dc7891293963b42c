//! Client configuration with env-overridable defaults.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `TESOROS_API_URL` | `http://localhost:3000/api` |
//! | `TESOROS_HTTP_TIMEOUT_SECS` | `30` |
//! | `TESOROS_SESSION_FILE` | unset (timestamp kept in memory) |
//! | `TESOROS_LOGIN_REDIRECT` | `/iniciar-sesion` |

use crate::{Error, ErrorContext, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
pub const LOGIN_ENDPOINT: &str = "/auth/iniciar-sesion";
pub const REFRESH_ENDPOINT: &str = "/auth/token/refrescar";
pub const LOGIN_REDIRECT: &str = "/iniciar-sesion";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Path fragment identifying the login call.
    pub login_endpoint: String,
    /// Path fragment identifying the refresh call.
    pub refresh_endpoint: String,
    /// Where the UI should send the user once the session is gone.
    pub login_redirect: String,
    /// Durable location of the last refresh timestamp.
    pub session_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            login_endpoint: LOGIN_ENDPOINT.to_string(),
            refresh_endpoint: REFRESH_ENDPOINT.to_string(),
            login_redirect: LOGIN_REDIRECT.to_string(),
            session_file: None,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `TESOROS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();

        if let Ok(url) = env::var("TESOROS_API_URL") {
            cfg.base_url = url;
        }

        if let Ok(raw) = env::var("TESOROS_HTTP_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                Error::configuration_with_context(
                    "timeout must be a whole number of seconds",
                    ErrorContext::new()
                        .with_field_path("TESOROS_HTTP_TIMEOUT_SECS")
                        .with_details(raw.clone())
                        .with_source("client_config"),
                )
            })?;
            cfg.timeout = Duration::from_secs(secs.max(1));
        }

        if let Ok(path) = env::var("TESOROS_SESSION_FILE") {
            if !path.trim().is_empty() {
                cfg.session_file = Some(PathBuf::from(path));
            }
        }

        if let Ok(redirect) = env::var("TESOROS_LOGIN_REDIRECT") {
            cfg.login_redirect = redirect;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid base url: {e}"),
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(self.base_url.clone())
                    .with_source("client_config"),
            )
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::configuration_with_context(
                "base url must use http or https",
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(self.base_url.clone())
                    .with_source("client_config"),
            ));
        }
        if self.login_endpoint.is_empty() || self.refresh_endpoint.is_empty() {
            return Err(Error::configuration_with_context(
                "login and refresh endpoints must not be empty",
                ErrorContext::new().with_source("client_config"),
            ));
        }
        Ok(())
    }
}
