//! # tesoros-client
//!
//! REST client for the Tesoros de la India storefront backend.
//!
//! ## Overview
//!
//! Two clients share one request surface ([`ApiClient`]):
//!
//! - [`PublicClient`] for endpoints that need no session. Only connectivity
//!   failures are normalized.
//! - [`AuthClient`] for everything behind the login. It keeps the session
//!   alive, refreshing it before a call when it is getting old and after a call
//!   comes back 401. Concurrent 401s share a single refresh; the other calls
//!   wait for it and then replay.
//!
//! Failures the UI has to show are returned as a [`NormalizedError`] with a
//! message, a form-field hint and an optional redirect.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tesoros_client::{ApiClient, AuthClientBuilder};
//!
//! #[tokio::main]
//! async fn main() -> tesoros_client::Result<()> {
//!     let client = AuthClientBuilder::from_env()?
//!         .session_file("/tmp/tesoros-session.json")
//!         .build()?;
//!
//!     match client.get("/carrito").await {
//!         Ok(resp) => println!("{}", resp.text()),
//!         Err(e) => match e.normalized() {
//!             Some(n) => println!("{} -> {:?}", n.message(), n.redirect_to()),
//!             None => return Err(e),
//!         },
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Authenticated and public clients, builder |
//! | [`session`] | Freshness check, refresh state, timestamp storage, refresher |
//! | [`transport`] | Network seam and the `reqwest` implementation |
//! | [`types`] | Request and response data |
//! | [`config`] | Env-overridable configuration |

pub mod client;
pub mod config;
pub mod session;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{ApiClient, AuthClient, AuthClientBuilder, PublicClient};
pub use config::ClientConfig;
pub use types::{FormPart, RequestBody, RequestConfig, Response};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, ErrorKind, FieldHint, NormalizedError};
