//! Request clients.
//!
//! Keep the public surface small: two clients sharing one trait.
//! Implementation details are split into submodules under `src/client/`.

mod api;
pub mod builder;
pub mod core;
mod error_classification;
mod preflight;
pub mod public;

pub use api::ApiClient;
pub use builder::AuthClientBuilder;
pub use core::AuthClient;
pub use public::PublicClient;
