//! # Types Module
//!
//! Plain data describing requests and responses. Nothing here performs I/O.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RequestConfig`] | Method, URL, headers, body and retry marker of one call |
//! | [`RequestBody`] | JSON, text, multipart form, or empty payload |
//! | [`FormPart`] | One multipart field (text or file) |
//! | [`Response`] | 2xx response with its body read into memory |

pub mod request;
pub mod response;

pub use request::{FormPart, FormValue, RequestBody, RequestConfig};
pub use response::Response;
