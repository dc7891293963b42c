//! # Session Module
//!
//! Everything the authenticated client needs to keep a session alive.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`freshness`] | Elapsed-time check deciding on a proactive refresh |
//! | [`store`] | Durable last-refresh timestamp |
//! | [`state`] | Refresh flag and queue of waiting calls |
//! | [`refresher`] | The refresh operation itself |
//!
//! ```rust
//! use std::time::{Duration, SystemTime};
//! use tesoros_client::session::freshness::is_expiring_soon;
//!
//! let now = SystemTime::now();
//! assert!(!is_expiring_soon(None, now));
//! assert!(is_expiring_soon(Some(now - Duration::from_secs(5 * 60)), now));
//! ```

pub mod freshness;
pub mod refresher;
pub mod state;
pub mod store;

pub use freshness::{is_expiring_soon, REFRESH_THRESHOLD};
pub use refresher::{HttpSessionRefresher, SessionRefresher};
pub use state::{Admission, SessionState};
pub use store::{FileTimestampStore, MemoryTimestampStore, TimestampStore};
