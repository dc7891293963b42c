//! Elapsed-time heuristic deciding whether to refresh before sending a call.

use std::time::{Duration, SystemTime};

/// Age after which the session is treated as about to expire.
pub const REFRESH_THRESHOLD: Duration = Duration::from_secs(4 * 60);

/// `true` iff a refresh was recorded and more than [`REFRESH_THRESHOLD`] has
/// passed since. No recorded refresh means the caller just authenticated.
pub fn is_expiring_soon(last_refresh: Option<SystemTime>, now: SystemTime) -> bool {
    let Some(last) = last_refresh else {
        return false;
    };
    match now.duration_since(last) {
        Ok(elapsed) => elapsed > REFRESH_THRESHOLD,
        // recorded in the future (clock moved back)
        Err(_) => false,
    }
}
