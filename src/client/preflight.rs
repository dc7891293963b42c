//! Pre-flight preparation of authenticated calls.

use crate::session::{is_expiring_soon, Admission};
use crate::types::RequestConfig;
use std::time::SystemTime;
use tracing::{debug, warn};

use super::core::{AuthClient, RefreshGuard};

impl AuthClient {
    /// Prepare a call before it is sent:
    /// - form bodies lose any explicit `content-type`
    /// - an ageing session is refreshed proactively
    ///
    /// The proactive refresh goes through the same admission as the reactive one,
    /// so concurrent callers wait for a single refresh. A failed proactive refresh
    /// is logged and otherwise ignored; the call still goes out and a 401 takes the
    /// reactive path.
    pub(crate) async fn preflight(&self, config: &mut RequestConfig) {
        config.strip_form_content_type();

        if !is_expiring_soon(self.store.load(), SystemTime::now()) {
            return;
        }

        match self.session.admit() {
            Admission::Leader => {
                let guard = RefreshGuard::new(&self.session);
                debug!(url = config.url.as_str(), "session expiring soon; refreshing before request");
                match self.refresher.refresh().await {
                    Ok(()) => {
                        let released = guard.settle(true);
                        debug!(released, "proactive session refresh done");
                    }
                    Err(e) => {
                        guard.settle(false);
                        warn!(url = config.url.as_str(), error = %e, "proactive session refresh failed");
                    }
                }
            }
            Admission::Waiter(released) => {
                debug!(url = config.url.as_str(), "waiting for in-flight session refresh");
                // outcome is irrelevant here; the call goes out either way
                let _ = released.await;
            }
        }
    }
}
