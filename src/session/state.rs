//! Shared refresh bookkeeping for one client.

use std::sync::{Mutex, MutexGuard};
use tokio::sync::oneshot;

#[derive(Debug, Default)]
struct Inner {
    refresh_in_flight: bool,
    pending_waiters: Vec<oneshot::Sender<()>>,
}

/// Outcome of asking to refresh.
#[derive(Debug)]
pub enum Admission {
    /// The caller owns the refresh and must call [`SessionState::settle`].
    Leader,
    /// A refresh is already running. The receiver resolves with `Ok(())` when it
    /// succeeds and with an error when it fails (the sender is dropped).
    Waiter(oneshot::Receiver<()>),
}

/// Refresh flag plus the FIFO of calls waiting on it.
///
/// Invariant: waiters are only queued while the flag is set, and every
/// transition of the flag back to `false` empties the queue.
#[derive(Debug, Default)]
pub struct SessionState {
    inner: Mutex<Inner>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Claim the refresh, or queue behind the one already running.
    pub fn admit(&self) -> Admission {
        let mut st = self.lock();
        if st.refresh_in_flight {
            let (tx, rx) = oneshot::channel();
            st.pending_waiters.push(tx);
            Admission::Waiter(rx)
        } else {
            st.refresh_in_flight = true;
            Admission::Leader
        }
    }

    /// Finish the refresh. Waiters are released in registration order on
    /// success and dropped unsignalled on failure. Returns how many were queued.
    pub fn settle(&self, succeeded: bool) -> usize {
        let waiters = {
            let mut st = self.lock();
            st.refresh_in_flight = false;
            std::mem::take(&mut st.pending_waiters)
        };
        let n = waiters.len();
        if succeeded {
            for tx in waiters {
                // receiver gone means the caller stopped waiting
                let _ = tx.send(());
            }
        }
        n
    }

    /// Reset without signalling anyone. Used when a replayed call is rejected again.
    pub fn abandon(&self) {
        let mut st = self.lock();
        st.refresh_in_flight = false;
        st.pending_waiters.clear();
    }

    pub fn is_refreshing(&self) -> bool {
        self.lock().refresh_in_flight
    }

    pub fn waiter_count(&self) -> usize {
        self.lock().pending_waiters.len()
    }
}
