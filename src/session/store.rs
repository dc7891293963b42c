//! Durable storage for the last successful refresh time.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Where the last refresh timestamp lives.
///
/// Written by the refresher after every successful refresh and read by the
/// freshness check. Nothing in this crate clears it.
pub trait TimestampStore: Send + Sync {
    fn load(&self) -> Option<SystemTime>;
    fn save(&self, at: SystemTime) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    #[serde(rename = "lastTokenRefresh")]
    last_token_refresh: u64,
}

fn to_millis(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn from_millis(ms: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_millis(ms)
}

/// JSON file holding `{"lastTokenRefresh": <unix millis>}`.
#[derive(Debug, Clone)]
pub struct FileTimestampStore {
    path: PathBuf,
}

impl FileTimestampStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TimestampStore for FileTimestampStore {
    fn load(&self) -> Option<SystemTime> {
        let raw = std::fs::read(&self.path).ok()?;
        match serde_json::from_slice::<StoredSession>(&raw) {
            Ok(s) => Some(from_millis(s.last_token_refresh)),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "ignoring unreadable session file");
                None
            }
        }
    }

    fn save(&self, at: SystemTime) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let body = serde_json::to_vec(&StoredSession {
            last_token_refresh: to_millis(at),
        })?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }
}

/// Process-local store; the timestamp is lost on exit.
#[derive(Debug, Default)]
pub struct MemoryTimestampStore {
    last: Mutex<Option<SystemTime>>,
}

impl MemoryTimestampStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timestamp(at: SystemTime) -> Self {
        Self {
            last: Mutex::new(Some(at)),
        }
    }
}

impl TimestampStore for MemoryTimestampStore {
    fn load(&self) -> Option<SystemTime> {
        *self.last.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn save(&self, at: SystemTime) -> Result<()> {
        *self.last.lock().unwrap_or_else(|e| e.into_inner()) = Some(at);
        Ok(())
    }
}
