//! In-memory transport and refresher with controllable timing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tesoros_client::session::{MemoryTimestampStore, SessionRefresher};
use tesoros_client::transport::{Transport, TransportError};
use tesoros_client::{AuthClient, AuthClientBuilder, RequestConfig, Response};
use tokio::sync::Semaphore;

/// Answers 401 until authorized, 200 afterwards.
///
/// URLs containing `/sin-conexion` never get a response; `route` overrides the
/// answer for a URL substring.
#[derive(Default)]
pub struct ScriptedTransport {
    authorized: AtomicBool,
    routes: Mutex<HashMap<String, (u16, String)>>,
    log: Mutex<Vec<RequestConfig>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn authorize(&self) {
        self.authorized.store(true, Ordering::SeqCst);
    }

    pub fn route(&self, fragment: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(fragment.to_string(), (status, body.to_string()));
    }

    pub fn sent(&self) -> Vec<RequestConfig> {
        self.log.lock().unwrap().clone()
    }

    pub fn sent_to(&self, fragment: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.contains(fragment))
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &RequestConfig) -> Result<Response, TransportError> {
        self.log.lock().unwrap().push(request.clone());
        tokio::task::yield_now().await;

        if request.url.contains("/sin-conexion") {
            return Err(TransportError::NoResponse("connection refused".into()));
        }

        let routed = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .find(|(fragment, _)| request.url.contains(fragment.as_str()))
            .map(|(_, answer)| answer.clone());
        let (status, body) = match routed {
            Some(answer) => answer,
            None if self.authorized.load(Ordering::SeqCst) => (200, r#"{"ok":true}"#.to_string()),
            None => (401, r#"{"message":"Token expirado"}"#.to_string()),
        };

        if (200..300).contains(&status) {
            Ok(Response::new(status, body))
        } else {
            Err(TransportError::status_with_body(status, body))
        }
    }
}

/// Counts refreshes; optionally blocks each one until the test opens the gate.
pub struct FakeRefresher {
    pub calls: AtomicUsize,
    succeed: AtomicBool,
    gate: Option<Arc<Semaphore>>,
    transport: Arc<ScriptedTransport>,
}

impl FakeRefresher {
    pub fn new(transport: Arc<ScriptedTransport>, succeed: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            succeed: AtomicBool::new(succeed),
            gate: None,
            transport,
        })
    }

    pub fn gated(transport: Arc<ScriptedTransport>, succeed: bool) -> (Arc<Self>, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let refresher = Arc::new(Self {
            calls: AtomicUsize::new(0),
            succeed: AtomicBool::new(succeed),
            gate: Some(gate.clone()),
            transport,
        });
        (refresher, gate)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionRefresher for FakeRefresher {
    async fn refresh(&self) -> tesoros_client::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.succeed.load(Ordering::SeqCst) {
            self.transport.authorize();
            Ok(())
        } else {
            Err(TransportError::status_with_body(401, r#"{"message":"Refresh token inválido"}"#).into())
        }
    }
}

pub fn client(
    transport: Arc<ScriptedTransport>,
    refresher: Arc<FakeRefresher>,
    store: Arc<MemoryTimestampStore>,
) -> AuthClient {
    AuthClientBuilder::new()
        .transport(transport)
        .refresher(refresher)
        .timestamp_store(store)
        .build()
        .expect("client")
}

/// Poll `cond` until it holds, yielding to spawned tasks in between.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..1_000 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("condition not reached in time");
}
