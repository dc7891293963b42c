//! Refresh coordination of the authenticated client.

use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tesoros_client::session::{MemoryTimestampStore, TimestampStore};
use tesoros_client::{ApiClient, ErrorKind, FieldHint, FormPart, RequestConfig};

use crate::scripted::{client, wait_until, FakeRefresher, ScriptedTransport};

#[tokio::test]
async fn authorized_call_passes_through() {
    let transport = ScriptedTransport::new();
    transport.authorize();
    let refresher = FakeRefresher::new(transport.clone(), true);
    let c = client(transport.clone(), refresher.clone(), Arc::new(MemoryTimestampStore::new()));

    let resp = c.get("/experiencias").await.unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(refresher.calls(), 0);
    assert_eq!(transport.sent_to("/experiencias"), 1);
}

#[tokio::test]
async fn single_401_refreshes_and_replays_once() {
    let transport = ScriptedTransport::new();
    let refresher = FakeRefresher::new(transport.clone(), true);
    let c = client(transport.clone(), refresher.clone(), Arc::new(MemoryTimestampStore::new()));

    let resp = c.get("/carrito").await.unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(refresher.calls(), 1);

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert!(!sent[0].is_retry);
    assert!(sent[1].is_retry);
    assert!(!c.session().is_refreshing());
}

#[tokio::test]
async fn concurrent_401s_share_one_refresh() {
    const N: usize = 5;
    let transport = ScriptedTransport::new();
    let (refresher, gate) = FakeRefresher::gated(transport.clone(), true);
    let c = client(transport.clone(), refresher.clone(), Arc::new(MemoryTimestampStore::new()));

    let handles: Vec<_> = (0..N)
        .map(|i| {
            let c = c.clone();
            tokio::spawn(async move { c.get(&format!("/resenas/{i}")).await })
        })
        .collect();

    wait_until(|| refresher.calls() == 1 && c.session().waiter_count() == N - 1).await;
    assert!(c.session().is_refreshing());

    gate.add_permits(1);
    for h in futures::future::join_all(handles).await {
        assert_eq!(h.unwrap().unwrap().status, 200);
    }

    assert_eq!(refresher.calls(), 1);
    assert!(!c.session().is_refreshing());
    assert_eq!(c.session().waiter_count(), 0);
    // N rejected attempts + N replays
    assert_eq!(transport.sent().len(), 2 * N);
}

#[tokio::test]
async fn failed_refresh_expires_every_waiting_call() {
    const N: usize = 4;
    let transport = ScriptedTransport::new();
    let (refresher, gate) = FakeRefresher::gated(transport.clone(), false);
    let c = client(transport.clone(), refresher.clone(), Arc::new(MemoryTimestampStore::new()));

    let handles: Vec<_> = (0..N)
        .map(|i| {
            let c = c.clone();
            tokio::spawn(async move { c.get(&format!("/pedidos/{i}")).await })
        })
        .collect();

    wait_until(|| refresher.calls() == 1 && c.session().waiter_count() == N - 1).await;
    gate.add_permits(1);

    for h in futures::future::join_all(handles).await {
        let err = h.unwrap().unwrap_err();
        let n = err.normalized().expect("normalized");
        assert_eq!(n.kind(), ErrorKind::SessionExpired);
        assert_eq!(n.field(), FieldHint::Authentication);
        assert_eq!(n.redirect_to(), Some("/iniciar-sesion"));
    }

    assert_eq!(refresher.calls(), 1);
    assert!(!c.session().is_refreshing());
    assert_eq!(c.session().waiter_count(), 0);
    // nobody replayed
    assert_eq!(transport.sent().len(), N);
}

#[tokio::test]
async fn replay_rejected_again_never_refreshes_twice() {
    let transport = ScriptedTransport::new();
    // refresh "succeeds" but the endpoint keeps answering 401
    transport.route("/perfil", 401, r#"{"message":"Token expirado"}"#);
    let refresher = FakeRefresher::new(transport.clone(), true);
    let c = client(transport.clone(), refresher.clone(), Arc::new(MemoryTimestampStore::new()));

    let err = c.get("/perfil").await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::SessionExpired));
    assert_eq!(refresher.calls(), 1);
    assert_eq!(transport.sent_to("/perfil"), 2);
    assert!(!c.session().is_refreshing());
}

#[tokio::test]
async fn waiter_rejected_after_refresh_expires_without_second_refresh() {
    let transport = ScriptedTransport::new();
    transport.route("/perfil", 401, r#"{"message":"Token expirado"}"#);
    let (refresher, gate) = FakeRefresher::gated(transport.clone(), true);
    let c = client(transport.clone(), refresher.clone(), Arc::new(MemoryTimestampStore::new()));

    let leader = {
        let c = c.clone();
        tokio::spawn(async move { c.get("/carrito").await })
    };
    wait_until(|| refresher.calls() == 1).await;
    let waiter = {
        let c = c.clone();
        tokio::spawn(async move { c.get("/perfil").await })
    };
    wait_until(|| c.session().waiter_count() == 1).await;

    gate.add_permits(1);
    assert_eq!(leader.await.unwrap().unwrap().status, 200);
    let err = waiter.await.unwrap().unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::SessionExpired));

    assert_eq!(refresher.calls(), 1);
    // first attempt + one replay
    assert_eq!(transport.sent_to("/perfil"), 2);
    assert!(!c.session().is_refreshing());
}

#[tokio::test]
async fn call_already_marked_retry_expires_immediately() {
    let transport = ScriptedTransport::new();
    let refresher = FakeRefresher::new(transport.clone(), true);
    let c = client(transport.clone(), refresher.clone(), Arc::new(MemoryTimestampStore::new()));

    let mut config = RequestConfig::get("/perfil");
    config.is_retry = true;
    let err = c.request(config).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::SessionExpired));
    assert_eq!(refresher.calls(), 0);
}

#[tokio::test]
async fn login_401_never_refreshes() {
    let transport = ScriptedTransport::new();
    let refresher = FakeRefresher::new(transport.clone(), true);
    let c = client(transport.clone(), refresher.clone(), Arc::new(MemoryTimestampStore::new()));

    let err = c
        .post_json("/auth/iniciar-sesion", &serde_json::json!({"correo": "a@b.c", "contrasena": "x"}))
        .await
        .unwrap_err();
    let n = err.normalized().unwrap();
    assert_eq!(n.kind(), ErrorKind::InvalidCredentials);
    assert_eq!(n.message(), "El correo o la contraseña son incorrectos");
    assert_eq!(n.field(), FieldHint::General);
    assert_eq!(n.redirect_to(), None);
    assert_eq!(refresher.calls(), 0);
}

#[tokio::test]
async fn login_401_during_refresh_leaves_state_alone() {
    let transport = ScriptedTransport::new();
    transport.route("/auth/iniciar-sesion", 401, r#"{"message":"no"}"#);
    let (refresher, gate) = FakeRefresher::gated(transport.clone(), true);
    let c = client(transport.clone(), refresher.clone(), Arc::new(MemoryTimestampStore::new()));

    let pending = {
        let c = c.clone();
        tokio::spawn(async move { c.get("/carrito").await })
    };
    wait_until(|| refresher.calls() == 1).await;

    let err = c.post_json("/auth/iniciar-sesion", &serde_json::json!({})).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidCredentials));
    assert!(c.session().is_refreshing());
    assert_eq!(c.session().waiter_count(), 0);

    gate.add_permits(1);
    assert!(pending.await.unwrap().is_ok());
    assert_eq!(refresher.calls(), 1);
}

#[tokio::test]
async fn refresh_endpoint_401_is_not_refreshed() {
    let transport = ScriptedTransport::new();
    transport.route("/auth/token/refrescar", 401, "");
    let refresher = FakeRefresher::new(transport.clone(), true);
    let old = SystemTime::now() - Duration::from_secs(10 * 60);
    let c = client(
        transport.clone(),
        refresher.clone(),
        Arc::new(MemoryTimestampStore::with_timestamp(old)),
    );

    let err = c.request(RequestConfig::post("/auth/token/refrescar")).await.unwrap_err();
    assert!(err.normalized().is_none());
    assert_eq!(err.status(), Some(401));
    // neither proactive nor reactive refresh
    assert_eq!(refresher.calls(), 0);
}

#[tokio::test]
async fn ageing_session_refreshes_before_sending() {
    let transport = ScriptedTransport::new();
    let refresher = FakeRefresher::new(transport.clone(), true);
    let old = SystemTime::now() - Duration::from_secs(5 * 60);
    let c = client(
        transport.clone(),
        refresher.clone(),
        Arc::new(MemoryTimestampStore::with_timestamp(old)),
    );

    let resp = c.get("/favoritos").await.unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(refresher.calls(), 1);
    // refreshed up front, so the first attempt went through
    assert_eq!(transport.sent_to("/favoritos"), 1);
}

#[tokio::test]
async fn concurrent_ageing_calls_share_one_proactive_refresh() {
    const N: usize = 3;
    let transport = ScriptedTransport::new();
    let (refresher, gate) = FakeRefresher::gated(transport.clone(), true);
    let old = SystemTime::now() - Duration::from_secs(5 * 60);
    let c = client(
        transport.clone(),
        refresher.clone(),
        Arc::new(MemoryTimestampStore::with_timestamp(old)),
    );

    let handles: Vec<_> = (0..N)
        .map(|i| {
            let c = c.clone();
            tokio::spawn(async move { c.get(&format!("/experiencias/{i}")).await })
        })
        .collect();

    wait_until(|| refresher.calls() == 1 && c.session().waiter_count() == N - 1).await;
    // nothing is sent until the refresh settles
    assert!(transport.sent().is_empty());

    gate.add_permits(1);
    for h in futures::future::join_all(handles).await {
        assert_eq!(h.unwrap().unwrap().status, 200);
    }

    assert_eq!(refresher.calls(), 1);
    assert!(!c.session().is_refreshing());
    assert_eq!(transport.sent().len(), N);
}

#[tokio::test]
async fn failed_proactive_refresh_still_sends_call() {
    let transport = ScriptedTransport::new();
    transport.route("/catalogo", 200, "[]");
    let refresher = FakeRefresher::new(transport.clone(), false);
    let old = SystemTime::now() - Duration::from_secs(5 * 60);
    let c = client(
        transport.clone(),
        refresher.clone(),
        Arc::new(MemoryTimestampStore::with_timestamp(old)),
    );

    let resp = c.get("/catalogo").await.unwrap();
    assert_eq!(resp.text(), "[]");
    assert_eq!(refresher.calls(), 1);
    assert!(!c.session().is_refreshing());
}

#[tokio::test]
async fn recent_session_is_not_refreshed() {
    let transport = ScriptedTransport::new();
    transport.authorize();
    let refresher = FakeRefresher::new(transport.clone(), true);
    let store = Arc::new(MemoryTimestampStore::with_timestamp(SystemTime::now()));
    let c = client(transport.clone(), refresher.clone(), store.clone());

    c.get("/favoritos").await.unwrap();
    assert_eq!(refresher.calls(), 0);
    assert!(store.load().is_some());
}

#[tokio::test]
async fn form_uploads_drop_explicit_content_type() {
    let transport = ScriptedTransport::new();
    transport.authorize();
    let refresher = FakeRefresher::new(transport.clone(), true);
    let c = client(transport.clone(), refresher, Arc::new(MemoryTimestampStore::new()));

    let config = RequestConfig::post("/admin/productos")
        .header("Content-Type", "application/json")
        .form(vec![
            FormPart::text("nombre", "Pashmina"),
            FormPart::file("imagen", "pashmina.jpg", Some("image/jpeg"), vec![0xffu8, 0xd8]),
        ]);
    c.request(config).await.unwrap();

    let sent = transport.sent();
    assert!(sent[0].headers.get("content-type").is_none());
}

#[tokio::test]
async fn connectivity_failure_is_normalized() {
    let transport = ScriptedTransport::new();
    let refresher = FakeRefresher::new(transport.clone(), true);
    let c = client(transport.clone(), refresher.clone(), Arc::new(MemoryTimestampStore::new()));

    let err = c.get("/sin-conexion").await.unwrap_err();
    let n = err.normalized().unwrap();
    assert_eq!(n.kind(), ErrorKind::Connectivity);
    assert_eq!(n.field(), FieldHint::General);
    assert_eq!(refresher.calls(), 0);
}

#[tokio::test]
async fn structured_backend_errors_are_normalized() {
    let transport = ScriptedTransport::new();
    transport.route(
        "/auth/registro",
        409,
        r#"{"error":{"message":"Correo ya registrado","type":"email"},"redirectTo":"/registro"}"#,
    );
    transport.route("/paquetes/99", 404, r#"{"error":"Paquete no encontrado"}"#);
    transport.route("/reportes", 500, "<html>boom</html>");
    let refresher = FakeRefresher::new(transport.clone(), true);
    let c = client(transport.clone(), refresher, Arc::new(MemoryTimestampStore::new()));

    let err = c.post_json("/auth/registro", &serde_json::json!({})).await.unwrap_err();
    let n = err.normalized().unwrap();
    assert_eq!(n.kind(), ErrorKind::BackendValidation);
    assert_eq!(n.message(), "Correo ya registrado");
    assert_eq!(n.field(), FieldHint::Email);
    assert_eq!(n.redirect_to(), Some("/registro"));

    let err = c.get("/paquetes/99").await.unwrap_err();
    assert_eq!(err.normalized().unwrap().message(), "Paquete no encontrado");

    let err = c.get("/reportes").await.unwrap_err();
    assert!(err.normalized().is_none());
    assert_eq!(err.status(), Some(500));
}
