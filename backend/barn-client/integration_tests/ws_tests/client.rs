use crate::ws_tests::helpers::{start_fake_server, unused_address, wait_until};

use barn_client::{BarnClient, ClientConfig, ClientError, ClientErrorKind};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;

fn counter() -> (Arc<AtomicUsize>, impl Fn(&()) + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&count);
    (count, move |_: &()| {
        sink.fetch_add(1, Ordering::SeqCst);
    })
}

/// **VALUE**: Verifies the full login round trip over a real WebSocket.
///
/// **WHY THIS MATTERS**: Connect, frame encoding, the socket task and inbound routing all
/// have to line up for the simplest session to work.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - `Opened` is never emitted after the handshake
/// - Frames queued on the transport are never written
/// - Inbound text frames are not routed back into the session
#[tokio::test]
async fn given_running_server_when_logging_in_then_server_sees_frame_and_session_logs_in() {
    // GIVEN: A server and a connected client
    let mut server = start_fake_server().await;
    let client = BarnClient::new(ClientConfig::default());
    let (connects, on_connect) = counter();
    client.on_connect(on_connect);
    let logins = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&logins);
    client.on_login(move |outcome| sink.lock().unwrap().push(outcome.clone()));

    client.connect(&server.address).await.unwrap();
    wait_until("connect", || client.is_connected()).await;
    assert_eq!(connects.load(Ordering::SeqCst), 1);

    // WHEN: Logging in
    client.login("bob", "hunter2").await.unwrap();

    // THEN: The server receives the LOGIN frame
    let frame = server.next_frame().await;
    assert_eq!(
        frame,
        json!({"action": "LOGIN", "username": "bob", "password": "hunter2"})
    );

    // WHEN: The server accepts
    server.push(json!({
        "action": "login",
        "result": "success",
        "username": "bob",
        "rights": {"orders": "rw"},
        "settings": {}
    }));

    // THEN: The session is logged in and the hook saw the outcome
    wait_until("login", || client.is_logged()).await;
    assert_eq!(client.username(), "bob");
    let logins = logins.lock().unwrap();
    assert_eq!(logins.len(), 1);
    assert!(logins[0].success);
}

/// **VALUE**: Verifies subscriptions and change pushes over a real WebSocket.
///
/// **WHY THIS MATTERS**: Watchers depend on the ack updating the registry and on uppercase
/// pushes reaching the change hooks.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The registry is updated at request time instead of on the ack
/// - `INSERT` pushes are not recognized
#[tokio::test]
async fn given_registered_bucket_when_server_pushes_insert_then_insert_hook_fires() {
    // GIVEN
    let mut server = start_fake_server().await;
    let client = BarnClient::new(ClientConfig::default());
    let inserts = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&inserts);
    client.on_insert(move |envelope| sink.lock().unwrap().push(envelope.clone()));
    client.connect(&server.address).await.unwrap();
    wait_until("connect", || client.is_connected()).await;

    // WHEN: Registering
    client.register_event("orders").await.unwrap();
    let frame = server.next_frame().await;
    assert_eq!(frame, json!({"action": "REGISTEREVENT", "bucketname": "orders"}));
    server.push(json!({"action": "registerevent", "bucketname": "orders", "status": true}));

    // THEN
    wait_until("subscription", || client.is_subscribed("orders")).await;

    // WHEN: Another session inserted into the bucket
    server.push(json!({"action": "INSERT", "bucketname": "orders", "key": "a1"}));

    // THEN
    wait_until("insert push", || !inserts.lock().unwrap().is_empty()).await;
    assert_eq!(inserts.lock().unwrap()[0]["key"], "a1");
}

/// **VALUE**: Verifies that a server-side close disconnects the session.
///
/// **WHY THIS MATTERS**: Operations after a close must fail fast instead of queueing forever.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - `Closed` is not emitted when the peer closes
/// - Operations still succeed after the close
#[tokio::test]
async fn given_connected_client_when_server_closes_then_disconnect_fires_and_ops_fail() {
    // GIVEN
    let server = start_fake_server().await;
    let client = BarnClient::new(ClientConfig::default());
    let (disconnects, on_disconnect) = counter();
    client.on_disconnect(on_disconnect);
    client.connect(&server.address).await.unwrap();
    wait_until("connect", || client.is_connected()).await;

    // WHEN
    server.close();

    // THEN
    wait_until("disconnect", || disconnects.load(Ordering::SeqCst) == 1).await;
    assert!(!client.is_connected());
    let result = client.stats().await;
    assert!(matches!(result, Err(ClientError::Connection { .. })));
}

/// **VALUE**: Verifies that a refused connection is reported and leaves the session closed.
///
/// **WHY THIS MATTERS**: Callers learn about unreachable servers only through the hooks.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Connect failures are swallowed by the socket task
/// - `on_disconnect` never fires for a connection that never opened
#[tokio::test]
async fn given_nothing_listening_when_connecting_then_error_and_disconnect_fire() {
    // GIVEN
    let address = unused_address().await;
    let client = BarnClient::new(ClientConfig::default());
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    client.on_error(move |error| sink.lock().unwrap().push(error.kind()));
    let (disconnects, on_disconnect) = counter();
    client.on_disconnect(on_disconnect);

    // WHEN
    client.connect(&address).await.unwrap();

    // THEN
    wait_until("disconnect", || disconnects.load(Ordering::SeqCst) == 1).await;
    assert_eq!(*errors.lock().unwrap(), vec![ClientErrorKind::Transport]);
    assert!(!client.is_connected());
}

/// **VALUE**: Verifies that a non-WebSocket address is rejected up front.
///
/// **WHY THIS MATTERS**: `http://` addresses would fail later with an obscure handshake error.
///
/// **BUG THIS CATCHES**: Would catch the scheme check being dropped.
#[tokio::test]
async fn given_http_address_when_connecting_then_returns_validation_error() {
    let client = BarnClient::new(ClientConfig::default());
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&errors);
    client.on_error(move |error| sink.lock().unwrap().push(error.kind()));

    let result = client.connect("http://127.0.0.1:8080/ws").await;

    assert!(matches!(result, Err(ClientError::Validation { .. })));
    assert_eq!(*errors.lock().unwrap(), vec![ClientErrorKind::Validation]);
}

/// **VALUE**: Verifies that an explicit disconnect closes the socket.
///
/// **WHY THIS MATTERS**: Shutdown must release the server-side session.
///
/// **BUG THIS CATCHES**: Would catch `disconnect` not reaching the socket task.
#[tokio::test]
async fn given_connected_client_when_disconnecting_then_session_closes() {
    // GIVEN
    let server = start_fake_server().await;
    let client = BarnClient::new(ClientConfig::default());
    client.connect(&server.address).await.unwrap();
    wait_until("connect", || client.is_connected()).await;

    // WHEN
    client.disconnect();

    // THEN
    wait_until("disconnect", || !client.is_connected()).await;
}
