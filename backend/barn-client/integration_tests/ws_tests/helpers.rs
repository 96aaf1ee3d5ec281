//! Test helpers for WebSocket integration tests.
//!
//! This module provides a scripted jsonbarn server:
//! - Accepting one client connection on an ephemeral port
//! - Recording every text frame the client sends
//! - Pushing reply frames and closing on demand

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

const WAIT_TIMEOUT: Duration = Duration::from_secs(3);
const WAIT_STEP: Duration = Duration::from_millis(10);

pub enum ServerPush {
    Frame(Value),
    Close,
}

/// Handle on a scripted server that accepts a single client.
pub struct FakeServer {
    pub address: String,
    received: mpsc::UnboundedReceiver<Value>,
    push: mpsc::UnboundedSender<ServerPush>,
}

impl FakeServer {
    /// Next frame sent by the client, parsed as JSON.
    pub async fn next_frame(&mut self) -> Value {
        tokio::time::timeout(WAIT_TIMEOUT, self.received.recv())
            .await
            .expect("Timed out waiting for a client frame")
            .expect("Server task stopped")
    }

    pub fn push(&self, frame: Value) {
        self.push
            .send(ServerPush::Frame(frame))
            .expect("Server task stopped");
    }

    pub fn close(&self) {
        self.push.send(ServerPush::Close).expect("Server task stopped");
    }
}

/// Test helper: Start a server on an ephemeral port.
pub async fn start_fake_server() -> FakeServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let port = listener.local_addr().expect("No local address").port();

    let (received_tx, received) = mpsc::unbounded_channel();
    let (push, mut push_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("Failed to accept");
        let mut ws = accept_async(stream)
            .await
            .expect("WebSocket handshake failed");

        loop {
            tokio::select! {
                push = push_rx.recv() => match push {
                    Some(ServerPush::Frame(frame)) => {
                        ws.send(Message::Text(frame.to_string().into()))
                            .await
                            .expect("Failed to push frame");
                    }
                    Some(ServerPush::Close) | None => {
                        let _ = ws.close(None).await;
                        break;
                    }
                },
                inbound = ws.next() => match inbound {
                    Some(Ok(Message::Text(text))) => {
                        let frame: Value =
                            serde_json::from_str(text.as_str()).expect("Client sent invalid JSON");
                        let _ = received_tx.send(frame);
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                },
            }
        }
    });

    FakeServer {
        address: format!("ws://127.0.0.1:{port}/ws"),
        received,
        push,
    }
}

/// Test helper: An address nothing is listening on.
pub async fn unused_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let port = listener.local_addr().expect("No local address").port();
    drop(listener);
    format!("ws://127.0.0.1:{port}/ws")
}

/// Test helper: Poll `condition` until it holds or the timeout expires.
pub async fn wait_until(description: &str, condition: impl Fn() -> bool) {
    let deadline = Instant::now() + WAIT_TIMEOUT;
    while !condition() {
        assert!(Instant::now() < deadline, "Timed out waiting for {description}");
        sleep(WAIT_STEP).await;
    }
}
