//! WebSocket transport over tokio-tungstenite.

use crate::error::transport::TransportError;
use crate::transport::{Transport, TransportEvent, TransportEventSender};

use common::ErrorLocation;

use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, trace, warn};
use tokio::spawn as TokioSpawn;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

enum Outbound {
    Frame(String),
    Close,
}

/// WebSocket connection driven by a background task.
///
/// Frames handed to [`send_text`](Transport::send_text) are queued and written
/// by the task; [`buffered_amount`](Transport::buffered_amount) reports the
/// bytes still waiting in that queue, mirroring a browser socket's
/// `bufferedAmount`.
pub struct WsTransport {
    outbound: mpsc::UnboundedSender<Outbound>,
    backlog: Arc<AtomicUsize>,
}

impl WsTransport {
    /// Start connecting to `address`. Must be called within a Tokio runtime.
    ///
    /// Returns immediately; `Opened` (or `Error` then `Closed`) is reported on
    /// `events` once the handshake finishes.
    pub fn connect(address: Url, events: TransportEventSender) -> Self {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let backlog = Arc::new(AtomicUsize::new(0));

        TokioSpawn(run_connection(
            address,
            outbound_rx,
            events,
            Arc::clone(&backlog),
        ));

        Self { outbound, backlog }
    }
}

impl Transport for WsTransport {
    fn send_text(&self, frame: String) -> Result<(), TransportError> {
        let len = frame.len();
        self.backlog.fetch_add(len, Ordering::SeqCst);

        self.outbound.send(Outbound::Frame(frame)).map_err(|_| {
            self.backlog.fetch_sub(len, Ordering::SeqCst);
            TransportError::Closed {
                message: "WebSocket connection task has stopped".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }

    fn buffered_amount(&self) -> usize {
        self.backlog.load(Ordering::SeqCst)
    }

    fn close(&self) {
        if self.outbound.send(Outbound::Close).is_err() {
            debug!("Close requested on a WebSocket that already stopped");
        }
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        let _ = self.outbound.send(Outbound::Close);
    }
}

/// Owns the socket for its whole life. Always ends by emitting `Closed`.
async fn run_connection(
    address: Url,
    mut outbound_rx: mpsc::UnboundedReceiver<Outbound>,
    events: TransportEventSender,
    backlog: Arc<AtomicUsize>,
) {
    let ws_stream = match connect_async(address.as_str()).await {
        Ok((ws_stream, _response)) => ws_stream,
        Err(e) => {
            error!("WebSocket connect to {address} failed: {e}");
            let _ = events.send(TransportEvent::Error(format!(
                "Failed to connect to {address}: {e}"
            )));
            let _ = events.send(TransportEvent::Closed);
            return;
        }
    };

    info!("WebSocket connected to {address}");
    let _ = events.send(TransportEvent::Opened);

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => match outbound {
                Some(Outbound::Frame(frame)) => {
                    let len = frame.len();
                    let result = write.send(Message::Text(frame.into())).await;
                    backlog.fetch_sub(len, Ordering::SeqCst);

                    if let Err(e) = result {
                        error!("WebSocket write to {address} failed: {e}");
                        let _ = events.send(TransportEvent::Error(format!("Write failed: {e}")));
                        break;
                    }
                    trace!("Wrote {len} byte frame to {address}");
                }
                Some(Outbound::Close) | None => {
                    debug!("Closing WebSocket to {address}");
                    if let Err(e) = write.close().await {
                        warn!("WebSocket close handshake to {address} failed: {e}");
                    }
                    break;
                }
            },
            inbound = read.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    let _ = events.send(TransportEvent::Message(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(data))) => match String::from_utf8(data.to_vec()) {
                    Ok(text) => {
                        let _ = events.send(TransportEvent::Message(text));
                    }
                    Err(e) => {
                        warn!("Dropping non UTF-8 binary frame from {address}");
                        let _ = events.send(TransportEvent::Error(format!(
                            "Binary frame is not UTF-8: {e}"
                        )));
                    }
                },
                Some(Ok(Message::Close(_))) | None => {
                    info!("WebSocket to {address} closed by peer");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    error!("WebSocket read from {address} failed: {e}");
                    let _ = events.send(TransportEvent::Error(format!("Read failed: {e}")));
                    break;
                }
            },
        }
    }

    backlog.store(0, Ordering::SeqCst);
    let _ = events.send(TransportEvent::Closed);
}
