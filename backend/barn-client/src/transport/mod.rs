//! Duplex transport boundary.
//!
//! The session driver never touches a socket directly. It talks to a
//! [`Transport`] for outbound frames and consumes [`TransportEvent`]s for
//! everything inbound, which keeps the driver testable without a network and
//! lets embedders bring their own connection.
//!
//! [`WsTransport`] is the WebSocket implementation used by
//! [`BarnClient::connect`](crate::BarnClient::connect).

mod ws;

pub use ws::WsTransport;

use crate::error::transport::TransportError;

use tokio::sync::mpsc;

/// Signals raised by a transport, in the order they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Closed,
    /// Transport-level failure. Does not imply `Closed`; that arrives separately.
    Error(String),
    /// One inbound text frame.
    Message(String),
}

pub type TransportEventSender = mpsc::UnboundedSender<TransportEvent>;
pub type TransportEventReceiver = mpsc::UnboundedReceiver<TransportEvent>;

/// Outbound half of a message-oriented duplex connection.
pub trait Transport: Send + Sync {
    /// Queue one text frame. Must not block.
    fn send_text(&self, frame: String) -> Result<(), TransportError>;

    /// Bytes accepted by [`send_text`](Transport::send_text) but not yet written out.
    fn buffered_amount(&self) -> usize;

    /// Begin closing. A `Closed` event follows once the connection is down.
    fn close(&self);
}

/// Channel pair a transport reports its signals on.
pub fn event_channel() -> (TransportEventSender, TransportEventReceiver) {
    mpsc::unbounded_channel()
}
