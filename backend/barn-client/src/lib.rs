//! Session driver for the jsonbarn document store.
//!
//! [`BarnClient`] turns typed operations (login, CRUD on buckets, indexed
//! lookups, index management, subscriptions, server configuration) into JSON
//! command frames, writes them through a flow-controlled sender, and routes
//! every inbound reply or push frame to ordered listener lists.
//!
//! ```text
//! operation ─▶ encoder ─▶ sender ─▶ Transport ══▶ server
//!                                       │
//! hooks ◀── router (updates SessionState) ◀── TransportEvent
//! ```
//!
//! The transport is pluggable: [`WsTransport`] is the WebSocket
//! implementation, and [`BarnClient::attach`] accepts any other
//! [`Transport`].

pub mod client;
pub mod config;
pub mod encoder;
pub mod error;
pub mod hooks;
pub mod router;
pub mod sender;
pub mod session;
pub mod subscriptions;
pub mod transport;

#[cfg(test)]
mod tests;

pub use client::BarnClient;
pub use config::{ClientConfig, Credentials, SubscriptionPolicy};
pub use error::{ClientError, ClientErrorKind, ConfigError, TransportError};
pub use hooks::ListenerId;
pub use sender::RetryPolicy;
pub use session::{GUEST_USERNAME, SessionState};
pub use subscriptions::SubscriptionRegistry;
pub use transport::{Transport, TransportEvent, WsTransport};

pub const DEFAULT_SERVER_HOSTNAME: &str = "127.0.0.1";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_SERVER_PATH: &str = "/ws";
pub const DEFAULT_SERVER_ADDRESS: &str = const_format::concatcp!(
    "ws://",
    DEFAULT_SERVER_HOSTNAME,
    ":",
    DEFAULT_SERVER_PORT,
    DEFAULT_SERVER_PATH
);
