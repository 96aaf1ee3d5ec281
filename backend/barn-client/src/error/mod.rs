pub mod client;
pub mod config;
pub mod transport;

pub use client::{ClientError, ClientErrorKind};
pub use config::ConfigError;
pub use transport::TransportError;
