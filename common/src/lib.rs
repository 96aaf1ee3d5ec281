//! Shared building blocks for the jsonbarn workspace.
//!
//! Everything here is dependency-light and free of I/O so that both the
//! wire models and the session driver can use it:
//!
//! - [`ErrorLocation`] - caller location attached to every error variant
//! - [`RedactedSecret`] - credential holder that never leaks into logs

pub mod error;
pub mod redacted_secret;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use redacted_secret::RedactedSecret;
