//! Wire models for the jsonbarn document store protocol.
//!
//! This crate contains pure data structures: the outbound [`Command`] frame and
//! its per-verb validation, the scalar [`FieldType`] used by indexed lookups,
//! and the inbound [`ServerEvent`] decoded from reply and push frames.
//! Nothing here performs I/O; the session driver lives in `barn-client`.
//!
//! ## Casing
//!
//! Request verbs are uppercase (`READONE`). Response discriminants are
//! lowercase (`read`, `login`) except `INSERT`, `UPDATE` and `DELETE`, which
//! the server echoes in uppercase. Both tables are matched case-sensitively.

pub mod action;
pub mod command;
pub mod deferred;
pub mod error;
pub mod event;
pub mod field_type;
pub mod record;

pub use action::{Action, ResponseAction};
pub use command::Command;
pub use command::builder::CommandBuilder;
pub use common::ErrorLocation;
pub use deferred::Deferred;
pub use error::model_error::ModelError;
pub use event::{
    LoginOutcome, ReadResult, ServerEvent, ServerTime, StatsReport, SubscriptionAck,
};
pub use field_type::FieldType;

#[cfg(test)]
mod tests;
