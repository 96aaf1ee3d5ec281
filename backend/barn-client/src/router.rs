//! Inbound router.
//!
//! Routing is split in two steps so the session lock is never held while user
//! code runs: [`route_frame`] parses a frame and applies its state changes
//! under the lock, then [`dispatch`] fans the event out to the hooks.

use crate::error::client::ClientError;
use crate::hooks::Hooks;
use crate::session::SessionState;

use common::ErrorLocation;
use models::ServerEvent;

use std::panic::Location;

use log::{debug, info, warn};
use serde_json::Value;

/// Parse one inbound frame and apply its effect on `session`.
///
/// Returns `Ok(None)` for envelopes whose `action` is missing or not one of
/// the recognized literals; those are dropped silently.
///
/// # Errors
///
/// Returns [`ClientError::ProtocolParse`] if the frame is not valid JSON.
pub fn route_frame(
    frame: &str,
    session: &mut SessionState,
) -> Result<Option<ServerEvent>, ClientError> {
    let envelope: Value = serde_json::from_str(frame).map_err(|e| {
        warn!("Dropping malformed frame: {e}");
        ClientError::ProtocolParse {
            message: format!("Inbound frame is not valid JSON: {e}"),
            location: ErrorLocation::from(Location::caller()),
        }
    })?;

    let Some(event) = ServerEvent::decode(envelope) else {
        return Ok(None);
    };

    apply(&event, session);
    Ok(Some(event))
}

fn apply(event: &ServerEvent, session: &mut SessionState) {
    match event {
        ServerEvent::Login(outcome) => {
            if session.apply_login(outcome) {
                info!("Logged in as {}", session.username());
            } else if !outcome.success {
                debug!(
                    "Login refused: {}",
                    outcome.error.as_deref().unwrap_or("no reason given")
                );
            }
        }
        ServerEvent::Logout => {
            session.apply_logout();
            info!("Logged out");
        }
        ServerEvent::RegisterEvent(ack) => {
            if session.subscriptions_mut().insert(&ack.bucket_name) {
                info!("Subscribed to {}", ack.bucket_name);
            }
        }
        ServerEvent::UnregisterEvent(ack) => {
            if session.subscriptions_mut().remove(&ack.bucket_name) {
                info!("Unsubscribed from {}", ack.bucket_name);
            }
        }
        _ => {}
    }
}

/// Invoke the hooks registered for `event`.
pub fn dispatch(hooks: &Hooks, event: &ServerEvent) {
    match event {
        ServerEvent::Login(outcome) => hooks.login.emit(outcome),
        ServerEvent::Logout => hooks.logout.emit(&()),
        ServerEvent::Message(message) => hooks.message.emit(message),
        ServerEvent::Read(result) => hooks.read.emit(result),
        ServerEvent::Stats(report) => hooks.stats.emit(report),
        ServerEvent::Update(envelope) => hooks.update.emit(envelope),
        ServerEvent::Delete(envelope) => hooks.delete.emit(envelope),
        ServerEvent::Insert(envelope) => hooks.insert.emit(envelope),
        ServerEvent::Time(time) => hooks.time.emit(time),
        ServerEvent::Indexes(indexes) => hooks.indexes.emit(indexes),
        ServerEvent::RegisterEvent(ack) => hooks.register_event.emit(ack),
        ServerEvent::UnregisterEvent(ack) => hooks.unregister_event.emit(ack),
    }
}
