use crate::error::transport::TransportError;

use common::ErrorLocation;
use models::ModelError;

use std::panic::Location;

use thiserror::Error as ThisError;

/// Coarse classification of a [`ClientError`], convenient for matching in hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientErrorKind {
    Connection,
    Validation,
    ProtocolParse,
    Send,
    Transport,
}

/// Errors raised by a client session.
///
/// None of these close the session. Every error produced while running an
/// operation or handling a transport signal is delivered to the error hooks
/// as well as returned to the caller (where there is one).
#[derive(Debug, ThisError)]
pub enum ClientError {
    /// No transport, or the transport is not open.
    #[error("Connection Error: {message} {location}")]
    Connection {
        message: String,
        location: ErrorLocation,
    },

    /// Missing identifier, unknown field type, malformed address.
    #[error("Validation Error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },

    /// An inbound frame was not valid JSON.
    #[error("Protocol Parse Error: {message} {location}")]
    ProtocolParse {
        message: String,
        location: ErrorLocation,
    },

    /// The frame could not be handed to the transport.
    #[error("Send Error: {message} {location}")]
    Send {
        message: String,
        location: ErrorLocation,
    },

    /// The transport reported an error signal.
    #[error("Transport Error: {message} {location}")]
    Transport {
        message: String,
        location: ErrorLocation,
    },
}

impl ClientError {
    pub fn kind(&self) -> ClientErrorKind {
        match self {
            ClientError::Connection { .. } => ClientErrorKind::Connection,
            ClientError::Validation { .. } => ClientErrorKind::Validation,
            ClientError::ProtocolParse { .. } => ClientErrorKind::ProtocolParse,
            ClientError::Send { .. } => ClientErrorKind::Send,
            ClientError::Transport { .. } => ClientErrorKind::Transport,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ClientError::Connection { message, .. }
            | ClientError::Validation { message, .. }
            | ClientError::ProtocolParse { message, .. }
            | ClientError::Send { message, .. }
            | ClientError::Transport { message, .. } => message,
        }
    }
}

impl From<ModelError> for ClientError {
    #[track_caller]
    fn from(error: ModelError) -> Self {
        match error {
            ModelError::Validation { message, .. } => ClientError::Validation {
                message,
                location: ErrorLocation::from(Location::caller()),
            },
            ModelError::Serialization { message, .. } => ClientError::Send {
                message,
                location: ErrorLocation::from(Location::caller()),
            },
        }
    }
}

impl From<TransportError> for ClientError {
    #[track_caller]
    fn from(error: TransportError) -> Self {
        ClientError::Send {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
