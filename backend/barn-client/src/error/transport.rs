use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum TransportError {
    #[error("Transport Closed Error: {message} {location}")]
    Closed {
        message: String,
        location: ErrorLocation,
    },
}
