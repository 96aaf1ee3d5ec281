use barn_client::{ClientError, ConfigError};
use common::ErrorLocation;

use std::panic::Location;

use serde::Serialize;
use thiserror::Error;

/// Errors that end a `barnctl` run.
///
/// Library errors are flattened to their message; the location recorded is
/// where `barnctl` received them.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum BarnctlError {
    /// Error from this App
    #[error("Barnctl Error: {message} {location}")]
    Barnctl {
        message: String,
        location: ErrorLocation,
    },

    /// Session error from barn-client
    #[error("Client Error: {message} {location}")]
    Client {
        message: String,
        location: ErrorLocation,
    },

    /// Configuration could not be resolved, loaded or validated
    #[error("Config Error: {message} {location}")]
    Config {
        message: String,
        location: ErrorLocation,
    },
}

impl From<ClientError> for BarnctlError {
    #[track_caller]
    fn from(error: ClientError) -> Self {
        BarnctlError::Client {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ConfigError> for BarnctlError {
    #[track_caller]
    fn from(error: ConfigError) -> Self {
        BarnctlError::Config {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
