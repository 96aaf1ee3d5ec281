// Unit tests for error module

use crate::error::BarnctlError;

use barn_client::{ClientError, ConfigError};
use common::ErrorLocation;

use std::panic::Location;

/// **VALUE**: Tests that errors serialize with a type tag.
///
/// **WHY THIS MATTERS**: Run failures are written out as JSON for scripts wrapping barnctl.
///
/// **BUG THIS CATCHES**: Would catch if someone removes the `#[derive(Serialize)]`
/// or the `tag`/`content` layout.
#[test]
fn given_barnctl_error_when_serialized_then_contains_variant_and_message() {
    // GIVEN: A BarnctlError
    let err = BarnctlError::Barnctl {
        message: String::from("Test"),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN: Serializing to JSON
    let json = serde_json::to_value(&err).unwrap();

    // THEN: Tagged with the variant and carrying the message
    assert_eq!(json["type"], "Barnctl");
    assert_eq!(json["data"]["message"], "Test");
}

/// **VALUE**: Verifies library errors keep their full message when converted.
///
/// **WHY THIS MATTERS**: The converted error is what ends up in the log on exit.
///
/// **BUG THIS CATCHES**: Would catch a conversion dropping the original message.
#[test]
fn given_client_error_when_converted_then_message_is_preserved() {
    // GIVEN
    let client_error = ClientError::Connection {
        message: String::from("There is no active connection"),
        location: ErrorLocation::from(Location::caller()),
    };

    // WHEN
    let err = BarnctlError::from(client_error);

    // THEN
    match err {
        BarnctlError::Client { message, .. } => {
            assert!(message.contains("There is no active connection"), "got: {message}");
        }
        other => panic!("Expected Client variant, got {other:?}"),
    }
}

/// **VALUE**: Verifies config errors convert to the config variant.
///
/// **WHY THIS MATTERS**: Config failures should read as config failures on exit.
///
/// **BUG THIS CATCHES**: Would catch `ConfigError` being mapped to `Client`.
#[test]
fn given_config_error_when_converted_then_config_variant() {
    let config_error = ConfigError::ValidationError {
        reason: String::from("deployment cannot be empty"),
        location: ErrorLocation::from(Location::caller()),
    };

    let err = BarnctlError::from(config_error);

    assert!(matches!(err, BarnctlError::Config { .. }));
}
