//! Outbound command frame.

pub mod builder;

use crate::{Action, Deferred, ErrorLocation, FieldType, ModelError};

use common::RedactedSecret;

use std::panic::Location;

use serde::{Serialize, Serializer};
use serde_json::Value;

/// A validated command, ready to be serialized onto the wire.
///
/// Only [`CommandBuilder::build`](builder::CommandBuilder::build) creates
/// commands, so every instance satisfies the required-field table of its verb.
/// Absent optional fields are omitted from the frame rather than sent as
/// `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    action: Action,

    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,

    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "expose_password"
    )]
    password: Option<RedactedSecret>,

    #[serde(rename = "bucketname", skip_serializing_if = "Option::is_none")]
    bucket_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,

    #[serde(rename = "searchfield", skip_serializing_if = "Option::is_none")]
    search_field: Option<String>,

    #[serde(rename = "maxkey", skip_serializing_if = "Option::is_none")]
    max_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<FieldType>,

    #[serde(rename = "defered", skip_serializing_if = "Option::is_none")]
    deferred: Option<Deferred>,

    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl Command {
    pub fn action(&self) -> Action {
        self.action
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn bucket_name(&self) -> Option<&str> {
        self.bucket_name.as_deref()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn search_field(&self) -> Option<&str> {
        self.search_field.as_deref()
    }

    pub fn max_key(&self) -> Option<&str> {
        self.max_key.as_deref()
    }

    pub fn field(&self) -> Option<FieldType> {
        self.field
    }

    pub fn deferred(&self) -> Option<&Deferred> {
        self.deferred.as_ref()
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Serialize to the canonical JSON text frame.
    ///
    /// All string values go through the JSON serializer, so quotes and control
    /// characters inside identifiers are escaped.
    #[track_caller]
    pub fn to_frame(&self) -> Result<String, ModelError> {
        serde_json::to_string(self).map_err(|e| ModelError::Serialization {
            message: format!("Failed to serialize {} command: {e}", self.action),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

fn expose_password<S>(password: &Option<RedactedSecret>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match password {
        Some(secret) => serializer.serialize_some(secret.expose()),
        None => serializer.serialize_none(),
    }
}
