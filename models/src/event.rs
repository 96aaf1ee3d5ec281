//! Inbound reply and push frames.

use crate::ResponseAction;

use serde::Serialize;
use serde_json::Value;

const ACTION_KEY: &str = "action";
const LOGIN_SUCCESS: &str = "success";

/// Result of a `login` reply. Delivered whether or not the login succeeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginOutcome {
    pub username: Option<String>,
    pub success: bool,
    pub rights: Value,
    pub settings: Value,
    pub error: Option<String>,
}

/// Records returned by a read, or pushed after another session changed a
/// subscribed bucket. `items` may be empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadResult {
    pub bucket_name: String,
    pub items: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub server: Value,
    pub database: Value,
}

/// Server clock reply. `time` is in seconds when the server sent it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerTime {
    pub time: Option<f64>,
    pub envelope: Value,
}

/// Acknowledgement of a `REGISTEREVENT` / `UNREGISTEREVENT` request.
///
/// `status` and `error` are passed through as sent, when present. They do not
/// affect how the acknowledgement is applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionAck {
    pub bucket_name: String,
    pub status: Option<bool>,
    pub error: Option<String>,
}

/// A decoded inbound frame, one variant per recognized discriminant.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Login(LoginOutcome),
    Logout,
    Message(Value),
    Read(ReadResult),
    Stats(StatsReport),
    Update(Value),
    Delete(Value),
    Insert(Value),
    Time(ServerTime),
    Indexes(Value),
    RegisterEvent(SubscriptionAck),
    UnregisterEvent(SubscriptionAck),
}

impl ServerEvent {
    /// Decode a parsed envelope.
    ///
    /// Returns `None` for envelopes without a string `action`, or whose
    /// action is not a recognized literal.
    pub fn decode(envelope: Value) -> Option<Self> {
        let action = envelope
            .get(ACTION_KEY)
            .and_then(Value::as_str)
            .and_then(ResponseAction::from_literal)?;

        let event = match action {
            ResponseAction::Login => ServerEvent::Login(LoginOutcome {
                username: string_field(&envelope, "username"),
                success: envelope.get("result").and_then(Value::as_str) == Some(LOGIN_SUCCESS),
                rights: field_or_null(&envelope, "rights"),
                settings: field_or_null(&envelope, "settings"),
                error: string_field(&envelope, "error"),
            }),
            ResponseAction::Logout => ServerEvent::Logout,
            ResponseAction::Message => ServerEvent::Message(field_or_null(&envelope, "message")),
            ResponseAction::Read => ServerEvent::Read(ReadResult {
                bucket_name: bucket_name(&envelope),
                items: match envelope.get("items") {
                    Some(Value::Array(items)) => items.clone(),
                    _ => Vec::new(),
                },
            }),
            ResponseAction::Stats => ServerEvent::Stats(StatsReport {
                server: field_or_null(&envelope, "server"),
                database: field_or_null(&envelope, "database"),
            }),
            ResponseAction::Update => ServerEvent::Update(envelope),
            ResponseAction::Delete => ServerEvent::Delete(envelope),
            ResponseAction::Insert => ServerEvent::Insert(envelope),
            ResponseAction::GetTime => ServerEvent::Time(ServerTime {
                time: envelope.get("time").and_then(Value::as_f64),
                envelope,
            }),
            ResponseAction::ReadIndexes => {
                ServerEvent::Indexes(field_or_null(&envelope, "indexes"))
            }
            ResponseAction::RegisterEvent => ServerEvent::RegisterEvent(subscription_ack(&envelope)),
            ResponseAction::UnregisterEvent => {
                ServerEvent::UnregisterEvent(subscription_ack(&envelope))
            }
        };

        Some(event)
    }

    pub fn response_action(&self) -> ResponseAction {
        match self {
            ServerEvent::Login(_) => ResponseAction::Login,
            ServerEvent::Logout => ResponseAction::Logout,
            ServerEvent::Message(_) => ResponseAction::Message,
            ServerEvent::Read(_) => ResponseAction::Read,
            ServerEvent::Stats(_) => ResponseAction::Stats,
            ServerEvent::Update(_) => ResponseAction::Update,
            ServerEvent::Delete(_) => ResponseAction::Delete,
            ServerEvent::Insert(_) => ResponseAction::Insert,
            ServerEvent::Time(_) => ResponseAction::GetTime,
            ServerEvent::Indexes(_) => ResponseAction::ReadIndexes,
            ServerEvent::RegisterEvent(_) => ResponseAction::RegisterEvent,
            ServerEvent::UnregisterEvent(_) => ResponseAction::UnregisterEvent,
        }
    }
}

fn string_field(envelope: &Value, key: &str) -> Option<String> {
    envelope.get(key).and_then(Value::as_str).map(str::to_string)
}

fn field_or_null(envelope: &Value, key: &str) -> Value {
    envelope.get(key).cloned().unwrap_or(Value::Null)
}

// The server writes `bucketname`; accept the camel-cased spelling too.
fn bucket_name(envelope: &Value) -> String {
    string_field(envelope, "bucketname")
        .or_else(|| string_field(envelope, "bucketName"))
        .unwrap_or_default()
}

fn subscription_ack(envelope: &Value) -> SubscriptionAck {
    SubscriptionAck {
        bucket_name: bucket_name(envelope),
        status: envelope.get("status").and_then(Value::as_bool),
        error: string_field(envelope, "error"),
    }
}
