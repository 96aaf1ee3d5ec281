use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Optional delay hint, in milliseconds, attached to a write command.
///
/// Serialized as a bare number under the `defered` key (sic, that is the
/// server's spelling). The number is forwarded as given; the server decides
/// what a negative or fractional hint means.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deferred(Number);

impl Deferred {
    pub fn from_millis(millis: u64) -> Self {
        Self(Number::from(millis))
    }

    pub fn as_number(&self) -> &Number {
        &self.0
    }

    /// Lenient conversion from an untyped value.
    ///
    /// Any JSON number and any string holding a finite number is accepted.
    /// Everything else is treated as absent rather than rejected.
    pub fn parse(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => Some(Self(number.clone())),
            Value::String(text) => parse_numeric_text(text.trim()).map(Self),
            _ => None,
        }
    }
}

fn parse_numeric_text(text: &str) -> Option<Number> {
    text.parse::<Number>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().and_then(Number::from_f64))
}

impl From<u64> for Deferred {
    fn from(millis: u64) -> Self {
        Self::from_millis(millis)
    }
}

impl From<Duration> for Deferred {
    fn from(delay: Duration) -> Self {
        Self::from_millis(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX))
    }
}
