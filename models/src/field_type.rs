use crate::{ErrorLocation, ModelError};

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::panic::Location;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Declared scalar type of an indexed search field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "BIGINT")]
    BigInt,
    #[serde(rename = "TEXT")]
    Text,
    #[serde(rename = "INT")]
    Int,
    #[serde(rename = "DECIMAL")]
    Decimal,
    #[serde(rename = "DOUBLE")]
    Double,
}

impl FieldType {
    pub const ALL: [FieldType; 5] = [
        FieldType::BigInt,
        FieldType::Text,
        FieldType::Int,
        FieldType::Decimal,
        FieldType::Double,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            FieldType::BigInt => "BIGINT",
            FieldType::Text => "TEXT",
            FieldType::Int => "INT",
            FieldType::Decimal => "DECIMAL",
            FieldType::Double => "DOUBLE",
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = ModelError;

    /// Only the five uppercase literals are accepted; `"int"` is rejected.
    #[track_caller]
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|field_type| field_type.as_str() == value)
            .ok_or_else(|| ModelError::Validation {
                message: format!(
                    "Invalid field type '{value}', must be either INT, BIGINT, TEXT, DECIMAL or DOUBLE"
                ),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
