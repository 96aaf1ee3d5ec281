use crate::{FieldType, ModelError};

use std::str::FromStr;

/// **VALUE**: Verifies that all five declared literals parse.
///
/// **WHY THIS MATTERS**: Index lookups are typed; a literal that fails to parse makes
/// the corresponding index unreachable from the client.
///
/// **BUG THIS CATCHES**: Would catch a literal typo in `as_str`.
#[test]
fn given_known_literals_when_parsed_then_round_trip() {
    for literal in ["BIGINT", "TEXT", "INT", "DECIMAL", "DOUBLE"] {
        let field_type = FieldType::from_str(literal).unwrap();
        assert_eq!(field_type.as_str(), literal);
    }
}

/// **VALUE**: Verifies that anything outside the five literals is rejected, lowercase included.
///
/// **WHY THIS MATTERS**: The server compares the type literally; `int` would reach it as
/// an unknown type and fail far from the call site.
///
/// **BUG THIS CATCHES**: Would catch case-insensitive matching sneaking in.
#[test]
fn given_unknown_literals_when_parsed_then_returns_validation_error() {
    for literal in ["int", "FLOAT", "", "TEXT "] {
        let result = FieldType::from_str(literal);
        assert!(
            matches!(result, Err(ModelError::Validation { .. })),
            "literal {literal:?} should be rejected"
        );
    }
}
