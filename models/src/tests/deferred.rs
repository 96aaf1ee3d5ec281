use crate::Deferred;

use serde_json::{Number, json};

/// **VALUE**: Verifies that numeric and numeric-string hints are accepted.
///
/// **WHY THIS MATTERS**: Hints often arrive from form fields as strings.
///
/// **BUG THIS CATCHES**: Would catch `parse` accepting only JSON numbers.
#[test]
fn given_numeric_values_when_parsed_then_returns_millis() {
    assert_eq!(Deferred::parse(&json!(30)), Some(Deferred::from_millis(30)));
    assert_eq!(Deferred::parse(&json!("45")), Some(Deferred::from_millis(45)));
    assert_eq!(Deferred::parse(&json!(" 60 ")), Some(Deferred::from_millis(60)));
}

/// **VALUE**: Verifies that negative and fractional hints are kept as given.
///
/// **WHY THIS MATTERS**: Any numeric hint is a valid hint; only non-numbers are dropped.
///
/// **BUG THIS CATCHES**: Would catch numeric values outside the unsigned integers
/// being silently discarded.
#[test]
fn given_negative_or_fractional_values_when_parsed_then_value_is_preserved() {
    // GIVEN / WHEN
    let negative = Deferred::parse(&json!(-1)).unwrap();
    let fractional = Deferred::parse(&json!(1.5)).unwrap();
    let fractional_text = Deferred::parse(&json!("2.5")).unwrap();
    let leading_dot = Deferred::parse(&json!(".5")).unwrap();

    // THEN
    assert_eq!(negative.as_number(), &Number::from(-1));
    assert_eq!(fractional.as_number().as_f64(), Some(1.5));
    assert_eq!(fractional_text.as_number().as_f64(), Some(2.5));
    assert_eq!(leading_dot.as_number().as_f64(), Some(0.5));
    assert_eq!(serde_json::to_string(&fractional).unwrap(), "1.5");
}

/// **VALUE**: Verifies that non-numeric hints are treated as absent.
///
/// **WHY THIS MATTERS**: A bad hint must not abort a write; it is simply dropped.
///
/// **BUG THIS CATCHES**: Would catch text, infinities or structured values being forwarded.
#[test]
fn given_non_numeric_values_when_parsed_then_returns_none() {
    for value in [
        json!("soon"),
        json!(""),
        json!("inf"),
        json!("NaN"),
        json!(null),
        json!(true),
        json!({"ms": 3}),
    ] {
        assert_eq!(Deferred::parse(&value), None, "value: {value}");
    }
}
