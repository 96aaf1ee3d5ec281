use crate::encoder;
use crate::error::client::ClientError;

use models::{Command, Deferred};

use serde_json::{Value, json};

fn frame(command: Command) -> Value {
    serde_json::from_str(&command.to_frame().unwrap()).unwrap()
}

/// **VALUE**: Verifies that `insert` sends `key` when the record carries a non-empty `$id`.
///
/// **WHY THIS MATTERS**: The server uses `key` as the record id; without it a client-chosen
/// id is replaced by a generated one.
///
/// **BUG THIS CATCHES**: Would catch the `$id` lookup being dropped from insert.
#[test]
fn given_record_with_id_when_encoding_insert_then_includes_key() {
    // GIVEN: A record with an id
    let record = json!({"$id": "x", "total": 12});

    // WHEN: Encoding an insert
    let frame = frame(encoder::insert("orders", &record, None).unwrap());

    // THEN: key, bucket and data are all present
    assert_eq!(frame["action"], "INSERT");
    assert_eq!(frame["bucketname"], "orders");
    assert_eq!(frame["key"], "x");
    assert_eq!(frame["data"], record);
}

/// **VALUE**: Verifies that an empty `$id` is treated as no id at all.
///
/// **WHY THIS MATTERS**: Forms commonly produce `$id: ""` for new records; sending `"key":""`
/// would create a record under the empty key.
///
/// **BUG THIS CATCHES**: Would catch the encoder checking for presence instead of non-emptiness.
#[test]
fn given_record_with_empty_id_when_encoding_insert_then_omits_key() {
    // GIVEN: A record with an empty id
    let record = json!({"$id": "", "total": 12});

    // WHEN: Encoding an insert
    let frame = frame(encoder::insert("orders", &record, None).unwrap());

    // THEN: No key field at all
    assert!(frame.get("key").is_none(), "frame: {frame}");
    assert!(frame.get("defered").is_none());
}

/// **VALUE**: Verifies that a deferred hint is carried under the server's `defered` key.
///
/// **WHY THIS MATTERS**: The server only recognizes the misspelled key.
///
/// **BUG THIS CATCHES**: Would catch someone "fixing" the spelling on the wire.
#[test]
fn given_deferred_hint_when_encoding_delete_then_frame_carries_defered() {
    // GIVEN: A record and a 250ms hint
    let record = json!({"$id": "17"});

    // WHEN: Encoding a delete
    let frame = frame(encoder::delete("orders", &record, Some(Deferred::from_millis(250))).unwrap());

    // THEN: Hint and key are on the frame, data is not
    assert_eq!(frame["action"], "DELETE");
    assert_eq!(frame["key"], "17");
    assert_eq!(frame["defered"], 250);
    assert!(frame.get("data").is_none());
}

/// **VALUE**: Verifies that `update` takes bucket and key from the reserved properties.
///
/// **WHY THIS MATTERS**: Records read from the server carry both, and update relies on them.
///
/// **BUG THIS CATCHES**: Would catch `$bucketname` or `$id` being read from the wrong property.
#[test]
fn given_record_with_reserved_properties_when_encoding_update_then_uses_them() {
    // GIVEN: A record as returned by a read
    let record = json!({"$id": "a1", "$bucketname": "orders", "total": 3});

    // WHEN: Encoding an update
    let frame = frame(encoder::update(&record, None).unwrap());

    // THEN: Bucket and key come from the record
    assert_eq!(frame["action"], "UPDATE");
    assert_eq!(frame["bucketname"], "orders");
    assert_eq!(frame["key"], "a1");
    assert_eq!(frame["data"]["total"], 3);
}

/// **VALUE**: Verifies that update rejects records missing either reserved property.
///
/// **WHY THIS MATTERS**: An update without a target would be sent as a malformed frame.
///
/// **BUG THIS CATCHES**: Would catch one of the two checks being skipped.
#[test]
fn given_record_missing_identity_when_encoding_update_then_returns_validation_error() {
    // GIVEN: Records missing $id, missing $bucketname, and with an empty $id
    let records = [
        json!({"$bucketname": "orders"}),
        json!({"$id": "a1"}),
        json!({"$id": "", "$bucketname": "orders"}),
    ];

    for record in records {
        // WHEN: Encoding an update
        let result = encoder::update(&record, None);

        // THEN: Validation error
        assert!(
            matches!(result, Err(ClientError::Validation { .. })),
            "record {record} gave {result:?}"
        );
    }
}

/// **VALUE**: Verifies that lookups reject field types outside the five literals.
///
/// **WHY THIS MATTERS**: The server indexes by type; a wrong type reads garbage or nothing.
///
/// **BUG THIS CATCHES**: Would catch case-insensitive parsing or a missing check on one verb.
#[test]
fn given_unknown_field_type_when_encoding_lookups_then_all_reject() {
    // GIVEN: Field types the server does not know
    for field_type in ["int", "FLOAT", "", "TEXT "] {
        // WHEN: Encoding one, many and range
        let one = encoder::one("people", "age", "42", field_type);
        let many = encoder::many("people", "age", "42", field_type);
        let range = encoder::range("people", "age", "1", "9", field_type);

        // THEN: Each is rejected before a command exists
        for result in [one, many, range] {
            match result {
                Err(ClientError::Validation { message, .. }) => {
                    assert!(message.contains("BIGINT"), "got: {message}");
                }
                other => panic!("Expected validation error for {field_type:?}, got {other:?}"),
            }
        }
    }
}

/// **VALUE**: Verifies the range frame layout.
///
/// **WHY THIS MATTERS**: `key` is the lower bound and `maxkey` the upper; swapping them
/// returns an empty range.
///
/// **BUG THIS CATCHES**: Would catch bounds being mapped to the wrong fields.
#[test]
fn given_valid_bounds_when_encoding_range_then_maps_min_to_key_and_max_to_maxkey() {
    // GIVEN / WHEN: A DOUBLE range
    let frame = frame(encoder::range("readings", "celsius", "-5.5", "30", "DOUBLE").unwrap());

    // THEN: Bounds and type in place
    assert_eq!(frame["action"], "READRANGE");
    assert_eq!(frame["searchfield"], "celsius");
    assert_eq!(frame["key"], "-5.5");
    assert_eq!(frame["maxkey"], "30");
    assert_eq!(frame["field"], "DOUBLE");
}

/// **VALUE**: Verifies that the email alert frame nests email and buckets under `data`.
///
/// **WHY THIS MATTERS**: The server reads `data.email` and `data.buckets`.
///
/// **BUG THIS CATCHES**: Would catch the payload being flattened onto the frame.
#[test]
fn given_email_and_buckets_when_encoding_email_alert_then_nests_under_data() {
    // GIVEN / WHEN
    let frame = frame(encoder::email_alert("ops@example.com", &["orders", "stock"]).unwrap());

    // THEN
    assert_eq!(frame["action"], "EMAILALERT");
    assert_eq!(
        frame["data"],
        json!({"email": "ops@example.com", "buckets": ["orders", "stock"]})
    );
}

/// **VALUE**: Verifies that an empty email address is rejected.
///
/// **WHY THIS MATTERS**: The server would store an alert that can never be delivered.
///
/// **BUG THIS CATCHES**: Would catch the email check being dropped.
#[test]
fn given_blank_email_when_encoding_email_alert_then_returns_validation_error() {
    let result = encoder::email_alert("  ", &["orders"]);

    assert!(matches!(result, Err(ClientError::Validation { .. })));
}

/// **VALUE**: Verifies that identifiers are rejected when empty across the bucket and index verbs.
///
/// **WHY THIS MATTERS**: Empty identifiers address nothing on the server.
///
/// **BUG THIS CATCHES**: Would catch a verb losing its required-identifier check.
#[test]
fn given_empty_identifiers_when_encoding_then_returns_validation_errors() {
    // GIVEN / WHEN: Every operation with an empty identifier
    let results = [
        encoder::login("", "secret"),
        encoder::login("bob", ""),
        encoder::insert("", &json!({}), None),
        encoder::delete("", &json!({"$id": "1"}), None),
        encoder::query("", &json!({})),
        encoder::all(""),
        encoder::index_create("", "age"),
        encoder::index_create("by_age", ""),
        encoder::index_drop(""),
        encoder::register_event(""),
        encoder::unregister_event(""),
    ];

    // THEN: All rejected
    for result in results {
        assert!(
            matches!(result, Err(ClientError::Validation { .. })),
            "got {result:?}"
        );
    }
}

/// **VALUE**: Verifies that the password reaches the frame but never the debug output.
///
/// **WHY THIS MATTERS**: Commands are logged on failure; a password in a log file is a leak.
///
/// **BUG THIS CATCHES**: Would catch `Command` deriving a Debug that prints the secret.
#[test]
fn given_login_when_encoding_then_password_is_in_frame_but_not_in_debug() {
    // GIVEN / WHEN
    let command = encoder::login("bob", "hunter2").unwrap();

    // THEN
    let debug = format!("{command:?}");
    assert!(!debug.contains("hunter2"), "debug leaked: {debug}");
    let frame = frame(command);
    assert_eq!(frame["username"], "bob");
    assert_eq!(frame["password"], "hunter2");
}

/// **VALUE**: Verifies the argument-less verbs produce bare frames.
///
/// **WHY THIS MATTERS**: Extra null fields have been known to trip strict server parsing.
///
/// **BUG THIS CATCHES**: Would catch absent optionals being serialized as `null`.
#[test]
fn given_argument_less_verbs_when_encoding_then_frames_only_carry_action() {
    let cases = [
        (encoder::logout(), "LOGOUT"),
        (encoder::index_list(), "INDEXLIST"),
        (encoder::time(), "GETTIME"),
        (encoder::stats(), "STATS"),
        (encoder::get_users(), "GETUSERS"),
        (encoder::get_config(), "GETCONFIG"),
    ];

    for (command, action) in cases {
        let frame = frame(command.unwrap());
        assert_eq!(frame, json!({ "action": action }));
    }
}

/// **VALUE**: Verifies the log range is passed through as key/maxkey, empty bounds allowed.
///
/// **WHY THIS MATTERS**: An open-ended range is expressed with an empty bound.
///
/// **BUG THIS CATCHES**: Would catch LOGS bounds being treated as identifiers.
#[test]
fn given_open_ended_range_when_encoding_get_logs_then_keeps_empty_bound() {
    let frame = frame(encoder::get_logs("2026-01-01", "").unwrap());

    assert_eq!(frame["action"], "LOGS");
    assert_eq!(frame["key"], "2026-01-01");
    assert_eq!(frame["maxkey"], "");
}
