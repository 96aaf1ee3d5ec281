use crate::config::SubscriptionPolicy;
use crate::session::{GUEST_USERNAME, SessionState, SharedSession};
use crate::subscriptions::SubscriptionRegistry;

use models::LoginOutcome;

use std::thread;

use serde_json::Value;

/// **VALUE**: Verifies that a disconnect always clears the login, whatever the policy.
///
/// **WHY THIS MATTERS**: `logged` may only be true while connected.
///
/// **BUG THIS CATCHES**: Would catch the replay policy keeping the login alive.
#[test]
fn given_logged_session_when_disconnected_then_logged_is_false_for_both_policies() {
    for policy in [SubscriptionPolicy::Clear, SubscriptionPolicy::Replay] {
        // GIVEN
        let mut session = SessionState::default();
        session.mark_connected();
        assert!(session.apply_login(&LoginOutcome {
            username: Some("bob".to_string()),
            success: true,
            rights: Value::Null,
            settings: Value::Null,
            error: None,
        }));

        // WHEN
        session.mark_disconnected(policy);

        // THEN
        assert!(!session.is_connected());
        assert!(!session.is_logged(), "policy {policy:?}");
    }
}

/// **VALUE**: Verifies that a fresh session reports the guest username.
///
/// **WHY THIS MATTERS**: Callers display `username()` before any login; it must read the
/// same as after a logout.
///
/// **BUG THIS CATCHES**: Would catch a derived `Default` leaving the username empty.
#[test]
fn given_new_session_when_reading_username_then_is_guest() {
    // GIVEN / WHEN
    let session = SessionState::default();

    // THEN
    assert_eq!(session.username(), GUEST_USERNAME);
    assert!(!session.is_connected());
    assert!(!session.is_logged());
    assert!(session.subscriptions().is_empty());
}

/// **VALUE**: Verifies the registry set semantics and the sorted snapshot.
///
/// **WHY THIS MATTERS**: Duplicate acks must not double-count, and displays need a stable order.
///
/// **BUG THIS CATCHES**: Would catch the registry becoming a list.
#[test]
fn given_duplicate_inserts_when_listing_registry_then_sorted_and_unique() {
    // GIVEN
    let mut registry = SubscriptionRegistry::default();

    // WHEN
    assert!(registry.insert("stock"));
    assert!(registry.insert("orders"));
    assert!(!registry.insert("stock"));

    // THEN
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.sorted(), vec!["orders".to_string(), "stock".to_string()]);
    assert!(!registry.remove("missing"));
}

/// **VALUE**: Verifies that a poisoned session lock is recovered.
///
/// **WHY THIS MATTERS**: A panicking listener on another thread must not brick the client.
///
/// **BUG THIS CATCHES**: Would catch `lock().unwrap()` creeping back in.
#[test]
fn given_poisoned_lock_when_reading_session_then_state_is_still_available() {
    // GIVEN: A thread that panics while holding the lock
    let shared = SharedSession::default();
    shared.lock().mark_connected();
    let poisoner = shared.clone();
    let _ = thread::spawn(move || {
        let _guard = poisoner.lock();
        panic!("listener blew up");
    })
    .join();

    // WHEN / THEN
    assert!(shared.is_connected());
    assert!(shared.snapshot().is_connected());
}
