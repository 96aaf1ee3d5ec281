//! Per-session connection and login state.

use crate::config::SubscriptionPolicy;
use crate::subscriptions::SubscriptionRegistry;

use models::LoginOutcome;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Username reported before any login and after a logout.
pub const GUEST_USERNAME: &str = "guest";

/// Connection and identity of one client session.
///
/// Invariant: `logged` is only ever true while `connected` is true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    connected: bool,
    logged: bool,
    username: String,
    subscriptions: SubscriptionRegistry,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            connected: false,
            logged: false,
            username: GUEST_USERNAME.to_string(),
            subscriptions: SubscriptionRegistry::default(),
        }
    }
}

impl SessionState {
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_logged(&self) -> bool {
        self.logged
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn subscriptions(&self) -> &SubscriptionRegistry {
        &self.subscriptions
    }

    pub(crate) fn subscriptions_mut(&mut self) -> &mut SubscriptionRegistry {
        &mut self.subscriptions
    }

    pub(crate) fn mark_connected(&mut self) {
        self.connected = true;
    }

    pub(crate) fn mark_disconnected(&mut self, policy: SubscriptionPolicy) {
        self.connected = false;
        self.logged = false;
        if policy == SubscriptionPolicy::Clear {
            self.subscriptions.clear();
        }
    }

    /// Apply a login reply. Failed logins leave the state untouched.
    ///
    /// Returns whether the session is now logged in as a result of this reply.
    pub(crate) fn apply_login(&mut self, outcome: &LoginOutcome) -> bool {
        if !outcome.success || !self.connected {
            return false;
        }

        if let Some(username) = &outcome.username {
            self.username = username.clone();
        }
        self.logged = true;
        true
    }

    pub(crate) fn apply_logout(&mut self) {
        self.username = GUEST_USERNAME.to_string();
        self.logged = false;
    }
}

/// Session state shared between the client handle and its signal handler.
///
/// Critical sections are short and never call out to hooks, so a poisoned
/// lock still guards consistent data and is recovered.
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedSession(Arc<Mutex<SessionState>>);

impl SharedSession {
    pub(crate) fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.lock().is_connected()
    }
}
