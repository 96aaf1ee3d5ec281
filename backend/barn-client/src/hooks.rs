//! Event hooks.
//!
//! Every event kind keeps an ordered list of listeners. Registering a listener
//! appends it; all listeners of a kind run, in registration order, each time
//! the event fires. A [`ListenerId`] removes one listener again.
//!
//! Listeners run on the thread handling the transport signal and must not
//! block. They may call back into the client: no lock is held while they run.

use crate::error::client::ClientError;

use models::{LoginOutcome, ReadResult, ServerTime, StatsReport, SubscriptionAck};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

/// Handle returned by every `on_*` registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

pub(crate) struct ListenerList<T: ?Sized> {
    entries: RwLock<Vec<(ListenerId, Listener<T>)>>,
}

impl<T: ?Sized> ListenerList<T> {
    fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    fn add(&self, id: ListenerId, listener: Listener<T>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
    }

    fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Invoke every listener with `payload`.
    pub(crate) fn emit(&self, payload: &T) {
        // Snapshot first so listeners can register or remove listeners.
        let listeners: Vec<Listener<T>> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(payload);
        }
    }
}

macro_rules! hook_registrars {
    ($($(#[$doc:meta])* $method:ident => $field:ident: $payload:ty;)*) => {
        impl Hooks {
            $(
                $(#[$doc])*
                pub fn $method<F>(&self, listener: F) -> ListenerId
                where
                    F: Fn(&$payload) + Send + Sync + 'static,
                {
                    let id = self.next_id();
                    self.$field.add(id, Arc::new(listener));
                    id
                }
            )*

            /// Remove a listener registered through any `on_*` method.
            ///
            /// Returns false if the id is unknown or was already removed.
            pub fn remove(&self, id: ListenerId) -> bool {
                false $(|| self.$field.remove(id))*
            }
        }
    };
}

/// Listener lists for every session event.
pub struct Hooks {
    next_id: AtomicU64,
    pub(crate) connect: ListenerList<()>,
    pub(crate) disconnect: ListenerList<()>,
    pub(crate) error: ListenerList<ClientError>,
    pub(crate) login: ListenerList<LoginOutcome>,
    pub(crate) logout: ListenerList<()>,
    pub(crate) message: ListenerList<Value>,
    pub(crate) read: ListenerList<ReadResult>,
    pub(crate) stats: ListenerList<StatsReport>,
    pub(crate) insert: ListenerList<Value>,
    pub(crate) update: ListenerList<Value>,
    pub(crate) delete: ListenerList<Value>,
    pub(crate) time: ListenerList<ServerTime>,
    pub(crate) indexes: ListenerList<Value>,
    pub(crate) register_event: ListenerList<SubscriptionAck>,
    pub(crate) unregister_event: ListenerList<SubscriptionAck>,
}

impl Hooks {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            connect: ListenerList::new(),
            disconnect: ListenerList::new(),
            error: ListenerList::new(),
            login: ListenerList::new(),
            logout: ListenerList::new(),
            message: ListenerList::new(),
            read: ListenerList::new(),
            stats: ListenerList::new(),
            insert: ListenerList::new(),
            update: ListenerList::new(),
            delete: ListenerList::new(),
            time: ListenerList::new(),
            indexes: ListenerList::new(),
            register_event: ListenerList::new(),
            unregister_event: ListenerList::new(),
        }
    }

    fn next_id(&self) -> ListenerId {
        ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

hook_registrars! {
    /// Transport opened.
    on_connect => connect: ();
    /// Transport closed. The session is already marked disconnected.
    on_disconnect => disconnect: ();
    /// Local failures (connection, validation, parse, send) and transport error signals.
    on_error => error: ClientError;
    /// Every login reply, successful or not. Check `success`.
    on_login => login: LoginOutcome;
    on_logout => logout: ();
    /// Free-form server message payload.
    on_message => message: Value;
    /// Read replies and change pushes. Fires for empty results too.
    on_read => read: ReadResult;
    on_stats => stats: StatsReport;
    /// Full `INSERT` envelope.
    on_insert => insert: Value;
    /// Full `UPDATE` envelope.
    on_update => update: Value;
    /// Full `DELETE` envelope.
    on_delete => delete: Value;
    on_time => time: ServerTime;
    /// The `indexes` payload of an index listing.
    on_indexes => indexes: Value;
    /// Subscription acknowledgements.
    on_register_event => register_event: SubscriptionAck;
    on_unregister_event => unregister_event: SubscriptionAck;
}
