// Shared fixtures for the unit tests.

use crate::error::transport::TransportError;
use crate::transport::Transport;

use common::ErrorLocation;

use std::panic::Location;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;

/// In-memory transport recording every frame it is handed.
///
/// The backlog drains by `drain_per_check` bytes each time it is inspected,
/// which stands in for the socket flushing between retries.
#[derive(Default)]
pub(crate) struct MockTransport {
    sent: Mutex<Vec<String>>,
    backlog: AtomicUsize,
    drain_per_check: AtomicUsize,
    checks: AtomicUsize,
    closed: AtomicBool,
    refuse: AtomicBool,
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn with_backlog(backlog: usize, drain_per_check: usize) -> Arc<Self> {
        let transport = Self::default();
        transport.backlog.store(backlog, Ordering::SeqCst);
        transport
            .drain_per_check
            .store(drain_per_check, Ordering::SeqCst);
        Arc::new(transport)
    }

    pub(crate) fn refusing() -> Arc<Self> {
        let transport = Self::default();
        transport.refuse.store(true, Ordering::SeqCst);
        Arc::new(transport)
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn sent_json(&self) -> Vec<Value> {
        self.sent()
            .iter()
            .map(|frame| serde_json::from_str(frame).unwrap())
            .collect()
    }

    pub(crate) fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    fn send_text(&self, frame: String) -> Result<(), TransportError> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(TransportError::Closed {
                message: "mock transport refuses frames".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.sent.lock().unwrap().push(frame);
        Ok(())
    }

    fn buffered_amount(&self) -> usize {
        self.checks.fetch_add(1, Ordering::SeqCst);
        let drain = self.drain_per_check.load(Ordering::SeqCst);
        let current = self.backlog.load(Ordering::SeqCst);
        self.backlog
            .store(current.saturating_sub(drain), Ordering::SeqCst);
        current
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
