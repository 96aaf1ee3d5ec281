//! Flow-controlled sender.
//!
//! A frame is written only when the transport has nothing queued. While the
//! backlog is non-empty the same attempt is retried on a fixed interval until
//! it drains, the retry budget runs out, or the session goes away.

use crate::config::SenderConfig;
use crate::error::client::ClientError;
use crate::session::SharedSession;
use crate::transport::Transport;

use common::ErrorLocation;
use models::Command;

use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{debug, trace, warn};
use tokio::time::sleep as TokioSleep;

const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(10);
const DEFAULT_MAX_RETRY_ELAPSED: Duration = Duration::from_secs(5);

/// Fixed-interval retry with an overall time budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub max_elapsed: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_RETRY_INTERVAL,
            max_elapsed: DEFAULT_MAX_RETRY_ELAPSED,
        }
    }
}

impl From<&SenderConfig> for RetryPolicy {
    fn from(config: &SenderConfig) -> Self {
        Self {
            interval: config.retry_interval(),
            max_elapsed: config.max_retry_elapsed(),
        }
    }
}

impl RetryPolicy {
    // Multiplier 1 and no jitter turn the exponential schedule into a fixed one.
    fn schedule(&self) -> ExponentialBackoff {
        let mut backoff = ExponentialBackoff {
            initial_interval: self.interval,
            current_interval: self.interval,
            max_interval: self.interval,
            multiplier: 1.0,
            randomization_factor: 0.0,
            max_elapsed_time: Some(self.max_elapsed),
            ..Default::default()
        };
        backoff.reset();
        backoff
    }
}

/// Sends commands over one transport for as long as that transport is current.
pub(crate) struct FlowSender {
    transport: Arc<dyn Transport>,
    session: SharedSession,
    policy: RetryPolicy,
    generation: u64,
    current_generation: Arc<AtomicU64>,
}

impl FlowSender {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        session: SharedSession,
        policy: RetryPolicy,
        generation: u64,
        current_generation: Arc<AtomicU64>,
    ) -> Self {
        Self {
            transport,
            session,
            policy,
            generation,
            current_generation,
        }
    }

    /// Serialize `command` and write it once the backlog is empty.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Connection`] if the session disconnects, or the
    ///   transport is replaced, before the frame goes out.
    /// - [`ClientError::Send`] if the backlog does not drain within the retry
    ///   budget, or the transport refuses the frame.
    pub(crate) async fn send(&self, command: &Command) -> Result<(), ClientError> {
        let frame = command.to_frame()?;
        let action = command.action();
        let mut schedule = self.policy.schedule();

        loop {
            self.ensure_live(action.as_str())?;

            let backlog = self.transport.buffered_amount();
            if backlog == 0 {
                self.transport.send_text(frame)?;
                debug!("Sent {action} command");
                return Ok(());
            }

            match schedule.next_backoff() {
                Some(delay) => {
                    trace!("Transport backlog is {backlog} bytes, retrying {action} after {delay:?}");
                    TokioSleep(delay).await;
                }
                None => {
                    warn!(
                        "Gave up sending {action}: backlog still {backlog} bytes after {:?}",
                        self.policy.max_elapsed
                    );
                    return Err(ClientError::Send {
                        message: format!(
                            "Transport backlog did not drain within {:?}, {action} not sent",
                            self.policy.max_elapsed
                        ),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            }
        }
    }

    fn ensure_live(&self, action: &str) -> Result<(), ClientError> {
        if self.current_generation.load(Ordering::SeqCst) != self.generation {
            return Err(ClientError::Connection {
                message: format!("Transport was replaced before {action} could be sent"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if !self.session.is_connected() {
            return Err(ClientError::Connection {
                message: format!("Session disconnected before {action} could be sent"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }
}
