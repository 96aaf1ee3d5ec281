//! Client façade.

use crate::config::{ClientConfig, SubscriptionPolicy, parse_transport_address};
use crate::encoder;
use crate::error::client::ClientError;
use crate::hooks::{Hooks, ListenerId};
use crate::router::{dispatch, route_frame};
use crate::sender::{FlowSender, RetryPolicy};
use crate::session::{SessionState, SharedSession};
use crate::transport::{Transport, TransportEvent, TransportEventReceiver, WsTransport, event_channel};

use common::{ErrorLocation, RedactedSecret};
use models::{Command, Deferred, LoginOutcome, ReadResult, ServerTime, StatsReport, SubscriptionAck};

use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{error, info, warn};
use serde_json::Value;
use tokio::runtime::Handle;
use uuid::Uuid;

/// The transport currently bound to a session, tagged with the generation it
/// was attached under.
struct Link {
    transport: Arc<dyn Transport>,
    generation: u64,
}

struct ClientInner {
    config: ClientConfig,
    session_id: Uuid,
    policy: RetryPolicy,
    session: SharedSession,
    hooks: Hooks,
    link: Mutex<Option<Link>>,
    generation: Arc<AtomicU64>,
}

/// One session against a jsonbarn server.
///
/// Cloning is cheap and every clone drives the same session. Independent
/// sessions come from independent [`BarnClient::new`] calls.
///
/// Every operation checks the connection, validates its arguments, then
/// hands the frame to the flow-controlled sender. Replies arrive later
/// through the `on_*` hooks. A failed operation is reported to the
/// [`on_error`](BarnClient::on_error) listeners once and returned as `Err`;
/// nothing is transmitted in that case.
#[derive(Clone)]
pub struct BarnClient {
    inner: Arc<ClientInner>,
}

impl BarnClient {
    pub fn new(config: ClientConfig) -> Self {
        let session_id = Uuid::new_v4();
        info!("[{}] New session {session_id}", config.deployment);

        Self {
            inner: Arc::new(ClientInner {
                policy: RetryPolicy::from(&config.sender),
                config,
                session_id,
                session: SharedSession::default(),
                hooks: Hooks::new(),
                link: Mutex::new(None),
                generation: Arc::new(AtomicU64::new(0)),
            }),
        }
    }

    // ============================================
    // LIFECYCLE
    // ============================================

    /// Open a WebSocket to `address` and bind it to this session.
    ///
    /// Returns once the connection attempt is under way; `on_connect` fires
    /// when it opens, `on_error` then `on_disconnect` if it fails. A previous
    /// transport is closed first.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] if `address` is not a `ws://` or
    /// `wss://` URL.
    pub async fn connect(&self, address: &str) -> Result<(), ClientError> {
        let url = match parse_transport_address(address) {
            Ok(url) => url,
            Err(message) => {
                let error = ClientError::Validation {
                    message,
                    location: ErrorLocation::from(Location::caller()),
                };
                self.report(&error);
                return Err(error);
            }
        };

        info!("[{}] Connecting to {url}", self.deployment());
        let (events_tx, events_rx) = event_channel();
        let transport = WsTransport::connect(url, events_tx);
        self.attach(Arc::new(transport), events_rx);
        Ok(())
    }

    /// Connect to the address from the configuration.
    pub async fn connect_configured(&self) -> Result<(), ClientError> {
        let address = self.inner.config.server.address.clone();
        self.connect(&address).await
    }

    /// Bind `transport` and spawn a task feeding `events` into
    /// [`handle_transport_event`](Self::handle_transport_event).
    ///
    /// Events left over from a transport that has since been replaced are
    /// ignored.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn attach(&self, transport: Arc<dyn Transport>, mut events: TransportEventReceiver) {
        let generation = self.attach_transport(transport);
        // Weak so that dropping every handle also drops the transport.
        let inner = Arc::downgrade(&self.inner);

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                if inner.generation.load(Ordering::SeqCst) != generation {
                    break;
                }
                BarnClient { inner }.handle_transport_event(event);
            }
        });
    }

    /// Bind `transport` without an event pump. The embedder feeds signals
    /// through [`handle_transport_event`](Self::handle_transport_event).
    ///
    /// Returns the generation number of the new binding.
    pub fn attach_transport(&self, transport: Arc<dyn Transport>) -> u64 {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let previous = self.link().replace(Link {
            transport,
            generation,
        });

        if let Some(previous) = previous {
            info!(
                "[{}] Replacing transport {} with {generation}",
                self.deployment(),
                previous.generation
            );
            previous.transport.close();
            if self.mark_disconnected() {
                self.inner.hooks.disconnect.emit(&());
            }
        }

        generation
    }

    /// Close the current transport, if any. `on_disconnect` fires when the
    /// close completes.
    pub fn disconnect(&self) {
        let link = self.link();
        match link.as_ref() {
            Some(link) => {
                info!("[{}] Disconnecting", self.deployment());
                link.transport.close();
            }
            None => warn!("[{}] Disconnect requested without a transport", self.deployment()),
        }
    }

    /// Apply one transport signal to the session and fire the matching hooks.
    pub fn handle_transport_event(&self, event: TransportEvent) {
        match event {
            TransportEvent::Opened => {
                self.inner.session.lock().mark_connected();
                info!("[{}] Connected", self.deployment());
                self.inner.hooks.connect.emit(&());

                if self.inner.config.subscriptions.on_disconnect == SubscriptionPolicy::Replay {
                    self.replay_subscriptions();
                }
            }
            TransportEvent::Closed => {
                self.mark_disconnected();
                self.inner.hooks.disconnect.emit(&());
            }
            TransportEvent::Error(message) => {
                error!("[{}] Transport error: {message}", self.deployment());
                self.inner.hooks.error.emit(&ClientError::Transport {
                    message,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            TransportEvent::Message(frame) => {
                let routed = {
                    let mut session = self.inner.session.lock();
                    route_frame(&frame, &mut session)
                };

                match routed {
                    Ok(Some(event)) => dispatch(&self.inner.hooks, &event),
                    Ok(None) => {}
                    Err(error) => self.inner.hooks.error.emit(&error),
                }
            }
        }
    }

    // ============================================
    // OBSERVERS
    // ============================================

    pub fn deployment(&self) -> &str {
        &self.inner.config.deployment
    }

    pub fn session_id(&self) -> Uuid {
        self.inner.session_id
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn is_connected(&self) -> bool {
        self.inner.session.is_connected()
    }

    pub fn is_logged(&self) -> bool {
        self.inner.session.lock().is_logged()
    }

    pub fn username(&self) -> String {
        self.inner.session.lock().username().to_string()
    }

    pub fn is_subscribed(&self, bucket_name: &str) -> bool {
        self.inner.session.lock().subscriptions().contains(bucket_name)
    }

    /// Subscribed buckets, sorted.
    pub fn subscriptions(&self) -> Vec<String> {
        self.inner.session.lock().subscriptions().sorted()
    }

    pub fn session(&self) -> SessionState {
        self.inner.session.snapshot()
    }

    // ============================================
    // OPERATIONS
    // ============================================

    pub async fn login(
        &self,
        username: &str,
        password: impl Into<RedactedSecret>,
    ) -> Result<(), ClientError> {
        let password = password.into();
        self.submit(|| encoder::login(username, password)).await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        self.submit(encoder::logout).await
    }

    pub async fn insert(
        &self,
        bucket_name: &str,
        record: &Value,
        deferred: Option<Deferred>,
    ) -> Result<(), ClientError> {
        self.submit(|| encoder::insert(bucket_name, record, deferred)).await
    }

    /// Bucket and key come from the record's `$bucketname` and `$id`.
    pub async fn update(&self, record: &Value, deferred: Option<Deferred>) -> Result<(), ClientError> {
        self.submit(|| encoder::update(record, deferred)).await
    }

    pub async fn delete(
        &self,
        bucket_name: &str,
        record: &Value,
        deferred: Option<Deferred>,
    ) -> Result<(), ClientError> {
        self.submit(|| encoder::delete(bucket_name, record, deferred)).await
    }

    pub async fn query(&self, bucket_name: &str, pattern: &Value) -> Result<(), ClientError> {
        self.submit(|| encoder::query(bucket_name, pattern)).await
    }

    pub async fn one(
        &self,
        bucket_name: &str,
        search_field: &str,
        value: &str,
        field_type: &str,
    ) -> Result<(), ClientError> {
        self.submit(|| encoder::one(bucket_name, search_field, value, field_type))
            .await
    }

    pub async fn many(
        &self,
        bucket_name: &str,
        search_field: &str,
        value: &str,
        field_type: &str,
    ) -> Result<(), ClientError> {
        self.submit(|| encoder::many(bucket_name, search_field, value, field_type))
            .await
    }

    pub async fn range(
        &self,
        bucket_name: &str,
        search_field: &str,
        min_value: &str,
        max_value: &str,
        field_type: &str,
    ) -> Result<(), ClientError> {
        self.submit(|| encoder::range(bucket_name, search_field, min_value, max_value, field_type))
            .await
    }

    pub async fn all(&self, bucket_name: &str) -> Result<(), ClientError> {
        self.submit(|| encoder::all(bucket_name)).await
    }

    pub async fn index_create(&self, index_name: &str, field: &str) -> Result<(), ClientError> {
        self.submit(|| encoder::index_create(index_name, field)).await
    }

    pub async fn index_drop(&self, index_name: &str) -> Result<(), ClientError> {
        self.submit(|| encoder::index_drop(index_name)).await
    }

    pub async fn index_list(&self) -> Result<(), ClientError> {
        self.submit(encoder::index_list).await
    }

    pub async fn time(&self) -> Result<(), ClientError> {
        self.submit(encoder::time).await
    }

    pub async fn stats(&self) -> Result<(), ClientError> {
        self.submit(encoder::stats).await
    }

    /// The reply arrives on `on_read` with bucket `users`.
    pub async fn get_users(&self) -> Result<(), ClientError> {
        self.submit(encoder::get_users).await
    }

    /// The reply arrives on `on_read` with bucket `CONFIG`.
    pub async fn get_config(&self) -> Result<(), ClientError> {
        self.submit(encoder::get_config).await
    }

    pub async fn put_config(&self, config: &Value) -> Result<(), ClientError> {
        self.submit(|| encoder::put_config(config)).await
    }

    pub async fn get_logs(&self, start_time: &str, end_time: &str) -> Result<(), ClientError> {
        self.submit(|| encoder::get_logs(start_time, end_time)).await
    }

    /// Ask for push notifications on `bucket_name`. The subscription is
    /// recorded only once the server acknowledges it.
    pub async fn register_event(&self, bucket_name: &str) -> Result<(), ClientError> {
        self.submit(|| encoder::register_event(bucket_name)).await
    }

    pub async fn unregister_event(&self, bucket_name: &str) -> Result<(), ClientError> {
        self.submit(|| encoder::unregister_event(bucket_name)).await
    }

    pub async fn set_email_alert(&self, email: &str, buckets: &[&str]) -> Result<(), ClientError> {
        self.submit(|| encoder::email_alert(email, buckets)).await
    }

    pub async fn update_user_settings(&self, settings: &Value) -> Result<(), ClientError> {
        self.submit(|| encoder::user_settings(settings)).await
    }

    // ============================================
    // HOOKS
    // ============================================

    pub fn on_connect<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&()) + Send + Sync + 'static,
    {
        self.inner.hooks.on_connect(listener)
    }

    pub fn on_disconnect<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&()) + Send + Sync + 'static,
    {
        self.inner.hooks.on_disconnect(listener)
    }

    pub fn on_error<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ClientError) + Send + Sync + 'static,
    {
        self.inner.hooks.on_error(listener)
    }

    pub fn on_login<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&LoginOutcome) + Send + Sync + 'static,
    {
        self.inner.hooks.on_login(listener)
    }

    pub fn on_logout<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&()) + Send + Sync + 'static,
    {
        self.inner.hooks.on_logout(listener)
    }

    pub fn on_message<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.inner.hooks.on_message(listener)
    }

    pub fn on_read<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ReadResult) + Send + Sync + 'static,
    {
        self.inner.hooks.on_read(listener)
    }

    pub fn on_stats<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&StatsReport) + Send + Sync + 'static,
    {
        self.inner.hooks.on_stats(listener)
    }

    pub fn on_insert<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.inner.hooks.on_insert(listener)
    }

    pub fn on_update<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.inner.hooks.on_update(listener)
    }

    pub fn on_delete<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.inner.hooks.on_delete(listener)
    }

    pub fn on_time<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ServerTime) + Send + Sync + 'static,
    {
        self.inner.hooks.on_time(listener)
    }

    pub fn on_indexes<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.inner.hooks.on_indexes(listener)
    }

    pub fn on_register_event<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&SubscriptionAck) + Send + Sync + 'static,
    {
        self.inner.hooks.on_register_event(listener)
    }

    pub fn on_unregister_event<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&SubscriptionAck) + Send + Sync + 'static,
    {
        self.inner.hooks.on_unregister_event(listener)
    }

    /// Returns false if no listener with this id is registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.inner.hooks.remove(id)
    }

    // ============================================
    // INTERNALS
    // ============================================

    fn link(&self) -> MutexGuard<'_, Option<Link>> {
        self.inner.link.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn submit<F>(&self, encode: F) -> Result<(), ClientError>
    where
        F: FnOnce() -> Result<Command, ClientError>,
    {
        let result = match self.sender() {
            Ok(sender) => match encode() {
                Ok(command) => sender.send(&command).await,
                Err(error) => Err(error),
            },
            Err(error) => Err(error),
        };

        if let Err(error) = &result {
            self.report(error);
        }
        result
    }

    #[track_caller]
    fn sender(&self) -> Result<FlowSender, ClientError> {
        let link = self.link();
        let Some(link) = link.as_ref() else {
            return Err(ClientError::Connection {
                message: "There is no active connection".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        };

        if !self.inner.session.is_connected() {
            return Err(ClientError::Connection {
                message: "The connection is not open".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(FlowSender::new(
            Arc::clone(&link.transport),
            self.inner.session.clone(),
            self.inner.policy,
            link.generation,
            Arc::clone(&self.inner.generation),
        ))
    }

    fn report(&self, error: &ClientError) {
        warn!("[{}] {error}", self.deployment());
        self.inner.hooks.error.emit(error);
    }

    /// Returns whether the session was connected before.
    fn mark_disconnected(&self) -> bool {
        let was_connected = {
            let mut session = self.inner.session.lock();
            let was_connected = session.is_connected();
            session.mark_disconnected(self.inner.config.subscriptions.on_disconnect);
            was_connected
        };

        if was_connected {
            info!("[{}] Disconnected", self.deployment());
        }
        was_connected
    }

    fn replay_subscriptions(&self) {
        let buckets = self.subscriptions();
        if buckets.is_empty() {
            return;
        }

        let Ok(runtime) = Handle::try_current() else {
            warn!(
                "[{}] No async runtime, cannot replay {} subscription(s)",
                self.deployment(),
                buckets.len()
            );
            return;
        };

        info!(
            "[{}] Replaying subscriptions: {}",
            self.deployment(),
            buckets.join(", ")
        );
        let client = self.clone();
        runtime.spawn(async move {
            for bucket_name in buckets {
                // Failures already went to the error hooks.
                let _ = client.register_event(&bucket_name).await;
            }
        });
    }
}
