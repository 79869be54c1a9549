use super::{
    ClientState, ConnectionManager, ConnectionState, RealtimeClientBuilder, RealtimeClientOptions,
};
use crate::auth::TokenStore;
use crate::infrastructure::Backoff;
use crate::infrastructure::heartbeat::{self, HeartbeatManager, HeartbeatTick};
use crate::listeners::{Listeners, Subscription};
use crate::messaging::payload::{ChannelRef, OutgoingMessage, PingPayload};
use crate::messaging::{
    ChannelUpdate, ChatMessage, ClientEvent, ControlKind, ErrorEvent, MessageRouter, ServerEvent,
    TypingIndicator, WaitingChannel,
};
use crate::types::{AUTH_TOKEN_KEY, RealtimeError, RealtimeMessage, Result};
use crate::websocket::{Connector, DisconnectReason, FrameStream, TransportEvent};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use url::Url;

/// The main entry point for the storefront's realtime support chat.
///
/// `RealtimeClient` manages one WebSocket connection to the realtime server,
/// delivers inbound events to typed listeners, and reconnects with
/// exponential backoff when the server closes the connection.
///
/// The client is a cheap handle: clones share the same connection, state
/// and listeners. Construct one per session and pass it where needed.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use storefront_realtime::{MemoryTokenStore, RealtimeClient, RealtimeClientOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = RealtimeClient::builder("wss://shop.example.com/realtime", RealtimeClientOptions::default())?
///     .token_store(Arc::new(MemoryTokenStore::with_token("jwt")))
///     .build();
///
/// let _sub = client.on_message(|message| println!("{}: {}", message.channel_id, message.content));
/// client.connect().await?;
/// client.join_channel("support-42").await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RealtimeClient {
    pub(crate) endpoint: Url,
    pub(crate) options: RealtimeClientOptions,
    pub(crate) backoff: Backoff,

    // Injected collaborators
    pub(crate) connector: Arc<dyn Connector>,
    pub(crate) token_store: Arc<dyn TokenStore>,

    // Connection manager
    pub(crate) connection: Arc<ConnectionManager>,

    // Consolidated mutable state
    pub(crate) state: Arc<RwLock<ClientState>>,

    pub(crate) listeners: Arc<Listeners>,
}

impl RealtimeClient {
    /// Creates a client with the default WebSocket transport and an empty
    /// in-memory token store.
    ///
    /// Use [`builder`](Self::builder) to supply the token store the
    /// application logs in with.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::UrlParse`] or [`RealtimeError::InvalidEndpoint`]
    /// if the endpoint is not an `http(s)` or `ws(s)` URL.
    pub fn new(endpoint: impl AsRef<str>, options: RealtimeClientOptions) -> Result<Self> {
        RealtimeClientBuilder::new(endpoint, options).map(|builder| builder.build())
    }

    pub fn builder(
        endpoint: impl AsRef<str>,
        options: RealtimeClientOptions,
    ) -> Result<RealtimeClientBuilder> {
        RealtimeClientBuilder::new(endpoint, options)
    }

    /// Reads the bearer token; blank values count as missing
    async fn load_token(&self) -> Result<Option<String>> {
        let token = self.token_store.get(AUTH_TOKEN_KEY).await?;
        Ok(token.filter(|t| !t.trim().is_empty()))
    }

    /// Opens the connection.
    ///
    /// Does nothing if the client is already connected or connecting. When a
    /// retry is pending, the timer is cancelled and the attempt happens now.
    ///
    /// On success the `connected` listeners fire. If the attempt fails, the
    /// failure goes to the `error` listeners and a retry is scheduled with
    /// backoff.
    ///
    /// # Errors
    ///
    /// - [`RealtimeError::MissingCredential`] if the token store holds no
    ///   token. Nothing is attempted and no listener fires.
    /// - The transport error, or [`RealtimeError::Timeout`], of this attempt.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use storefront_realtime::{RealtimeClient, RealtimeClientOptions};
    /// # async fn example(client: RealtimeClient) {
    /// if let Err(e) = client.connect().await {
    ///     eprintln!("realtime chat unavailable: {}", e);
    /// }
    /// # }
    /// ```
    pub async fn connect(&self) -> Result<()> {
        let (epoch, token) = {
            let mut state = self.state.write().await;
            let current = self.connection.state();
            if matches!(
                current,
                ConnectionState::Connected | ConnectionState::Connecting
            ) {
                tracing::debug!("Already connected or connecting, ignoring connect()");
                return Ok(());
            }

            let token = match self.load_token().await {
                Ok(Some(token)) => token,
                Ok(None) => {
                    tracing::warn!("No auth token found, not connecting to realtime server");
                    return Err(RealtimeError::MissingCredential);
                }
                Err(e) => {
                    tracing::error!("Failed to read auth token: {}", e);
                    return Err(e);
                }
            };

            if current == ConnectionState::Reconnecting {
                state.cancel_pending_reconnect();
            } else {
                state.reconnect_attempts = 0;
            }
            self.connection.set_state(ConnectionState::Connecting);
            (state.epoch, token)
        };

        tracing::info!("Connecting to {}", self.endpoint);
        self.open_session(epoch, &token).await
    }

    /// Runs one connection attempt. The caller has already moved the state
    /// to `Connecting`.
    async fn open_session(&self, epoch: u64, token: &str) -> Result<()> {
        let attempt = tokio::time::timeout(
            self.options.connect_timeout,
            self.connector.connect(&self.endpoint, token),
        )
        .await
        .unwrap_or_else(|_| Err(RealtimeError::Timeout));

        let link = match attempt {
            Ok(link) => link,
            Err(e) => {
                tracing::error!("Connection attempt failed: {}", e);
                self.handle_connect_failure(epoch, &e).await;
                return Err(e);
            }
        };

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            drop(state);
            tracing::info!("Disconnected while connecting, dropping new connection");
            let mut sink = link.sink;
            if let Err(e) = sink.close().await {
                tracing::debug!("Error closing superseded connection: {}", e);
            }
            return Ok(());
        }

        state.reconnect_attempts = 0;
        self.connection.set_writer(link.sink).await;
        self.connection.set_state(ConnectionState::Connected);
        tracing::info!("Connected to realtime server");
        self.listeners.connected.emit(&());

        let session = self.clone();
        let events = link.events;
        state.task_manager.spawn(async move {
            session.run_session(epoch, events).await;
        });

        Ok(())
    }

    async fn handle_connect_failure(&self, epoch: u64, error: &RealtimeError) {
        let mut state = self.state.write().await;
        if state.epoch != epoch {
            return;
        }

        self.listeners
            .error
            .emit(&ErrorEvent::connection(error.to_string()));
        self.schedule_reconnect(&mut state, epoch);
    }

    /// Schedules the next retry, or settles in `Disconnected` once the
    /// attempt budget is spent. Must be called with the state lock held.
    fn schedule_reconnect(&self, state: &mut ClientState, epoch: u64) {
        if !self.backoff.allows(state.reconnect_attempts) {
            tracing::warn!(
                "Giving up after {} reconnection attempts",
                state.reconnect_attempts
            );
            self.connection.set_state(ConnectionState::Disconnected);
            return;
        }

        state.reconnect_attempts += 1;
        let attempt = state.reconnect_attempts;
        let delay = self.backoff.delay_for(attempt);
        tracing::info!(
            "Reconnecting in {:?} (attempt {}/{})",
            delay,
            attempt,
            self.backoff.max_attempts()
        );
        self.connection.set_state(ConnectionState::Reconnecting);

        let client = self.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            client.run_reconnect_attempt(epoch).await;
        });

        state.cancel_pending_reconnect();
        state.pending_reconnect = Some(timer);
    }

    async fn run_reconnect_attempt(&self, epoch: u64) {
        let token = {
            let mut state = self.state.write().await;
            // From here on this task is the attempt, not a cancellable timer
            state.pending_reconnect = None;

            if state.epoch != epoch || self.connection.state() != ConnectionState::Reconnecting {
                return;
            }

            let token = match self.load_token().await {
                Ok(Some(token)) => token,
                Ok(None) => {
                    tracing::warn!("Auth token is gone, stopping reconnection");
                    self.connection.set_state(ConnectionState::Disconnected);
                    return;
                }
                Err(e) => {
                    tracing::error!("Failed to read auth token, stopping reconnection: {}", e);
                    self.connection.set_state(ConnectionState::Disconnected);
                    return;
                }
            };

            self.connection.set_state(ConnectionState::Connecting);
            token
        };

        tracing::info!("Attempting to reconnect...");
        if self.open_session(epoch, &token).await.is_ok() {
            tracing::info!("Reconnected successfully");
        }
    }

    /// Session task: reads inbound events and drives the heartbeat until the
    /// connection ends.
    async fn run_session(self, epoch: u64, mut events: FrameStream) {
        tracing::info!("Starting read task");
        let router = MessageRouter::new(Arc::clone(&self.listeners));
        let mut heartbeat = self.options.heartbeat_interval.map(HeartbeatManager::new);

        let reason = loop {
            tokio::select! {
                event = events.next() => match event {
                    Some(TransportEvent::Message(message)) => {
                        if router.route(message) == ServerEvent::Pong
                            && let Some(heartbeat) = heartbeat.as_mut()
                        {
                            heartbeat.ack();
                        }
                    }
                    Some(TransportEvent::Closed(reason)) => break reason,
                    None => break DisconnectReason::TransportClose,
                },
                tick = heartbeat::next_tick(&mut heartbeat) => match tick {
                    HeartbeatTick::Probe => self.ping().await,
                    HeartbeatTick::TimedOut => {
                        tracing::warn!("Heartbeat timeout detected, closing connection");
                        break DisconnectReason::PingTimeout;
                    }
                },
            }
        };

        tracing::info!("Read task finished");
        self.handle_connection_lost(epoch, reason).await;
    }

    async fn handle_connection_lost(&self, epoch: u64, reason: DisconnectReason) {
        let mut state = self.state.write().await;
        if state.epoch != epoch {
            tracing::debug!("Stale session ended ({}), ignoring", reason);
            return;
        }

        self.connection.clear_writer().await;
        tracing::warn!("Connection lost: {}", reason);

        // Listeners observe the settled state, never a transient Disconnected
        if reason.should_reconnect(self.options.reconnect_on_transport_error) {
            self.schedule_reconnect(&mut state, epoch);
        } else {
            tracing::info!("Not reconnecting after {}", reason);
            self.connection.set_state(ConnectionState::Disconnected);
        }
        self.listeners.disconnected.emit(&());
    }

    /// Closes the connection and stops every retry.
    ///
    /// Aborts the pending reconnect timer and the session task, then closes
    /// the connection. The `disconnected` listeners fire if a connection was
    /// live. Calling it again, or on a client that never connected, does
    /// nothing.
    ///
    /// To reconnect afterwards, call [`connect()`](Self::connect) again.
    pub async fn disconnect(&self) {
        let mut state = self.state.write().await;
        state.epoch += 1;
        state.cancel_pending_reconnect();
        state.task_manager.abort_all();

        let previous = self.connection.state();
        if previous == ConnectionState::Disconnected && !self.connection.has_writer().await {
            return;
        }

        tracing::info!("Disconnecting from realtime server");
        if let Err(e) = self.connection.close().await {
            tracing::warn!("Error while closing connection: {}", e);
        }
        self.connection.set_state(ConnectionState::Disconnected);

        if previous == ConnectionState::Connected {
            self.listeners.disconnected.emit(&());
        }
        tracing::info!("Disconnected from realtime server");
    }

    /// Serializes and sends one event over the live connection
    async fn emit<P: Serialize>(&self, event: ClientEvent, payload: P) -> Result<()> {
        if !self.is_connected() {
            return Err(RealtimeError::NotConnected);
        }

        let payload = serde_json::to_value(payload)?;
        tracing::debug!("Emitting {}", event);
        self.connection
            .send_message(RealtimeMessage::new(event.as_str(), payload))
            .await
    }

    /// Fire-and-forget variant for low-value signals
    async fn emit_best_effort<P: Serialize>(&self, event: ClientEvent, payload: P) {
        match self.emit(event, payload).await {
            Ok(()) => {}
            Err(RealtimeError::NotConnected) => {
                tracing::debug!("Not connected, dropping {}", event);
            }
            Err(e) => {
                tracing::warn!("Failed to emit {}: {}", event, e);
            }
        }
    }

    /// Joins a support channel. Ignored when not connected.
    pub async fn join_channel(&self, channel_id: &str) {
        self.emit_best_effort(ClientEvent::JoinChannel, ChannelRef { channel_id })
            .await;
    }

    /// Sends a chat message to a channel.
    ///
    /// Unlike the other emitters this reports whether the message was handed
    /// to the connection. There is no delivery acknowledgment, and a failed
    /// send is not retried.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::NotConnected`] when disconnected (nothing is
    /// sent), or the transport error if the write fails.
    pub async fn send(&self, channel_id: &str, content: impl Into<String>) -> Result<()> {
        let payload = OutgoingMessage {
            channel_id,
            content: content.into(),
        };
        self.emit(ClientEvent::SendMessage, payload).await
    }

    /// Emits a conversation control signal. Ignored when not connected.
    pub async fn emit_control(&self, kind: ControlKind, channel_id: &str) {
        self.emit_best_effort(ClientEvent::from(kind), ChannelRef { channel_id })
            .await;
    }

    /// Sends a liveness probe. Ignored when not connected.
    pub async fn ping(&self) {
        let payload = PingPayload {
            timestamp: chrono::Utc::now(),
        };
        self.emit_best_effort(ClientEvent::Ping, payload).await;
    }

    pub fn on_message<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ChatMessage) + Send + Sync + 'static,
    {
        self.listeners.message.subscribe(listener)
    }

    pub fn on_channel_updated<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ChannelUpdate) + Send + Sync + 'static,
    {
        self.listeners.channel_updated.subscribe(listener)
    }

    pub fn on_typing<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&TypingIndicator) + Send + Sync + 'static,
    {
        self.listeners.typing.subscribe(listener)
    }

    /// Fires when a customer starts waiting for a human agent
    pub fn on_waiting_channel<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&WaitingChannel) + Send + Sync + 'static,
    {
        self.listeners.waiting_channel.subscribe(listener)
    }

    /// Fires for server `error` events and for failed connection attempts
    pub fn on_error<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ErrorEvent) + Send + Sync + 'static,
    {
        self.listeners.error.subscribe(listener)
    }

    pub fn on_connected<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.connected.subscribe(move |_: &()| listener())
    }

    pub fn on_disconnected<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.disconnected.subscribe(move |_: &()| listener())
    }

    /// Returns `true` if the connection is open.
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Watch receiver for connectivity changes, for UIs that show a status
    /// indicator.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.connection.subscribe()
    }

    /// Retries made since the last successful connection
    pub async fn reconnect_attempts(&self) -> u32 {
        self.state.read().await.reconnect_attempts
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[cfg(test)]
    pub(crate) async fn has_pending_reconnect(&self) -> bool {
        self.state.read().await.pending_reconnect.is_some()
    }

    #[cfg(test)]
    pub(crate) async fn has_connection(&self) -> bool {
        self.connection.has_writer().await
    }
}
