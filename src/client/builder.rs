use super::{ClientState, ConnectionManager, RealtimeClient};
use crate::auth::{MemoryTokenStore, TokenStore};
use crate::infrastructure::{Backoff, to_ws_endpoint};
use crate::listeners::Listeners;
use crate::types::{
    DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_RECONNECT_BASE_DELAY, DEFAULT_TIMEOUT, Result,
};
use crate::websocket::{Connector, WebSocketFactory};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

#[derive(Debug, Clone)]
pub struct RealtimeClientOptions {
    /// Delay before the first retry; doubles on each further retry
    pub reconnect_base_delay: Duration,
    /// Retries after which the client gives up and stays disconnected
    pub max_reconnect_attempts: u32,
    /// Also reconnect after transport-level losses, not only server closes
    pub reconnect_on_transport_error: bool,
    /// Send `ping` this often while connected; `None` disables the heartbeat
    pub heartbeat_interval: Option<Duration>,
    /// Upper bound on one connection attempt
    pub connect_timeout: Duration,
}

impl Default for RealtimeClientOptions {
    fn default() -> Self {
        Self {
            reconnect_base_delay: Duration::from_millis(DEFAULT_RECONNECT_BASE_DELAY),
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            reconnect_on_transport_error: false,
            heartbeat_interval: None,
            connect_timeout: Duration::from_millis(DEFAULT_TIMEOUT),
        }
    }
}

/// Builder for RealtimeClient that handles initialization and lets the
/// host inject the transport and the token store
pub struct RealtimeClientBuilder {
    endpoint: Url,
    options: RealtimeClientOptions,
    connector: Arc<dyn Connector>,
    token_store: Arc<dyn TokenStore>,
}

impl RealtimeClientBuilder {
    /// Create a new builder; fails if the endpoint is not a usable URL
    pub fn new(endpoint: impl AsRef<str>, options: RealtimeClientOptions) -> Result<Self> {
        let endpoint = to_ws_endpoint(endpoint.as_ref())?;

        Ok(Self {
            endpoint,
            options,
            connector: Arc::new(WebSocketFactory::new()),
            token_store: Arc::new(MemoryTokenStore::new()),
        })
    }

    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn token_store(mut self, token_store: Arc<dyn TokenStore>) -> Self {
        self.token_store = token_store;
        self
    }

    pub fn build(self) -> RealtimeClient {
        let backoff = Backoff::new(
            self.options.reconnect_base_delay,
            self.options.max_reconnect_attempts,
        );

        RealtimeClient {
            endpoint: self.endpoint,
            options: self.options,
            backoff,
            connector: self.connector,
            token_store: self.token_store,
            connection: Arc::new(ConnectionManager::new()),
            state: Arc::new(RwLock::new(ClientState::new())),
            listeners: Arc::new(Listeners::new()),
        }
    }
}
