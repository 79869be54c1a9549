use crate::auth::FileTokenStore;
use crate::client::RealtimeClientOptions;
use crate::types::Result;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Client settings, layered from defaults, an optional `config/realtime`
/// file and `REALTIME__*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Realtime endpoint; `http(s)` URLs are rewritten to `ws(s)`
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// JSON file holding `{"token": "..."}`
    #[serde(default)]
    pub token_file: Option<PathBuf>,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    /// Heartbeat period in milliseconds; unset or 0 disables it
    #[serde(default)]
    pub heartbeat_interval_ms: Option<u64>,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Also retry after transport errors and heartbeat timeouts
    #[serde(default)]
    pub on_transport_error: bool,
}

fn default_endpoint() -> String {
    "ws://localhost:8080/ws".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_max_attempts() -> u32 {
    5
}

impl Settings {
    /// Loads `.env`, then the config file and the environment.
    ///
    /// `REALTIME__RECONNECT__MAX_ATTEMPTS=3` sets `reconnect.max_attempts`.
    pub fn load() -> Result<Self> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let builder = Self::defaults()?
            .add_source(File::with_name("config/realtime").required(false))
            .add_source(
                Environment::with_prefix("REALTIME")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        Ok(builder.build()?.try_deserialize()?)
    }

    fn defaults() -> std::result::Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("endpoint", default_endpoint())?
            .set_default("reconnect.base_delay_ms", default_base_delay_ms())?
            .set_default("reconnect.max_attempts", default_max_attempts())?
            .set_default("reconnect.on_transport_error", false)?
            .set_default("connect_timeout_ms", default_connect_timeout_ms())
    }

    pub fn client_options(&self) -> RealtimeClientOptions {
        RealtimeClientOptions {
            reconnect_base_delay: Duration::from_millis(self.reconnect.base_delay_ms),
            max_reconnect_attempts: self.reconnect.max_attempts,
            reconnect_on_transport_error: self.reconnect.on_transport_error,
            heartbeat_interval: self
                .heartbeat_interval_ms
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
        }
    }

    /// Token store backed by `token_file`, if one is configured
    pub fn token_store(&self) -> Option<FileTokenStore> {
        self.token_file.as_ref().map(FileTokenStore::new)
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            max_attempts: default_max_attempts(),
            on_transport_error: false,
        }
    }
}
