/// Events emitted by the client (magic strings layer)
pub mod client_events {
    pub const JOIN_CHANNEL: &str = "join_channel";
    pub const SEND_MESSAGE: &str = "send_message";
    pub const SWITCH_TO_HUMAN: &str = "switch_to_human";
    pub const SWITCH_TO_BOT: &str = "switch_to_bot";
    pub const MARK_AS_READ: &str = "mark_as_read";
    pub const PING: &str = "ping";
}

/// Events pushed by the server (magic strings layer)
pub mod server_events {
    pub const NEW_MESSAGE: &str = "new_message";
    pub const CHANNEL_UPDATED: &str = "channel_updated";
    pub const TYPING: &str = "typing";
    pub const NEW_WAITING_CHANNEL: &str = "new_waiting_channel";
    pub const PONG: &str = "pong";
    pub const ERROR: &str = "error";
}

/// Token store key holding the bearer token
pub const AUTH_TOKEN_KEY: &str = "token";

/// Default connect timeout (milliseconds)
pub const DEFAULT_TIMEOUT: u64 = 10000;

/// Default base delay of the reconnect backoff (milliseconds)
pub const DEFAULT_RECONNECT_BASE_DELAY: u64 = 1000;

/// Default number of reconnect attempts before giving up
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;
