// WebSocket module - transport seam between the client and the network
mod factory;
#[cfg(test)]
pub(crate) mod mock;

pub use factory::WebSocketFactory;

use crate::types::{RealtimeError, RealtimeMessage, Result};
use async_trait::async_trait;
use futures::Sink;
use futures::stream::BoxStream;
use std::pin::Pin;
use url::Url;

/// Outbound half of a live connection
pub type FrameSink = Pin<Box<dyn Sink<RealtimeMessage, Error = RealtimeError> + Send>>;

/// Inbound half of a live connection
pub type FrameStream = BoxStream<'static, TransportEvent>;

/// Why a live connection ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The server closed the connection on purpose (close frame)
    ServerDisconnect,
    /// The stream ended without a close frame
    TransportClose,
    /// Read error on the socket
    TransportError(String),
    /// No `pong` arrived for the previous heartbeat probe
    PingTimeout,
}

impl DisconnectReason {
    /// Whether this loss schedules a reconnect. Only a server-initiated
    /// close does, unless transport losses are opted in.
    pub fn should_reconnect(&self, on_transport_error: bool) -> bool {
        match self {
            Self::ServerDisconnect => true,
            Self::TransportClose | Self::TransportError(_) | Self::PingTimeout => {
                on_transport_error
            }
        }
    }
}

impl std::fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ServerDisconnect => write!(f, "server disconnect"),
            Self::TransportClose => write!(f, "transport close"),
            Self::TransportError(e) => write!(f, "transport error: {}", e),
            Self::PingTimeout => write!(f, "ping timeout"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Message(RealtimeMessage),
    Closed(DisconnectReason),
}

/// A freshly opened connection
pub struct TransportLink {
    pub sink: FrameSink,
    pub events: FrameStream,
}

/// Opens authenticated connections to the realtime endpoint
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &Url, token: &str) -> Result<TransportLink>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_server_disconnect_reconnects_by_default() {
        assert!(DisconnectReason::ServerDisconnect.should_reconnect(false));
        assert!(!DisconnectReason::TransportClose.should_reconnect(false));
        assert!(!DisconnectReason::TransportError("reset".into()).should_reconnect(false));
        assert!(!DisconnectReason::PingTimeout.should_reconnect(false));
    }

    #[test]
    fn test_transport_losses_reconnect_when_opted_in() {
        assert!(DisconnectReason::TransportClose.should_reconnect(true));
        assert!(DisconnectReason::PingTimeout.should_reconnect(true));
    }
}
