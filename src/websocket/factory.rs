use super::{Connector, DisconnectReason, TransportEvent, TransportLink};
use crate::types::{RealtimeError, RealtimeMessage, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt, future};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::{HeaderValue, header::AUTHORIZATION};
use tokio_tungstenite::tungstenite::{self, Message};
use url::Url;

/// WebSocket factory for creating authenticated connections
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketFactory;

impl WebSocketFactory {
    pub fn new() -> Self {
        Self
    }

    /// Handshake request carrying the bearer token
    fn build_request(endpoint: &Url, token: &str) -> Result<Request> {
        let mut request = endpoint.as_str().into_client_request()?;
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| RealtimeError::Connection(format!("invalid auth token: {}", e)))?;
        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(request)
    }
}

#[async_trait]
impl Connector for WebSocketFactory {
    async fn connect(&self, endpoint: &Url, token: &str) -> Result<TransportLink> {
        let request = Self::build_request(endpoint, token)?;
        tracing::debug!("Creating WebSocket connection to: {}", endpoint);

        let (ws_stream, _response) = connect_async(request).await?;
        let (write_half, read_half) = ws_stream.split();

        let sink = write_half
            .sink_map_err(RealtimeError::from)
            .with(encode_frame);
        let events = read_half.filter_map(|msg| future::ready(decode_frame(msg)));

        Ok(TransportLink {
            sink: Box::pin(sink),
            events: Box::pin(events),
        })
    }
}

fn encode_frame(message: RealtimeMessage) -> future::Ready<Result<Message>> {
    future::ready(
        serde_json::to_string(&message)
            .map(|json| Message::Text(json.into()))
            .map_err(RealtimeError::from),
    )
}

fn decode_frame(msg: std::result::Result<Message, tungstenite::Error>) -> Option<TransportEvent> {
    match msg {
        Ok(Message::Text(text)) => {
            tracing::debug!("Received text message: {}", text.as_str());
            match serde_json::from_str::<RealtimeMessage>(&text) {
                Ok(message) => Some(TransportEvent::Message(message)),
                Err(e) => {
                    tracing::error!("Failed to parse message: {} - Raw: {}", e, text.as_str());
                    None
                }
            }
        }
        Ok(Message::Close(frame)) => {
            if let Some(close_frame) = frame {
                tracing::warn!(
                    "Server closed connection: code={:?}, reason='{}'",
                    close_frame.code,
                    close_frame.reason.as_str()
                );
            } else {
                tracing::warn!("Server closed connection without close frame");
            }
            Some(TransportEvent::Closed(DisconnectReason::ServerDisconnect))
        }
        Ok(Message::Ping(data)) => {
            tracing::debug!("Received ping ({} bytes)", data.len());
            None
        }
        Ok(Message::Pong(data)) => {
            tracing::debug!("Received pong ({} bytes)", data.len());
            None
        }
        Ok(Message::Binary(data)) => {
            tracing::warn!("Received unexpected binary message ({} bytes)", data.len());
            None
        }
        Ok(Message::Frame(_)) => {
            tracing::debug!("Received raw frame (internal)");
            None
        }
        Err(e) => {
            tracing::error!("WebSocket read error: {}", e);
            Some(TransportEvent::Closed(DisconnectReason::TransportError(
                e.to_string(),
            )))
        }
    }
}
