use crate::types::{RealtimeError, RealtimeMessage, Result};
use crate::websocket::FrameSink;
use futures::SinkExt;
use tokio::sync::{Mutex, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

/// Holds the outbound half of the live connection and the published state.
///
/// State transitions are made by the client while it holds its own state
/// lock; this type only stores them.
pub struct ConnectionManager {
    sink: Mutex<Option<FrameSink>>,
    state: watch::Sender<ConnectionState>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            sink: Mutex::new(None),
            state,
        }
    }

    /// Sets the write sink (called after successful connection)
    pub async fn set_writer(&self, writer: FrameSink) {
        *self.sink.lock().await = Some(writer);
    }

    pub async fn has_writer(&self) -> bool {
        self.sink.lock().await.is_some()
    }

    /// Drops the writer without a close handshake (connection already gone)
    pub async fn clear_writer(&self) {
        *self.sink.lock().await = None;
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn set_state(&self, new_state: ConnectionState) {
        let previous = self.state.send_replace(new_state);
        if previous != new_state {
            tracing::debug!("Connection state {:?} -> {:?}", previous, new_state);
        }
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Sends a message through the live connection
    pub async fn send_message(&self, msg: RealtimeMessage) -> Result<()> {
        let mut sink = self.sink.lock().await;
        match sink.as_mut() {
            Some(sink) => sink.send(msg).await,
            None => Err(RealtimeError::NotConnected),
        }
    }

    /// Closes the connection gracefully and drops the writer
    pub async fn close(&self) -> Result<()> {
        let writer = self.sink.lock().await.take();
        if let Some(mut writer) = writer {
            writer.close().await?;
        }
        Ok(())
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
