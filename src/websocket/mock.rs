//! Scripted in-memory connector driving the client in tests.

use super::{Connector, DisconnectReason, TransportEvent, TransportLink};
use crate::types::{RealtimeError, RealtimeMessage, Result};
use async_trait::async_trait;
use futures::channel::mpsc as chan;
use futures::{SinkExt, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::Instant;
use url::Url;

/// How the next connection attempt ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Accept,
    Refuse,
    /// Never completes; exercises the connect timeout
    Hang,
    /// Accepts once the delay has passed
    AcceptAfter(std::time::Duration),
}

#[derive(Debug, Clone)]
pub(crate) struct Attempt {
    pub at: Instant,
    pub token: String,
}

/// Server end of one accepted connection
pub(crate) struct ServerHandle {
    frames: chan::UnboundedReceiver<RealtimeMessage>,
    events: chan::UnboundedSender<TransportEvent>,
}

impl ServerHandle {
    pub fn push(&self, event: &str, payload: serde_json::Value) {
        let _ = self
            .events
            .unbounded_send(TransportEvent::Message(RealtimeMessage::new(event, payload)));
    }

    pub fn close(&self, reason: DisconnectReason) {
        let _ = self.events.unbounded_send(TransportEvent::Closed(reason));
    }

    /// Next frame the client sent, if one is already queued
    pub fn try_frame(&mut self) -> Option<RealtimeMessage> {
        self.frames.try_recv().ok()
    }

    pub async fn next_frame(&mut self) -> Option<RealtimeMessage> {
        self.frames.next().await
    }
}

pub(crate) struct MockConnector {
    script: Mutex<VecDeque<Outcome>>,
    attempts: Mutex<Vec<Attempt>>,
    accepted: mpsc::UnboundedSender<ServerHandle>,
}

impl MockConnector {
    /// Unscripted attempts are refused
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<ServerHandle>) {
        let (accepted, accepted_rx) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            attempts: Mutex::new(Vec::new()),
            accepted,
        });
        (connector, accepted_rx)
    }

    pub fn script(&self, outcomes: impl IntoIterator<Item = Outcome>) {
        self.script.lock().unwrap().extend(outcomes);
    }

    pub fn attempts(&self) -> Vec<Attempt> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, _endpoint: &Url, token: &str) -> Result<TransportLink> {
        self.attempts.lock().unwrap().push(Attempt {
            at: Instant::now(),
            token: token.to_string(),
        });
        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Outcome::Refuse);

        match outcome {
            Outcome::Refuse => Err(RealtimeError::Connection("connection refused".to_string())),
            Outcome::Hang => futures::future::pending::<Result<TransportLink>>().await,
            Outcome::AcceptAfter(delay) => {
                tokio::time::sleep(delay).await;
                Ok(self.accept())
            }
            Outcome::Accept => Ok(self.accept()),
        }
    }
}

impl MockConnector {
    fn accept(&self) -> TransportLink {
        let (frame_tx, frame_rx) = chan::unbounded();
        let (event_tx, event_rx) = chan::unbounded();
        let _ = self.accepted.send(ServerHandle {
            frames: frame_rx,
            events: event_tx,
        });

        TransportLink {
            sink: Box::pin(frame_tx.sink_map_err(|e| RealtimeError::Connection(e.to_string()))),
            events: Box::pin(event_rx),
        }
    }
}
