use super::{ErrorEvent, ServerEvent};
use crate::listeners::{ListenerRegistry, Listeners};
use crate::types::message::RealtimeMessage;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Routes incoming messages to the listeners of their category
pub struct MessageRouter {
    listeners: Arc<Listeners>,
}

impl MessageRouter {
    pub fn new(listeners: Arc<Listeners>) -> Self {
        Self { listeners }
    }

    /// Delivers a message and returns the event it carried, so the session
    /// can react to `pong`.
    pub fn route(&self, message: RealtimeMessage) -> ServerEvent {
        let event = ServerEvent::parse(&message.event);
        tracing::debug!("Routing message: event={}", event);

        match &event {
            ServerEvent::NewMessage => {
                Self::deliver(&self.listeners.message, &event, message.payload)
            }
            ServerEvent::ChannelUpdated => {
                Self::deliver(&self.listeners.channel_updated, &event, message.payload)
            }
            ServerEvent::Typing => Self::deliver(&self.listeners.typing, &event, message.payload),
            ServerEvent::NewWaitingChannel => {
                Self::deliver(&self.listeners.waiting_channel, &event, message.payload)
            }
            ServerEvent::Error => {
                let error = ErrorEvent::from_server_payload(message.payload);
                tracing::warn!("Server reported error: {}", error.message);
                self.listeners.error.emit(&error);
            }
            ServerEvent::Pong => {
                tracing::debug!("Received pong");
            }
            ServerEvent::Unknown(name) => {
                tracing::debug!("Ignoring unknown event '{}'", name);
            }
        }

        event
    }

    fn deliver<T>(registry: &ListenerRegistry<T>, event: &ServerEvent, payload: Value)
    where
        T: DeserializeOwned + 'static,
    {
        match serde_json::from_value::<T>(payload) {
            Ok(typed) => registry.emit(&typed),
            Err(e) => {
                tracing::warn!("Dropping malformed '{}' payload: {}", event, e);
            }
        }
    }
}
