// Listeners module - typed observer registries per inbound event category
mod registry;

pub use registry::{ListenerRegistry, Subscription};

use crate::messaging::{ChannelUpdate, ChatMessage, ErrorEvent, TypingIndicator, WaitingChannel};

/// One registry per event category the client delivers
#[derive(Default)]
pub struct Listeners {
    pub message: ListenerRegistry<ChatMessage>,
    pub channel_updated: ListenerRegistry<ChannelUpdate>,
    pub typing: ListenerRegistry<TypingIndicator>,
    pub waiting_channel: ListenerRegistry<WaitingChannel>,
    pub error: ListenerRegistry<ErrorEvent>,
    pub connected: ListenerRegistry<()>,
    pub disconnected: ListenerRegistry<()>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }
}
