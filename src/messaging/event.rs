use crate::types::constants::{client_events, server_events};

/// Events the client emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientEvent {
    JoinChannel,
    SendMessage,
    SwitchToHuman,
    SwitchToBot,
    MarkAsRead,
    Ping,
}

impl ClientEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JoinChannel => client_events::JOIN_CHANNEL,
            Self::SendMessage => client_events::SEND_MESSAGE,
            Self::SwitchToHuman => client_events::SWITCH_TO_HUMAN,
            Self::SwitchToBot => client_events::SWITCH_TO_BOT,
            Self::MarkAsRead => client_events::MARK_AS_READ,
            Self::Ping => client_events::PING,
        }
    }
}

impl std::fmt::Display for ClientEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Events pushed by the server
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServerEvent {
    NewMessage,
    ChannelUpdated,
    Typing,
    NewWaitingChannel,
    Pong,
    Error,
    /// Anything this client does not know about
    Unknown(String),
}

impl ServerEvent {
    /// Parse a string into a ServerEvent
    pub fn parse(s: &str) -> Self {
        match s {
            server_events::NEW_MESSAGE => Self::NewMessage,
            server_events::CHANNEL_UPDATED => Self::ChannelUpdated,
            server_events::TYPING => Self::Typing,
            server_events::NEW_WAITING_CHANNEL => Self::NewWaitingChannel,
            server_events::PONG => Self::Pong,
            server_events::ERROR => Self::Error,
            _ => Self::Unknown(s.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::NewMessage => server_events::NEW_MESSAGE,
            Self::ChannelUpdated => server_events::CHANNEL_UPDATED,
            Self::Typing => server_events::TYPING,
            Self::NewWaitingChannel => server_events::NEW_WAITING_CHANNEL,
            Self::Pong => server_events::PONG,
            Self::Error => server_events::ERROR,
            Self::Unknown(s) => s,
        }
    }
}

impl From<&str> for ServerEvent {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl std::fmt::Display for ServerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Conversation control signals an agent or customer can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// Hand the conversation over to a human agent
    SwitchToHuman,
    /// Hand the conversation back to the bot
    SwitchToBot,
    /// Mark the conversation as read
    MarkRead,
}

impl From<ControlKind> for ClientEvent {
    fn from(kind: ControlKind) -> Self {
        match kind {
            ControlKind::SwitchToHuman => ClientEvent::SwitchToHuman,
            ControlKind::SwitchToBot => ClientEvent::SwitchToBot,
            ControlKind::MarkRead => ClientEvent::MarkAsRead,
        }
    }
}
