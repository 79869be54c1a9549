// Messaging module - Event names, typed payloads and message routing
pub mod event;
pub mod payload;
pub mod router;

pub use event::{ClientEvent, ControlKind, ServerEvent};
pub use payload::{
    ChannelStatus, ChannelType, ChannelUpdate, ChatMessage, ErrorEvent, ErrorKind,
    TypingIndicator, WaitingChannel,
};
pub use router::MessageRouter;
