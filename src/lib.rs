//! # Storefront Realtime
//!
//! Realtime support-chat client for the storefront: one token-authenticated
//! WebSocket connection, typed inbound events delivered to listeners, and
//! reconnection with exponential backoff after the server closes the
//! connection.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use storefront_realtime::{MemoryTokenStore, RealtimeClient, RealtimeClientOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RealtimeClient::builder(
//!         "wss://shop.example.com/realtime",
//!         RealtimeClientOptions::default(),
//!     )?
//!     .token_store(Arc::new(MemoryTokenStore::with_token("your-jwt")))
//!     .build();
//!
//!     let _messages = client.on_message(|message| println!("{}", message.content));
//!     client.connect().await?;
//!     client.join_channel("support-42").await;
//!     client.send("support-42", "Hi, where is my order?").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod infrastructure;
pub mod listeners;
pub mod messaging;
pub mod types;
pub mod websocket;

pub use auth::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use client::{ConnectionState, RealtimeClient, RealtimeClientBuilder, RealtimeClientOptions};
pub use self::config::Settings;
pub use listeners::Subscription;
pub use messaging::{
    ChannelStatus, ChannelType, ChannelUpdate, ChatMessage, ControlKind, ErrorEvent, ErrorKind,
    TypingIndicator, WaitingChannel,
};
pub use types::{RealtimeError, RealtimeMessage, Result};
pub use websocket::{Connector, DisconnectReason, WebSocketFactory};
