use std::sync::Arc;
use storefront_realtime::{
    ConnectionState, ControlKind, MemoryTokenStore, RealtimeClient, Settings, TokenStore,
};
use tracing_subscriber::EnvFilter;

/// Joins a support channel and prints everything the server sends.
///
/// Reads settings from `config/realtime` and `REALTIME__*` variables. The
/// token comes from `REALTIME__TOKEN_FILE`, or `REALTIME_TOKEN` when no file
/// is configured.
///
/// ```text
/// REALTIME__ENDPOINT=ws://localhost:8080/ws REALTIME_TOKEN=jwt \
///     cargo run --example support_chat -- support-42
/// ```
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::load()?;
    let channel_id = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "support-demo".to_string());

    let tokens: Arc<dyn TokenStore> = match settings.token_store() {
        Some(store) => Arc::new(store),
        None => {
            let token = std::env::var("REALTIME_TOKEN").unwrap_or_default();
            Arc::new(MemoryTokenStore::with_token(token))
        }
    };

    println!("📡 Connecting to: {}\n", settings.endpoint);

    let client = RealtimeClient::builder(&settings.endpoint, settings.client_options())?
        .token_store(tokens)
        .build();

    let _message = client.on_message(|message| {
        let who = if message.is_from_user { "you" } else { "agent" };
        println!("💬 [{}] {}: {}", message.channel_id, who, message.content);
    });
    let _updated = client.on_channel_updated(|update| {
        println!(
            "🔄 Channel {} is now {:?} ({:?})",
            update.channel_id, update.status, update.channel_type
        );
    });
    let _typing = client.on_typing(|typing| {
        if typing.is_typing {
            println!("✍️  Someone is typing in {}...", typing.channel_id);
        }
    });
    let _waiting = client.on_waiting_channel(|waiting| {
        println!(
            "⏳ {} is waiting for an agent in {}",
            waiting.requester_id, waiting.channel_id
        );
    });
    let _error = client.on_error(|error| eprintln!("❌ {:?}: {}", error.kind, error.message));
    let _connected = client.on_connected(|| println!("✅ Connected"));
    let _disconnected = client.on_disconnected(|| println!("⚠️  Disconnected"));

    client.connect().await?;
    client.join_channel(&channel_id).await;

    // Rejoin the channel after every reconnect
    let watcher = client.clone();
    let rejoin_channel = channel_id.clone();
    let mut states = client.state_changes();
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = *states.borrow_and_update();
            if state == ConnectionState::Connected {
                watcher.join_channel(&rejoin_channel).await;
            }
        }
    });

    client.send(&channel_id, "Hi, I need help with my order").await?;
    client.emit_control(ControlKind::SwitchToHuman, &channel_id).await;

    println!("\nPress Ctrl+C to leave the chat\n");
    tokio::signal::ctrl_c().await?;

    client.emit_control(ControlKind::MarkRead, &channel_id).await;
    client.disconnect().await;
    println!("👋 Bye");

    Ok(())
}
