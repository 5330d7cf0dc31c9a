//! WebSocket Session Hub - Entry Point
//!
//! Loads configuration, starts the TCP listener and accepts connections.

use std::env;

use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use chat_hub::{handle_connection, ChatHub, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=chat_hub=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chat_hub=info")),
        )
        .init();

    let mut config = Config::from_env()?;

    // Bind address from command line overrides the environment
    if let Some(addr) = env::args().nth(1) {
        config.bind_addr = addr;
    }

    if config.chatbot.api_key.is_none() {
        warn!("CHATBOT_API_KEY not set, chatbot will only give fallback replies");
    }

    // Start TCP listener
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("WebSocket Session Hub listening on {}", config.bind_addr);

    let hub = ChatHub::new(config.chatbot)?;

    // Connection accept loop
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let hub = hub.clone();

                // Spawn handler task for each connection
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, hub).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
