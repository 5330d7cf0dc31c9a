//! WebSocket Session Hub Library
//!
//! Hosts interactive, connection-backed text sessions over WebSocket,
//! built with tokio-tungstenite.
//!
//! # Features
//! - Shared chat room with case-insensitively unique display names
//! - Join, leave and rename notices broadcast to every member
//! - `@bot` messages answered by an external chatbot service
//! - One-to-one chatbot sessions
//! - A root shell that connections return to on `quit`
//!
//! # Architecture
//! - `ChatHub` is constructed once and cloned into every connection task
//! - Each connection has a `handler` task running at most one `Session`
//! - Room sessions share one `SessionRegistry`; its lock is held only for
//!   membership changes and snapshots, never across network calls
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use chat_hub::{handle_connection, ChatHub, Config};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().unwrap();
//!     let listener = TcpListener::bind(&config.bind_addr).await.unwrap();
//!     let hub = ChatHub::new(config.chatbot).unwrap();
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         tokio::spawn(handle_connection(stream, hub.clone()));
//!     }
//! }
//! ```

pub mod broadcast;
pub mod config;
pub mod connection;
pub mod error;
pub mod gateway;
pub mod handler;
pub mod message;
pub mod names;
pub mod registry;
pub mod server;
pub mod session;
pub mod shell;
pub mod types;

// Re-export main types for convenience
pub use broadcast::broadcast;
pub use config::{ChatbotConfig, Config};
pub use connection::Connection;
pub use error::{AppError, SendError};
pub use gateway::{Chatbot, ChatbotGateway, GatewaySettings, FALLBACK_REPLY};
pub use handler::handle_connection;
pub use message::Input;
pub use names::resolve_name;
pub use registry::{Member, Renamed, SessionRegistry};
pub use server::{ChatHub, ChatbotFactory};
pub use session::{RoomSession, Session, SoloSession};
pub use shell::{Route, ShellCommand};
pub use types::{SessionId, SessionKind, SessionState};
