//! Multiplayer Typing Race Library
//!
//! A WebSocket race server built with tokio-tungstenite, plus the
//! per-player typing state machine that feeds it.
//!
//! # Features
//! - Lazy race creation keyed by a `race_id` query parameter
//! - Plain text relay between all participants of a race
//! - One-shot race start with a start notice to every participant
//! - Late joiners rejected once a race has started
//! - Empty races evicted from the registry
//! - Typing progress with WPM and accuracy
//! - Word list passages and a SQLite leaderboard
//!
//! # Architecture
//! - `RaceManager` is a sharded registry of `Race`s shared by all sessions
//! - Each `Race` guards its participant set and `started` flag with its own lock
//! - Each connection runs one `handler` session task plus a writer task
//!   draining the connection's `Endpoint` channel
//!
//! # Example
//! ```ignore
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use typerace::{serve, RaceManager, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     let manager = Arc::new(RaceManager::new());
//!     serve(listener, manager, Arc::new(SessionConfig::default())).await
//! }
//! ```
//!
//! Clients connect to `ws://host:port/?race_id=R1`.
//!
//! # Client-side APIs
//! The server binary only uses the race modules. `typing`, `player`,
//! `words` and `leaderboard` are library APIs for a client: a terminal
//! front end decodes keys with `InputEvent::decode`, feeds them to a
//! `LocalPlayer`, draws from its `TypingProgress`, and may send each
//! `Effect::Progress` report to its race as a text frame.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod handler;
pub mod leaderboard;
pub mod manager;
pub mod message;
pub mod player;
pub mod race;
pub mod server;
pub mod types;
pub mod typing;
pub mod words;

// Re-export main types for convenience
pub use config::{ServerConfig, SessionConfig};
pub use endpoint::Endpoint;
pub use error::{AppError, LeaderboardError, SendError, WordListError};
pub use handler::handle_connection;
pub use leaderboard::{Leaderboard, LeaderboardEntry, SqliteLeaderboard};
pub use manager::{Admission, RaceManager};
pub use message::{ClientFrame, Outbound};
pub use player::LocalPlayer;
pub use race::{BroadcastReport, JoinOutcome, Race};
pub use server::serve;
pub use types::{ClientId, RaceId};
pub use typing::{Effect, InputEvent, Keystroke, TypingProgress};
pub use words::WordList;
