//! Error types for the race server
//!
//! Transport errors end a single connection; collaborator errors
//! (leaderboard, word list) are reported to the caller and logged.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Connection-level errors
///
/// Any of these terminates the session that hit it, never the process.
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket handshake or protocol error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Message send errors
///
/// Occurs when the writer half of an endpoint has already shut down.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The client has stopped draining its queue
    #[error("Queue full")]
    QueueFull,
}

/// Leaderboard storage errors
#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Word list loading and selection errors
#[derive(Debug, Error)]
pub enum WordListError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid word list: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Word list is empty")]
    Empty,

    /// Selection without replacement cannot satisfy the request
    #[error("Requested {requested} words but only {available} are available")]
    NotEnoughWords { requested: usize, available: usize },
}
