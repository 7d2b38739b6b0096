//! Leaderboard storage
//!
//! The race layer only needs `record` and `top_entries`; the SQLite
//! implementation keeps scores in a single append-only table.

use std::path::Path;

use rusqlite::{params, Connection};

use crate::error::LeaderboardError;

/// Entries shown on the results screen
pub const DEFAULT_TOP_ENTRIES: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub wpm: u32,
    pub accuracy: f64,
}

/// Score store used at race completion and on the results screen
pub trait Leaderboard {
    fn record(&self, name: &str, wpm: u32, accuracy: f64) -> Result<(), LeaderboardError>;

    /// Best `n` entries by WPM, then accuracy, both descending
    fn top_entries(&self, n: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;
}

#[derive(Debug)]
pub struct SqliteLeaderboard {
    conn: Connection,
}

impl SqliteLeaderboard {
    /// Open (creating if needed) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LeaderboardError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, LeaderboardError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, LeaderboardError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS leaderboard (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                wpm INTEGER NOT NULL,
                accuracy REAL NOT NULL,
                date TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_leaderboard_rank ON leaderboard(wpm DESC, accuracy DESC)",
            [],
        )?;

        Ok(Self { conn })
    }
}

impl Leaderboard for SqliteLeaderboard {
    fn record(&self, name: &str, wpm: u32, accuracy: f64) -> Result<(), LeaderboardError> {
        self.conn.execute(
            "INSERT INTO leaderboard (name, wpm, accuracy) VALUES (?1, ?2, ?3)",
            params![name, wpm, accuracy],
        )?;
        Ok(())
    }

    fn top_entries(&self, n: usize) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, wpm, accuracy FROM leaderboard
             ORDER BY wpm DESC, accuracy DESC
             LIMIT ?1",
        )?;

        let limit = i64::try_from(n).unwrap_or(i64::MAX);
        let rows = stmt.query_map([limit], |row| {
            Ok(LeaderboardEntry {
                name: row.get(0)?,
                wpm: row.get(1)?,
                accuracy: row.get(2)?,
            })
        })?;

        let entries = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
