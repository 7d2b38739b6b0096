//! Basic type definitions for the race server
//!
//! Provides newtype wrappers for type safety:
//! - `ClientId`: UUID-based unique connection identifier
//! - `RaceId`: caller-supplied opaque race identifier

use percent_encoding::percent_decode_str;
use uuid::Uuid;

/// Query parameter carrying the race identifier on the join request
pub const RACE_ID_PARAM: &str = "race_id";

/// Unique client identifier (newtype pattern)
///
/// Wraps a UUID v4 so every connection gets a distinct key in a race's
/// participant set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub Uuid);

impl ClientId {
    /// Create a new random client ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Race identifier
///
/// Opaque and case-sensitive; the registry uses it verbatim as its key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RaceId(pub String);

impl RaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Extract the race id from a request query string (`a=1&race_id=R1`)
    ///
    /// The value is form-decoded (`+` and `%20` are both spaces). Returns
    /// None when the parameter is absent, empty, or not valid UTF-8.
    pub fn from_query(query: &str) -> Option<Self> {
        let raw = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == RACE_ID_PARAM)
            .map(|(_, value)| value.replace('+', " "))?;

        let value = percent_decode_str(&raw).decode_utf8().ok()?;
        if value.is_empty() {
            return None;
        }
        Some(Self::new(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RaceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl std::fmt::Display for RaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
