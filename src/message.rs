//! Message protocol definitions
//!
//! The wire format is plain text frames with no envelope. The only frame
//! the server interprets is the start command; every other frame is
//! relayed verbatim to the rest of the race.

/// Default literal sent to every participant when a race starts
pub const DEFAULT_START_NOTICE: &str = "Race Started!";

/// Default frame a participant sends to start its race
pub const DEFAULT_START_COMMAND: &str = "/start";

/// Server → Client frame queued on an endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Text frame, delivered as-is
    Text(String),
    /// Close the connection after flushing queued frames
    Close,
}

/// Client → Server frame, decoded once at the session boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFrame {
    /// Request to start the sender's race
    Start,
    /// Anything else: broadcast to the race
    Relay(String),
}

impl ClientFrame {
    /// Decode an inbound text frame
    ///
    /// Only an exact match of `start_command` is a start request, so a
    /// frame that merely begins with it is still relayed.
    pub fn parse(text: String, start_command: &str) -> Self {
        if text == start_command {
            ClientFrame::Start
        } else {
            ClientFrame::Relay(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_command() {
        let frame = ClientFrame::parse("/start".to_string(), DEFAULT_START_COMMAND);
        assert_eq!(frame, ClientFrame::Start);
    }

    #[test]
    fn test_parse_relay() {
        let frame = ClientFrame::parse("42 wpm".to_string(), DEFAULT_START_COMMAND);
        assert_eq!(frame, ClientFrame::Relay("42 wpm".to_string()));
    }

    #[test]
    fn test_start_command_must_match_exactly() {
        let frame = ClientFrame::parse("/start now".to_string(), DEFAULT_START_COMMAND);
        assert_eq!(frame, ClientFrame::Relay("/start now".to_string()));

        let frame = ClientFrame::parse("go".to_string(), "go");
        assert_eq!(frame, ClientFrame::Start);
    }
}
