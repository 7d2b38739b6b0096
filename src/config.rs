//! Server configuration
//!
//! Command line options for the binary, and the per-session subset every
//! connection task receives.

use clap::Parser;

use crate::message::{DEFAULT_START_COMMAND, DEFAULT_START_NOTICE};

/// Default server address
pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Multiplayer typing race server
#[derive(Debug, Clone, Parser)]
#[command(name = "typerace", version, about)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(default_value = DEFAULT_ADDR)]
    pub addr: String,

    /// Also deliver relayed frames back to their sender
    #[arg(long)]
    pub echo: bool,

    /// Text frame a participant sends to start its race
    #[arg(long, default_value = DEFAULT_START_COMMAND)]
    pub start_command: String,

    /// Text frame sent to every participant when a race starts
    #[arg(long, default_value = DEFAULT_START_NOTICE)]
    pub start_notice: String,
}

impl ServerConfig {
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            echo_to_sender: self.echo,
            start_command: self.start_command.clone(),
            start_notice: self.start_notice.clone(),
        }
    }
}

/// Settings shared by all connection handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub echo_to_sender: bool,
    pub start_command: String,
    pub start_notice: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            echo_to_sender: false,
            start_command: DEFAULT_START_COMMAND.to_string(),
            start_notice: DEFAULT_START_NOTICE.to_string(),
        }
    }
}
