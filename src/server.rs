//! Connection accept loop
//!
//! One spawned session task per accepted TCP connection; a failing
//! session is logged and never affects the listener.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::SessionConfig;
use crate::handler::handle_connection;
use crate::manager::RaceManager;

/// Accept connections on `listener` until it fails
pub async fn serve(
    listener: TcpListener,
    manager: Arc<RaceManager>,
    config: Arc<SessionConfig>,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Race server listening on {}", addr);
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let manager = Arc::clone(&manager);
                let config = Arc::clone(&config);

                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, manager, config).await {
                        warn!("Connection from {} ended with error: {}", addr, e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
