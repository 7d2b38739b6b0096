//! WebSocket connection handler
//!
//! One race session per connection: handshake with the race id taken from
//! the query string, join, relay every inbound frame to the rest of the
//! race, and leave when the transport reports an error or closure.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::endpoint::Endpoint;
use crate::error::AppError;
use crate::manager::{Admission, RaceManager};
use crate::message::{ClientFrame, Outbound};
use crate::types::{ClientId, RaceId, RACE_ID_PARAM};

/// Handle a new TCP connection
///
/// Nothing in the registry is touched until the handshake succeeds. A
/// connection for a race that has already started is closed straight away.
pub async fn handle_connection(
    stream: TcpStream,
    manager: Arc<RaceManager>,
    config: Arc<SessionConfig>,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!("New TCP connection from {}", peer_addr);

    // WebSocket handshake, capturing the race id on the way
    let mut requested: Option<RaceId> = None;
    let ws_stream = tokio_tungstenite::accept_hdr_async(
        stream,
        |request: &Request, response: Response| {
            match request.uri().query().and_then(RaceId::from_query) {
                Some(race_id) => {
                    requested = Some(race_id);
                    Ok(response)
                }
                None => Err(missing_race_id()),
            }
        },
    )
    .await?;

    let Some(race_id) = requested else {
        return Ok(());
    };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let client_id = ClientId::new();
    let (endpoint, mut outbound_rx) = Endpoint::channel(client_id);

    let race = match manager.join(&race_id, endpoint.clone()).await {
        Admission::Joined(race) => race,
        Admission::AlreadyStarted => {
            info!(
                "Race {} already started, rejecting client {} from {}",
                race_id, client_id, peer_addr
            );
            let _ = ws_sender.close().await;
            return Ok(());
        }
    };

    info!(
        "Client {} from {} joined race {}",
        client_id, peer_addr, race_id
    );

    // Spawn write task (Outbound -> WebSocket)
    let write_task = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            match frame {
                Outbound::Text(text) => {
                    if ws_sender.send(Message::Text(text.into())).await.is_err() {
                        debug!("WebSocket send failed, ending write task");
                        break;
                    }
                }
                Outbound::Close => break,
            }
        }

        let _ = ws_sender.close().await;
    });

    // Receive loop: a receive error is terminal, never retried
    while let Some(msg_result) = ws_receiver.next().await {
        match msg_result {
            Ok(Message::Text(text)) => {
                match ClientFrame::parse(text.to_string(), &config.start_command) {
                    ClientFrame::Start => {
                        manager.start(&race.id, &config.start_notice).await;
                    }
                    ClientFrame::Relay(payload) => {
                        let report = manager
                            .broadcast(&race, &payload, client_id, config.echo_to_sender)
                            .await;
                        if report.failed > 0 {
                            debug!(
                                "Relay from {} in race {}: {} delivered, {} failed",
                                client_id, race.id, report.delivered, report.failed
                            );
                        }
                    }
                }
            }
            Ok(Message::Close(_)) => {
                debug!("Client {} sent close frame", client_id);
                break;
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                // Pong is handled automatically by tungstenite
            }
            Ok(_) => {
                debug!("Ignoring non-text frame from {}", client_id);
            }
            Err(e) => {
                warn!("Client {} communication error, disconnecting: {}", client_id, e);
                break;
            }
        }
    }

    manager.leave(&race, client_id).await;

    endpoint.close();
    drop(endpoint);
    if let Err(e) = write_task.await {
        warn!("Write task for {} failed: {}", client_id, e);
    }

    info!("Client {} disconnected from race {}", client_id, race_id);

    Ok(())
}

fn missing_race_id() -> ErrorResponse {
    let mut response = ErrorResponse::new(Some(format!(
        "missing {} query parameter",
        RACE_ID_PARAM
    )));
    *response.status_mut() = StatusCode::BAD_REQUEST;
    response
}
