//! WebSocket connection handler
//!
//! Handles individual client connections: WebSocket handshake, route
//! selection, and the read loop that feeds text frames to the active
//! session or to the root shell.

use futures_util::{SinkExt, Stream, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::connection::Connection;
use crate::error::AppError;
use crate::server::ChatHub;
use crate::session::Session;
use crate::shell::{self, Route, ShellCommand};
use crate::types::SessionId;

/// Outbound buffer per connection
const OUTBOUND_BUFFER_SIZE: usize = 32;

/// Handle a new TCP connection
///
/// Performs the WebSocket handshake, starts the write task, and runs the
/// read loop until the client goes away or types `exit` in the shell.
pub async fn handle_connection(stream: TcpStream, hub: ChatHub) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!("New TCP connection from {}", peer_addr);

    // WebSocket handshake, remembering the request path for routing
    let mut route = Route::Shell;
    let ws_stream = tokio_tungstenite::accept_hdr_async(
        stream,
        |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            let path = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/");
            route = Route::from_path(path);
            Ok(response)
        },
    )
    .await?;
    let (mut ws_sender, ws_receiver) = ws_stream.split();

    let id = SessionId::new();
    info!("Connection {} from {} routed to {:?}", id, peer_addr, route);

    // Channel for hub -> client text
    let (msg_tx, mut msg_rx) = mpsc::channel::<String>(OUTBOUND_BUFFER_SIZE);
    let connection = Connection::new(id, msg_tx);

    // Spawn write task (text -> WebSocket)
    let write_task = tokio::spawn(async move {
        while let Some(text) = msg_rx.recv().await {
            if ws_sender.send(Message::Text(text.into())).await.is_err() {
                debug!("WebSocket send failed, ending write task");
                break;
            }
        }
        debug!("Write task ended for {}", id);

        // Send close frame when done
        let _ = ws_sender.close().await;
    });

    let mut active: Option<Session> = None;
    let result = run(&hub, &connection, route, ws_receiver, &mut active).await;

    // Guaranteed release, whatever ended the read loop
    if let Some(mut session) = active.take() {
        session.close().await;
    }

    // Dropping the last sender ends the write task
    drop(connection);
    if let Err(e) = write_task.await {
        error!("Write task for {} panicked: {}", id, e);
    }

    info!("Connection {} closed", id);
    result
}

/// Read loop
///
/// Text frames go to the active session if there is one, to the shell
/// otherwise. Returns when the client disconnects or exits.
async fn run<S>(
    hub: &ChatHub,
    connection: &Connection,
    route: Route,
    mut ws_receiver: S,
    active: &mut Option<Session>,
) -> Result<(), AppError>
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    let id = connection.id;

    if !enter(hub, connection, &route, active).await? {
        connection.send_text(shell::SHELL_HELP).await?;
    }

    while let Some(msg_result) = ws_receiver.next().await {
        match msg_result {
            Ok(Message::Text(text)) => {
                if let Some(session) = active.as_mut() {
                    session.handle_text(&text).await?;
                    if connection.take_redirect() {
                        info!("Connection {} returning to the shell", id);
                        if let Some(mut session) = active.take() {
                            session.close().await;
                        }
                        connection.send_text(shell::SHELL_HELP).await?;
                    }
                    continue;
                }

                match ShellCommand::parse(&text) {
                    ShellCommand::Enter(route) => {
                        enter(hub, connection, &route, active).await?;
                    }
                    ShellCommand::Help => connection.send_text(shell::SHELL_HELP).await?,
                    ShellCommand::Exit => {
                        debug!("Connection {} exited from the shell", id);
                        break;
                    }
                    ShellCommand::Empty => {}
                    ShellCommand::Unknown(input) => {
                        connection.send_text(shell::unknown_command(&input)).await?
                    }
                }
            }
            Ok(Message::Binary(data)) => match active.as_ref() {
                Some(session) => {
                    if let Err(e) = session.handle_binary(&data) {
                        error!("Connection {} sent a binary frame: {}", id, e);
                        return Err(e);
                    }
                }
                None => warn!("Ignoring binary frame from {} in the shell", id),
            },
            Ok(Message::Close(_)) => {
                debug!("Connection {} sent close frame", id);
                break;
            }
            Ok(Message::Ping(_)) => {
                // Pong is handled automatically by tungstenite
                debug!("Ping from {}", id);
            }
            Ok(Message::Pong(_)) => {
                debug!("Pong from {}", id);
            }
            Ok(_) => {
                // Raw frames - ignore
            }
            Err(e) => {
                error!("WebSocket error for {}: {}", id, e);
                break;
            }
        }
    }

    debug!("Read loop ended for {}", id);
    Ok(())
}

/// Open the session for `route`
///
/// Returns false if the route is the shell itself.
async fn enter(
    hub: &ChatHub,
    connection: &Connection,
    route: &Route,
    active: &mut Option<Session>,
) -> Result<bool, AppError> {
    let Some(session) = hub.session_for(route, connection.clone()) else {
        return Ok(false);
    };
    info!("Connection {} entering {} session", connection.id, session.kind());

    // Stored before opening so a failed open is still closed by the caller
    let session = active.insert(session);
    session.open().await?;
    Ok(true)
}
