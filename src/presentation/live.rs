// Live dashboard over WebSocket - one DashboardSession per connection
use crate::application::session::{DashboardSession, PanelSkeleton, PanelUpdate};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    SelectCity { city: String },
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Connected { panels: Vec<PanelSkeleton> },
    PanelUpdate(PanelUpdate),
    Error { message: String },
}

/// WebSocket upgrade handler
pub async fn live_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let (mut session, mut updates) = DashboardSession::new(
        state.panel_service.clone(),
        state.streaming_service.panels(),
        state.view_timeout(),
    );

    let connected = ServerMessage::Connected {
        panels: session.skeleton(),
    };
    if send_json(&mut sender, &connected).await.is_err() {
        tracing::debug!("Live client left before the session started");
        return;
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let update_tx = tx.clone();
    let forward_task = tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            if update_tx.send(ServerMessage::PanelUpdate(update)).is_err() {
                break;
            }
        }
    });

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if send_json(&mut sender, &msg).await.is_err() {
                tracing::debug!("WebSocket send failed, closing connection");
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    if !handle_ws_message(&mut session, &tx, msg) {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "WebSocket receive error");
                    break;
                }
            }
        }
        // session dropped here, cancelling every panel still loading
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }
    forward_task.abort();
}

async fn send_json(
    sender: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), axum::Error> {
    match serde_json::to_string(msg) {
        Ok(text) => sender.send(Message::Text(text)).await,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize message");
            Ok(())
        }
    }
}

/// Returns false if the connection should be closed
fn handle_ws_message(
    session: &mut DashboardSession,
    tx: &mpsc::UnboundedSender<ServerMessage>,
    message: Message,
) -> bool {
    let reply = match message {
        Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
            Ok(client_msg) => apply_client_message(session, client_msg).err(),
            Err(e) => {
                tracing::debug!(error = %e, %text, "Invalid client message");
                Some(format!("Invalid message format: {}", e))
            }
        },
        Message::Binary(_) => Some("Binary messages not supported".to_string()),
        Message::Ping(_) | Message::Pong(_) => None,
        Message::Close(_) => {
            tracing::debug!("Client requested close");
            return false;
        }
    };

    match reply {
        Some(message) => tx.send(ServerMessage::Error { message }).is_ok(),
        None => true,
    }
}

fn apply_client_message(session: &mut DashboardSession, message: ClientMessage) -> Result<(), String> {
    match message {
        ClientMessage::SelectCity { city } => {
            let city = city.trim();
            if city.is_empty() {
                return Err("City name is required.".to_string());
            }
            session.select_city(city);
        }
        ClientMessage::Refresh => session.refresh(),
    }
    Ok(())
}
