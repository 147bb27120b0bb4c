//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a WebSocket connection.
//! Each connection owns one workflow controller; the receive loop serializes
//! commands, so at most one AI call is ever in flight per session.

use crate::web::{
    protocol::{ClientMessage, ServerMessage},
    state::AppState,
    workflow::WorkflowController,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use std::sync::Arc;
use tracing::{info, warn};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    info!("New WebSocket connection established");

    let (mut sender, mut receiver) = socket.split();
    let mut controller = app_state.new_workflow();

    // Greet the client with the dashboard state.
    if send_state(&mut sender, &controller).await.is_err() {
        warn!("Client disconnected before the initial state was sent");
        return;
    }

    while let Some(Ok(message)) = receiver.next().await {
        let Message::Text(text) = message else {
            continue;
        };
        let command = match serde_json::from_str::<ClientMessage>(&text) {
            Ok(command) => command,
            Err(e) => {
                warn!("Ignoring unparseable client message: {}", e);
                continue;
            }
        };

        match command {
            ClientMessage::CreateNew => controller.create_new(),
            ClientMessage::SubmitInput { text } => {
                if controller.submit_input(&text) {
                    // Show the analyzing stage while the call is in flight.
                    if send_state(&mut sender, &controller).await.is_err() {
                        return;
                    }
                    controller.run_analysis().await;
                }
            }
            ClientMessage::PickSuggestion { index } => {
                if controller.pick_suggestion(index) {
                    // Show the generating stage while the call is in flight.
                    if send_state(&mut sender, &controller).await.is_err() {
                        return;
                    }
                    controller.run_generation().await;
                }
            }
            ClientMessage::SaveScript { title, content } => {
                if let Some(id) = controller.save_script(&title, &content) {
                    let ack = ServerMessage::ScriptSaved { id };
                    if send_message(&mut sender, &ack).await.is_err() {
                        return;
                    }
                }
            }
            ClientMessage::ViewSaved { id } => controller.view_saved(id),
            ClientMessage::Reset => controller.reset(),
        }

        if send_state(&mut sender, &controller).await.is_err() {
            return;
        }
    }

    info!("WebSocket connection closed");
}

async fn send_state(
    sender: &mut SplitSink<WebSocket, Message>,
    controller: &WorkflowController,
) -> Result<(), axum::Error> {
    let message = ServerMessage::from_snapshot(&controller.snapshot());
    send_message(sender, &message).await
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(message).unwrap();
    sender.send(Message::Text(json.into())).await
}
