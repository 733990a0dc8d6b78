//! Dashboard viewer WebSocket endpoint
//!
//! Each upgraded socket gets a fresh viewer id and a bounded outbound queue
//! in the shared `ChannelTransport`. A writer task drains the queue into the
//! socket; when it stops, later deliveries are terminal and the dispatcher
//! evicts the viewer.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::AppState;

/// GET /ws
pub async fn viewer_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_viewer(socket, state))
}

async fn handle_viewer(socket: WebSocket, state: AppState) {
    let viewer_id = Uuid::new_v4().to_string();
    let Some(mut outbox) = attach_viewer(&state, &viewer_id) else {
        return;
    };

    let (mut sink, mut stream) = socket.split();

    let writer_id = viewer_id.clone();
    let mut writer = tokio::spawn(async move {
        while let Some(text) = outbox.recv().await {
            if let Err(e) = sink.send(Message::Text(text)).await {
                debug!("Viewer {} socket closed while sending: {}", writer_id, e);
                break;
            }
        }
    });

    loop {
        tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    state.sessions.on_message(&viewer_id, &text).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("Viewer {} socket error: {}", viewer_id, e);
                    break;
                }
            },
            _ = &mut writer => break,
        }
    }

    detach_viewer(&state, &viewer_id);
    writer.abort();
}

/// Open the viewer's outbound queue, then register it
///
/// The queue must exist before registration: a broadcast that snapshots the
/// registry in between would otherwise find no queue and evict the viewer.
/// Returns `None` (with the queue closed again) if registration fails.
pub fn attach_viewer(state: &AppState, viewer_id: &str) -> Option<mpsc::Receiver<String>> {
    let outbox = state.transport.open(viewer_id, state.outbound_buffer);

    if state.sessions.on_connect(viewer_id).is_none() {
        state.transport.close(viewer_id);
        return None;
    }

    Some(outbox)
}

/// Unregister the viewer and drop its outbound queue
pub fn detach_viewer(state: &AppState, viewer_id: &str) {
    state.sessions.on_disconnect(viewer_id);
    state.transport.close(viewer_id);
}

pub fn viewer_routes() -> Router<AppState> {
    Router::new().route("/ws", get(viewer_socket))
}
