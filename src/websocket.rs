//! WebSocket server handler
//!
//! Each socket gets a fresh connection id, a reader loop that feeds the room,
//! and a writer task that drains the connection's outbox.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::protocol::ClientMessage;
use crate::room::{ConnectionId, Outbox, OutboxReceiver};
use crate::AppState;

/// How long a closed connection's writer may spend flushing queued frames
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// WebSocket handler
pub async fn handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id: ConnectionId = Uuid::new_v4();
    let room = state.rooms.get_or_create(&state.config.room).await;
    tracing::info!(%connection_id, room_id = room.room_id(), "Client connected");

    let (outbox, outbox_rx) = Outbox::channel(state.config.cursor_queue_depth);
    room.connect(connection_id, outbox).await;

    let (sender, mut receiver) = socket.split();
    let writer = tokio::spawn(write_frames(sender, outbox_rx));

    while let Some(msg) = receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::error!(%connection_id, "WebSocket error: {}", e);
                break;
            }
        };

        match ClientMessage::parse(&text) {
            Ok(msg) => room.dispatch(connection_id, msg).await,
            Err(e) => {
                tracing::debug!(%connection_id, "Ignoring frame: {}", e);
            }
        }
    }

    room.disconnect(connection_id).await;
    finish_writer(connection_id, writer, WRITER_DRAIN_TIMEOUT).await;
    tracing::info!(%connection_id, "Client disconnected");
}

/// Drain both outbound queues into the socket, reliable frames first. Ends
/// when the room drops the outbox or the socket stops accepting frames.
async fn write_frames(mut sender: SplitSink<WebSocket, Message>, mut rx: OutboxReceiver) {
    loop {
        let frame = tokio::select! {
            biased;
            Some(frame) = rx.reliable.recv() => frame,
            Some(frame) = rx.best_effort.recv() => frame,
            else => break,
        };

        if let Err(e) = sender.send(Message::Text(frame)).await {
            tracing::debug!("Failed to send frame: {}", e);
            break;
        }
    }
    let _ = sender.close().await;
}

/// Wait for the writer to flush, aborting it if the peer stops reading.
async fn finish_writer(connection_id: ConnectionId, mut writer: JoinHandle<()>, limit: Duration) {
    match tokio::time::timeout(limit, &mut writer).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(%connection_id, "Writer task failed: {}", e),
        Err(_) => {
            tracing::debug!(%connection_id, "Writer stalled, aborting");
            writer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_stalled_writer_is_aborted() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let writer = tokio::spawn(async move {
            // Dropped on abort
            let _guard = tx;
            std::future::pending::<()>().await;
        });

        let started = Instant::now();
        finish_writer(Uuid::new_v4(), writer, Duration::from_millis(50)).await;
        assert!(started.elapsed() < Duration::from_secs(2));

        let aborted = tokio::time::timeout(Duration::from_secs(1), rx).await;
        assert!(matches!(aborted, Ok(Err(_))));
    }

    #[tokio::test]
    async fn test_finished_writer_is_awaited() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let writer = tokio::spawn(async move {
            let _ = tx.send(());
        });

        finish_writer(Uuid::new_v4(), writer, Duration::from_secs(1)).await;
        assert!(rx.await.is_ok());
    }
}
