//! WebSocket client for a Sketchroom server

use anyhow::{anyhow, Result};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::messages::{ClientMessage, ServerMessage};

/// Joined state returned by the server
#[derive(Debug, Clone)]
pub struct Welcome {
    pub self_id: uuid::Uuid,
    pub name: String,
    pub history_len: usize,
    pub user_count: usize,
    pub participants: Vec<crate::messages::Participant>,
}

/// WebSocket client for Sketchroom
pub struct RoomClient {
    tx: mpsc::Sender<Message>,
    rx: mpsc::Receiver<ServerMessage>,
    handle: tokio::task::JoinHandle<()>,
}

impl RoomClient {
    /// Connect to a Sketchroom server
    pub async fn connect(url: &str) -> Result<Self> {
        tracing::info!("Connecting to {}", url);

        let (ws_stream, _) = connect_async(url).await?;
        let (mut write, mut read) = ws_stream.split();

        // Channel for outgoing messages
        let (out_tx, mut out_rx) = mpsc::channel::<Message>(32);

        // Channel for incoming parsed messages
        let (in_tx, in_rx) = mpsc::channel::<ServerMessage>(256);

        // Spawn task to handle WebSocket communication
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    // Handle outgoing messages
                    Some(msg) = out_rx.recv() => {
                        if write.send(msg).await.is_err() {
                            break;
                        }
                    }
                    // Handle incoming messages
                    Some(result) = read.next() => {
                        match result {
                            Ok(Message::Text(text)) => {
                                match serde_json::from_str::<ServerMessage>(&text) {
                                    Ok(msg) => {
                                        // Backpressure the socket instead of dropping events
                                        if in_tx.send(msg).await.is_err() {
                                            tracing::debug!("Receiver closed, discarding {}", text);
                                        }
                                    }
                                    Err(e) => {
                                        tracing::warn!("Failed to parse message: {} - {}", e, text);
                                    }
                                }
                            }
                            Ok(Message::Close(_)) => break,
                            Err(e) => {
                                tracing::error!("WebSocket error: {}", e);
                                break;
                            }
                            _ => {}
                        }
                    }
                    else => break,
                }
            }
        });

        tracing::info!("Connected successfully");

        Ok(Self {
            tx: out_tx,
            rx: in_rx,
            handle,
        })
    }

    /// Send a message to the server
    async fn send(&self, msg: ClientMessage) -> Result<()> {
        let json = serde_json::to_string(&msg)?;
        self.tx
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| anyhow!("Failed to send message: {}", e))
    }

    /// Receive a message from the server
    pub async fn recv(&mut self) -> Option<ServerMessage> {
        self.rx.recv().await
    }

    /// Join the room and wait for the initial snapshot
    pub async fn join(&mut self, name: Option<String>) -> Result<Welcome> {
        self.send(ClientMessage::Join { name }).await?;

        while let Some(msg) = self.recv().await {
            if let ServerMessage::Init {
                self_id,
                participant,
                history,
                user_count,
                participants,
            } = msg
            {
                return Ok(Welcome {
                    self_id,
                    name: participant.name,
                    history_len: history.len(),
                    user_count,
                    participants,
                });
            }
        }

        Err(anyhow!("Connection closed"))
    }

    /// Append drawing operations
    pub async fn draw(&self, ops: Vec<Value>) -> Result<()> {
        self.send(ClientMessage::DrawBatch { ops }).await
    }

    pub async fn undo(&self) -> Result<()> {
        self.send(ClientMessage::Undo).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.send(ClientMessage::Clear).await
    }

    /// Listen for events until callback returns false
    pub async fn listen<F>(&mut self, mut callback: F) -> Result<()>
    where
        F: FnMut(ServerMessage) -> bool,
    {
        while let Some(msg) = self.recv().await {
            if !callback(msg) {
                break;
            }
        }
        Ok(())
    }

    /// Close the socket after everything queued so far has been written.
    /// Unread events are discarded.
    pub async fn close(self) -> Result<()> {
        drop(self.rx);
        self.tx
            .send(Message::Close(None))
            .await
            .map_err(|e| anyhow!("Failed to close: {}", e))?;
        drop(self.tx);
        self.handle.await?;
        Ok(())
    }
}

/// Check that every op is an object with a string `id`; the server drops a
/// batch containing anything else.
pub fn validate_ops(ops: &[Value]) -> Result<()> {
    for (i, op) in ops.iter().enumerate() {
        if !op.get("id").map(Value::is_string).unwrap_or(false) {
            return Err(anyhow!("op {} has no string \"id\"", i));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use tokio::net::TcpListener;

    /// Serve `count` user-count frames to the first client, then wait for it to close
    async fn flood_server(count: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            for i in 0..count {
                let frame = json!({"type": "user-count", "count": i}).to_string();
                ws.send(Message::Text(frame.into())).await.unwrap();
            }
            while let Some(Ok(_)) = ws.next().await {}
        });

        format!("ws://{}", addr)
    }

    #[test]
    fn test_validate_ops() {
        assert!(validate_ops(&[json!({"id": "a"}), json!({"id": "b", "tool": "pen"})]).is_ok());
        assert!(validate_ops(&[]).is_ok());
    }

    #[test]
    fn test_validate_ops_rejects_missing_id() {
        let err = validate_ops(&[json!({"id": "a"}), json!({"tool": "pen"})]).unwrap_err();
        assert!(err.to_string().contains("op 1"));
        assert!(validate_ops(&[json!({"id": 3})]).is_err());
        assert!(validate_ops(&[json!("a")]).is_err());
    }

    #[tokio::test]
    async fn test_slow_reader_loses_no_events() {
        let url = flood_server(600).await;
        let mut client = RoomClient::connect(&url).await.unwrap();

        // Let the server get well past the client's buffer before reading
        tokio::time::sleep(Duration::from_millis(200)).await;

        for expected in 0..600 {
            let msg = tokio::time::timeout(Duration::from_secs(2), client.recv())
                .await
                .expect("Timeout waiting for event")
                .expect("Connection closed early");
            match msg {
                ServerMessage::UserCount { count } => assert_eq!(count, expected),
                other => panic!("Unexpected message: {:?}", other),
            }
        }

        tokio::time::timeout(Duration::from_secs(2), client.close())
            .await
            .expect("Timeout closing")
            .unwrap();
    }

    #[tokio::test]
    async fn test_close_with_unread_events() {
        let url = flood_server(600).await;
        let client = RoomClient::connect(&url).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        tokio::time::timeout(Duration::from_secs(2), client.close())
            .await
            .expect("Timeout closing")
            .unwrap();
    }
}
