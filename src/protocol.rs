//! Wire protocol between clients and the relay
//!
//! Frames are JSON objects tagged by `type`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::room::{ConnectionId, DrawOp, Participant};

/// Messages from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Enter the room
    #[serde(rename = "join")]
    Join {
        #[serde(default)]
        name: Option<String>,
    },
    /// Append new drawing operations
    #[serde(rename = "draw_batch")]
    DrawBatch { ops: Vec<DrawOp> },
    /// Replace existing operations by id
    #[serde(rename = "update_batch")]
    UpdateBatch { ops: Vec<DrawOp> },
    /// Remove operations by id
    #[serde(rename = "delete_batch")]
    DeleteBatch { ids: Vec<String> },
    /// Remove the last operation in the room
    #[serde(rename = "undo")]
    Undo,
    /// Empty the history
    #[serde(rename = "clear")]
    Clear,
    /// Pointer position, best-effort
    #[serde(rename = "cursor")]
    Cursor { x: f64, y: f64 },
    #[serde(rename = "start-screen-share")]
    StartScreenShare,
    #[serde(rename = "stop-screen-share")]
    StopScreenShare,
    /// Audio offer for a peer
    #[serde(rename = "sending-signal")]
    SendingSignal { target: ConnectionId, signal: Value },
    /// Audio answer back to the caller
    #[serde(rename = "returning-signal")]
    ReturningSignal { target: ConnectionId, signal: Value },
    #[serde(rename = "ice-candidate")]
    IceCandidate { target: ConnectionId, signal: Value },
    /// Screen stream negotiation
    #[serde(rename = "screen-signal")]
    ScreenSignal { target: ConnectionId, signal: Value },
}

impl ClientMessage {
    /// Decode a text frame
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(AppError::InvalidMessage)
    }
}

/// Join or leave, as seen by the other participants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Joined,
    Left,
}

/// Messages from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Initial room state for a joining participant
    #[serde(rename = "init")]
    Init {
        self_id: ConnectionId,
        participant: Participant,
        history: Vec<DrawOp>,
        user_count: usize,
        participants: Vec<Participant>,
    },
    #[serde(rename = "screen-share-active")]
    ScreenShareActive { owner: ConnectionId },
    /// Peers to open audio connections to
    #[serde(rename = "all-users")]
    AllUsers { users: Vec<ConnectionId> },
    #[serde(rename = "user-count")]
    UserCount { count: usize },
    #[serde(rename = "user-notification")]
    UserNotification {
        event: Presence,
        participant: Participant,
    },
    #[serde(rename = "draw_batch")]
    DrawBatch { from: ConnectionId, ops: Vec<DrawOp> },
    #[serde(rename = "update_batch")]
    UpdateBatch { from: ConnectionId, ops: Vec<DrawOp> },
    #[serde(rename = "delete_batch")]
    DeleteBatch { from: ConnectionId, ids: Vec<String> },
    /// Full history after an undo
    #[serde(rename = "sync_history")]
    SyncHistory { history: Vec<DrawOp> },
    #[serde(rename = "clear")]
    Clear { from: ConnectionId },
    #[serde(rename = "cursor")]
    Cursor {
        connection_id: ConnectionId,
        name: String,
        x: f64,
        y: f64,
        color: String,
    },
    #[serde(rename = "screen-share-started")]
    ScreenShareStarted { owner: ConnectionId },
    #[serde(rename = "screen-share-stopped")]
    ScreenShareStopped { owner: ConnectionId },
    #[serde(rename = "user-joined-audio")]
    UserJoinedAudio { from: ConnectionId, signal: Value },
    #[serde(rename = "receiving-returned-signal")]
    ReceivingReturnedSignal { from: ConnectionId, signal: Value },
    #[serde(rename = "ice-candidate")]
    IceCandidate { from: ConnectionId, signal: Value },
    #[serde(rename = "screen-signal")]
    ScreenSignal { from: ConnectionId, signal: Value },
    #[serde(rename = "user-disconnected")]
    UserDisconnected { connection_id: ConnectionId },
}

impl ServerMessage {
    /// Wire name of this message
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Init { .. } => "init",
            ServerMessage::ScreenShareActive { .. } => "screen-share-active",
            ServerMessage::AllUsers { .. } => "all-users",
            ServerMessage::UserCount { .. } => "user-count",
            ServerMessage::UserNotification { .. } => "user-notification",
            ServerMessage::DrawBatch { .. } => "draw_batch",
            ServerMessage::UpdateBatch { .. } => "update_batch",
            ServerMessage::DeleteBatch { .. } => "delete_batch",
            ServerMessage::SyncHistory { .. } => "sync_history",
            ServerMessage::Clear { .. } => "clear",
            ServerMessage::Cursor { .. } => "cursor",
            ServerMessage::ScreenShareStarted { .. } => "screen-share-started",
            ServerMessage::ScreenShareStopped { .. } => "screen-share-stopped",
            ServerMessage::UserJoinedAudio { .. } => "user-joined-audio",
            ServerMessage::ReceivingReturnedSignal { .. } => "receiving-returned-signal",
            ServerMessage::IceCandidate { .. } => "ice-candidate",
            ServerMessage::ScreenSignal { .. } => "screen-signal",
            ServerMessage::UserDisconnected { .. } => "user-disconnected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn test_parse_join() {
        let msg = ClientMessage::parse(r#"{"type":"join","name":"Alice"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Join {
                name: Some("Alice".to_string())
            }
        );

        let msg = ClientMessage::parse(r#"{"type":"join"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Join { name: None });
    }

    #[test]
    fn test_parse_draw_batch() {
        let text = json!({
            "type": "draw_batch",
            "ops": [{"id": "a", "tool": "pen"}, {"id": "b", "tool": "rect", "w": 3}]
        })
        .to_string();
        match ClientMessage::parse(&text).unwrap() {
            ClientMessage::DrawBatch { ops } => {
                assert_eq!(ops.len(), 2);
                assert_eq!(ops[1].id(), "b");
                assert_eq!(ops[1].fields()["w"], 3);
            }
            other => panic!("Expected DrawBatch, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_malformed_batch() {
        let not_a_sequence = json!({"type": "draw_batch", "ops": {"id": "a"}}).to_string();
        assert!(matches!(
            ClientMessage::parse(&not_a_sequence),
            Err(AppError::InvalidMessage(_))
        ));

        let missing_id = json!({"type": "update_batch", "ops": [{"tool": "pen"}]}).to_string();
        assert!(ClientMessage::parse(&missing_id).is_err());

        let bad_ids = json!({"type": "delete_batch", "ids": "a"}).to_string();
        assert!(ClientMessage::parse(&bad_ids).is_err());
    }

    #[test]
    fn test_parse_unit_events() {
        assert_eq!(ClientMessage::parse(r#"{"type":"undo"}"#).unwrap(), ClientMessage::Undo);
        assert_eq!(ClientMessage::parse(r#"{"type":"clear"}"#).unwrap(), ClientMessage::Clear);
        assert_eq!(
            ClientMessage::parse(r#"{"type":"start-screen-share"}"#).unwrap(),
            ClientMessage::StartScreenShare
        );
        assert_eq!(
            ClientMessage::parse(r#"{"type":"stop-screen-share"}"#).unwrap(),
            ClientMessage::StopScreenShare
        );
    }

    #[test]
    fn test_parse_signal() {
        let target = Uuid::new_v4();
        let text = json!({
            "type": "ice-candidate",
            "target": target,
            "signal": {"candidate": "candidate:1 1 udp 1 10.0.0.1 5000 typ host"}
        })
        .to_string();
        match ClientMessage::parse(&text).unwrap() {
            ClientMessage::IceCandidate { target: t, signal } => {
                assert_eq!(t, target);
                assert!(signal["candidate"].is_string());
            }
            other => panic!("Expected IceCandidate, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_signal_missing_target() {
        let text = json!({"type": "sending-signal", "signal": {"sdp": "v=0"}}).to_string();
        assert!(ClientMessage::parse(&text).is_err());

        let text = json!({"type": "screen-signal", "target": "nobody", "signal": {}}).to_string();
        assert!(ClientMessage::parse(&text).is_err());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(ClientMessage::parse("not valid json").is_err());
        assert!(ClientMessage::parse(r#"{"type":"fly"}"#).is_err());
    }

    #[test]
    fn test_server_message_tags() {
        let id = Uuid::new_v4();
        let msg = ServerMessage::ScreenShareStarted { owner: id };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "screen-share-started");
        assert_eq!(json["type"], msg.kind());
        assert_eq!(json["owner"], id.to_string());

        let msg = ServerMessage::UserCount { count: 3 };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, json!({"type": "user-count", "count": 3}));
    }

    #[test]
    fn test_presence_serialization() {
        let participant = Participant::new(Uuid::new_v4(), Some("Bob".to_string()));
        let msg = ServerMessage::UserNotification {
            event: Presence::Left,
            participant,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "user-notification");
        assert_eq!(json["event"], "left");
        assert_eq!(json["participant"]["name"], "Bob");
    }
}
