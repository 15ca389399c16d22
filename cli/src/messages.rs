//! WebSocket message types for the Sketchroom protocol
//!
//! These types mirror the server's protocol. Drawing operations stay as raw
//! JSON since the CLI never interprets them.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Participant information for presence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Joined,
    Left,
}

/// Messages from client to server
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "join")]
    Join {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    #[serde(rename = "draw_batch")]
    DrawBatch { ops: Vec<Value> },
    #[serde(rename = "undo")]
    Undo,
    #[serde(rename = "clear")]
    Clear,
}

/// Messages from server to client
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "init")]
    Init {
        self_id: Uuid,
        participant: Participant,
        history: Vec<Value>,
        user_count: usize,
        participants: Vec<Participant>,
    },
    #[serde(rename = "screen-share-active")]
    ScreenShareActive { owner: Uuid },
    #[serde(rename = "all-users")]
    AllUsers { users: Vec<Uuid> },
    #[serde(rename = "user-count")]
    UserCount { count: usize },
    #[serde(rename = "user-notification")]
    UserNotification {
        event: Presence,
        participant: Participant,
    },
    #[serde(rename = "draw_batch")]
    DrawBatch { from: Uuid, ops: Vec<Value> },
    #[serde(rename = "update_batch")]
    UpdateBatch { from: Uuid, ops: Vec<Value> },
    #[serde(rename = "delete_batch")]
    DeleteBatch { from: Uuid, ids: Vec<String> },
    #[serde(rename = "sync_history")]
    SyncHistory { history: Vec<Value> },
    #[serde(rename = "clear")]
    Clear { from: Uuid },
    #[serde(rename = "cursor")]
    Cursor {
        connection_id: Uuid,
        name: String,
        x: f64,
        y: f64,
        color: String,
    },
    #[serde(rename = "screen-share-started")]
    ScreenShareStarted { owner: Uuid },
    #[serde(rename = "screen-share-stopped")]
    ScreenShareStopped { owner: Uuid },
    #[serde(rename = "user-disconnected")]
    UserDisconnected { connection_id: Uuid },
    /// Signaling frames and anything newer than this client
    #[serde(other)]
    Other,
}

fn short(id: &Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

/// One-line, human readable rendering of a server event
pub fn describe(msg: &ServerMessage) -> String {
    match msg {
        ServerMessage::Init {
            participant,
            history,
            user_count,
            ..
        } => format!(
            "joined as {} ({}), {} ops in history, {} online",
            participant.name, participant.color, history.len(), user_count
        ),
        ServerMessage::ScreenShareActive { owner } => format!("{} is sharing their screen", short(owner)),
        ServerMessage::AllUsers { users } => format!("{} peers available for audio", users.len()),
        ServerMessage::UserCount { count } => format!("{} online", count),
        ServerMessage::UserNotification { event, participant } => match event {
            Presence::Joined => format!("{} joined", participant.name),
            Presence::Left => format!("{} left", participant.name),
        },
        ServerMessage::DrawBatch { from, ops } => format!("{} drew {} ops", short(from), ops.len()),
        ServerMessage::UpdateBatch { from, ops } => format!("{} updated {} ops", short(from), ops.len()),
        ServerMessage::DeleteBatch { from, ids } => format!("{} deleted {} ops", short(from), ids.len()),
        ServerMessage::SyncHistory { history } => format!("history resynced, {} ops", history.len()),
        ServerMessage::Clear { from } => format!("{} cleared the board", short(from)),
        ServerMessage::Cursor { name, x, y, .. } => format!("{} cursor at ({:.0}, {:.0})", name, x, y),
        ServerMessage::ScreenShareStarted { owner } => format!("{} started sharing", short(owner)),
        ServerMessage::ScreenShareStopped { owner } => format!("{} stopped sharing", short(owner)),
        ServerMessage::UserDisconnected { connection_id } => format!("{} disconnected", short(connection_id)),
        ServerMessage::Other => "signaling frame".to_string(),
    }
}
