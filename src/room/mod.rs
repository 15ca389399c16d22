//! Rooms and their connected clients
//!
//! A [`Room`] owns the shared [`RoomState`] together with an outbox per
//! connection. Both sit behind one lock: every event is applied and its
//! messages are queued before the next event is looked at, so a joining
//! client gets its snapshot strictly before any later mutation.

pub mod history;
pub mod participant;
pub mod screen_share;
pub mod state;

pub use history::{DrawOp, History};
pub use participant::{ConnectionId, Participant, Registry};
pub use screen_share::ScreenShareLock;
pub use state::RoomState;

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};

use crate::protocol::{ClientMessage, ServerMessage};
use crate::router::{self, Delivery, Outbound};

/// Receiving halves of a connection's outbound queues
pub struct OutboxReceiver {
    pub reliable: mpsc::UnboundedReceiver<String>,
    pub best_effort: mpsc::Receiver<String>,
}

/// Sending halves of a connection's outbound queues
pub struct Outbox {
    reliable: mpsc::UnboundedSender<String>,
    best_effort: mpsc::Sender<String>,
}

impl Outbox {
    /// Create a connected pair. `best_effort_depth` bounds the lossy queue.
    pub fn channel(best_effort_depth: usize) -> (Outbox, OutboxReceiver) {
        let (reliable_tx, reliable_rx) = mpsc::unbounded_channel();
        let (best_effort_tx, best_effort_rx) = mpsc::channel(best_effort_depth.max(1));
        (
            Outbox {
                reliable: reliable_tx,
                best_effort: best_effort_tx,
            },
            OutboxReceiver {
                reliable: reliable_rx,
                best_effort: best_effort_rx,
            },
        )
    }

    // Never waits. A closed queue means the peer is going away; its
    // disconnect will follow.
    fn push(&self, delivery: Delivery, frame: String) {
        match delivery {
            Delivery::Reliable => {
                let _ = self.reliable.send(frame);
            }
            Delivery::BestEffort => {
                if let Err(mpsc::error::TrySendError::Full(_)) = self.best_effort.try_send(frame) {
                    tracing::trace!("Best-effort queue full, dropping frame");
                }
            }
        }
    }
}

/// Read-only view of a room for the HTTP API
#[derive(Debug, Clone, Serialize)]
pub struct RoomSummary {
    pub room_id: String,
    pub user_count: usize,
    pub participants: Vec<Participant>,
    pub history_len: usize,
    pub screen_share_owner: Option<ConnectionId>,
}

struct RoomInner {
    state: RoomState,
    outboxes: HashMap<ConnectionId, Outbox>,
}

pub struct Room {
    room_id: String,
    inner: Mutex<RoomInner>,
}

impl Room {
    pub fn new(room_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            inner: Mutex::new(RoomInner {
                state: RoomState::new(),
                outboxes: HashMap::new(),
            }),
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Attach a transport connection. It receives nothing until it joins.
    pub async fn connect(&self, id: ConnectionId, outbox: Outbox) {
        let mut inner = self.inner.lock().await;
        inner.outboxes.insert(id, outbox);
        tracing::debug!(room_id = %self.room_id, connection_id = %id, "Connection attached");
    }

    /// Apply an inbound event and queue the resulting messages
    pub async fn dispatch(&self, from: ConnectionId, msg: ClientMessage) {
        let mut inner = self.inner.lock().await;
        let out = router::handle(&mut inner.state, from, msg);
        inner.deliver(out);
    }

    /// Detach a connection and run the leave sequence. Safe to call once per
    /// connection; later calls do nothing.
    pub async fn disconnect(&self, id: ConnectionId) {
        let mut inner = self.inner.lock().await;
        inner.outboxes.remove(&id);
        let out = router::disconnect(&mut inner.state, id);
        inner.deliver(out);
        tracing::debug!(room_id = %self.room_id, connection_id = %id, "Connection detached");
    }


    pub async fn summary(&self) -> RoomSummary {
        let inner = self.inner.lock().await;
        RoomSummary {
            room_id: self.room_id.clone(),
            user_count: inner.state.registry.count(),
            participants: inner.state.registry.participants(),
            history_len: inner.state.history.len(),
            screen_share_owner: inner.state.screen_share.current_owner(),
        }
    }
}

impl RoomInner {
    fn deliver(&self, out: Vec<Outbound>) {
        if out.is_empty() {
            return;
        }
        let members = self.state.registry.ids();

        for outbound in out {
            let frame = match serialize(&outbound.message) {
                Some(frame) => frame,
                None => continue,
            };
            for id in members.iter().filter(|id| outbound.audience.includes(**id)) {
                if let Some(outbox) = self.outboxes.get(id) {
                    outbox.push(outbound.delivery, frame.clone());
                }
            }
        }
    }
}

fn serialize(msg: &ServerMessage) -> Option<String> {
    match serde_json::to_string(msg) {
        Ok(frame) => Some(frame),
        Err(e) => {
            tracing::error!("Failed to serialize {}: {}", msg.kind(), e);
            None
        }
    }
}

/// Manager for all active rooms
pub struct RoomManager {
    rooms: RwLock<HashMap<String, Arc<Room>>>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Get or create a room
    pub async fn get_or_create(&self, room_id: &str) -> Arc<Room> {
        {
            let rooms = self.rooms.read().await;
            if let Some(room) = rooms.get(room_id) {
                return Arc::clone(room);
            }
        }

        let mut rooms = self.rooms.write().await;
        // Double-check after acquiring write lock
        if let Some(room) = rooms.get(room_id) {
            return Arc::clone(room);
        }

        let room = Arc::new(Room::new(room_id));
        rooms.insert(room_id.to_string(), Arc::clone(&room));
        tracing::info!(room_id, "Room created");
        room
    }

    /// Get a room if it exists
    pub async fn get(&self, room_id: &str) -> Option<Arc<Room>> {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).cloned()
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new()
    }
}
