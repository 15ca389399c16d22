//! Room event router
//!
//! Applies one inbound event to the room state and decides who hears about
//! it. Nothing here blocks or performs I/O; the caller resolves each
//! [`Outbound`] to concrete connections while it still holds the room lock.

use crate::protocol::{ClientMessage, Presence, ServerMessage};
use crate::room::{ConnectionId, RoomState};
use crate::signaling::{self, SignalChannel};

/// Who receives an outbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Every joined participant
    All,
    /// Every joined participant except one
    Others(ConnectionId),
    /// A single participant
    Only(ConnectionId),
}

impl Audience {
    pub fn includes(&self, id: ConnectionId) -> bool {
        match self {
            Audience::All => true,
            Audience::Others(excluded) => *excluded != id,
            Audience::Only(target) => *target == id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Reliable,
    /// May be dropped when the recipient is backed up
    BestEffort,
}

/// A message the transport should deliver
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub audience: Audience,
    pub delivery: Delivery,
    pub message: ServerMessage,
}

impl Outbound {
    fn reliable(audience: Audience, message: ServerMessage) -> Self {
        Self {
            audience,
            delivery: Delivery::Reliable,
            message,
        }
    }
}

/// Apply an inbound event from `from`
pub fn handle(state: &mut RoomState, from: ConnectionId, msg: ClientMessage) -> Vec<Outbound> {
    if let ClientMessage::Join { name } = msg {
        return join(state, from, name);
    }

    if !state.registry.contains(from) {
        tracing::debug!(connection_id = %from, "Ignoring event from unjoined connection");
        return Vec::new();
    }

    match msg {
        ClientMessage::Join { .. } => Vec::new(),
        ClientMessage::DrawBatch { ops } => {
            if ops.is_empty() {
                return Vec::new();
            }
            state.history.append_batch(ops.clone());
            vec![Outbound::reliable(
                Audience::Others(from),
                ServerMessage::DrawBatch { from, ops },
            )]
        }
        ClientMessage::UpdateBatch { ops } => {
            let applied = state.history.update_batch(ops);
            if applied.is_empty() {
                return Vec::new();
            }
            vec![Outbound::reliable(
                Audience::Others(from),
                ServerMessage::UpdateBatch { from, ops: applied },
            )]
        }
        ClientMessage::DeleteBatch { ids } => {
            let removed = state.history.delete_batch(&ids);
            if removed.is_empty() {
                return Vec::new();
            }
            vec![Outbound::reliable(
                Audience::Others(from),
                ServerMessage::DeleteBatch { from, ids: removed },
            )]
        }
        ClientMessage::Undo => match state.history.undo_last() {
            Some(op) => {
                tracing::debug!(connection_id = %from, op_id = op.id(), "Undo");
                vec![Outbound::reliable(
                    Audience::All,
                    ServerMessage::SyncHistory {
                        history: state.history.snapshot(),
                    },
                )]
            }
            None => Vec::new(),
        },
        ClientMessage::Clear => {
            state.history.clear();
            tracing::info!(connection_id = %from, "History cleared");
            vec![Outbound::reliable(Audience::All, ServerMessage::Clear { from })]
        }
        ClientMessage::Cursor { x, y } => {
            let Some(participant) = state.registry.get(from) else {
                return Vec::new();
            };
            vec![Outbound {
                audience: Audience::Others(from),
                delivery: Delivery::BestEffort,
                message: ServerMessage::Cursor {
                    connection_id: from,
                    name: participant.name.clone(),
                    x,
                    y,
                    color: participant.color.clone(),
                },
            }]
        }
        ClientMessage::StartScreenShare => {
            if !state.screen_share.acquire(from) {
                tracing::debug!(connection_id = %from, "Screen share already owned");
                return Vec::new();
            }
            tracing::info!(connection_id = %from, "Screen share started");
            vec![Outbound::reliable(
                Audience::All,
                ServerMessage::ScreenShareStarted { owner: from },
            )]
        }
        ClientMessage::StopScreenShare => {
            if !state.screen_share.release(from) {
                return Vec::new();
            }
            tracing::info!(connection_id = %from, "Screen share stopped");
            vec![Outbound::reliable(
                Audience::All,
                ServerMessage::ScreenShareStopped { owner: from },
            )]
        }
        ClientMessage::SendingSignal { target, signal } => {
            relay(state, from, target, SignalChannel::AudioOffer, signal)
        }
        ClientMessage::ReturningSignal { target, signal } => {
            relay(state, from, target, SignalChannel::AudioAnswer, signal)
        }
        ClientMessage::IceCandidate { target, signal } => {
            relay(state, from, target, SignalChannel::IceCandidate, signal)
        }
        ClientMessage::ScreenSignal { target, signal } => {
            relay(state, from, target, SignalChannel::Screen, signal)
        }
    }
}

fn relay(
    state: &RoomState,
    from: ConnectionId,
    target: ConnectionId,
    channel: SignalChannel,
    signal: serde_json::Value,
) -> Vec<Outbound> {
    signaling::forward(&state.registry, from, target, channel, signal)
        .into_iter()
        .collect()
}

/// Register a connection and build its initial view of the room
pub fn join(state: &mut RoomState, id: ConnectionId, name: Option<String>) -> Vec<Outbound> {
    let Some(participant) = state.registry.join(id, name) else {
        tracing::debug!(connection_id = %id, "Ignoring repeated join");
        return Vec::new();
    };
    tracing::info!(connection_id = %id, name = %participant.name, "Participant joined");

    let user_count = state.registry.count();
    let mut out = vec![
        Outbound::reliable(
            Audience::Others(id),
            ServerMessage::UserNotification {
                event: Presence::Joined,
                participant: participant.clone(),
            },
        ),
        Outbound::reliable(
            Audience::Only(id),
            ServerMessage::Init {
                self_id: id,
                participant,
                history: state.history.snapshot(),
                user_count,
                participants: state.registry.participants(),
            },
        ),
    ];

    if let Some(owner) = state.screen_share.current_owner() {
        out.push(Outbound::reliable(
            Audience::Only(id),
            ServerMessage::ScreenShareActive { owner },
        ));
    }

    out.push(Outbound::reliable(
        Audience::Only(id),
        ServerMessage::AllUsers {
            users: state.registry.list_others(id),
        },
    ));
    out.push(Outbound::reliable(
        Audience::All,
        ServerMessage::UserCount { count: user_count },
    ));
    out
}

/// Remove a connection and tell the remaining participants
pub fn disconnect(state: &mut RoomState, id: ConnectionId) -> Vec<Outbound> {
    let Some(participant) = state.registry.leave(id) else {
        return Vec::new();
    };
    tracing::info!(connection_id = %id, name = %participant.name, "Participant left");

    let mut out = Vec::new();
    if state.screen_share.release_if_owner(id) {
        tracing::info!(connection_id = %id, "Screen share released on disconnect");
        out.push(Outbound::reliable(
            Audience::All,
            ServerMessage::ScreenShareStopped { owner: id },
        ));
    }

    // Cursor and peer teardown precede the new count
    out.push(Outbound::reliable(
        Audience::All,
        ServerMessage::UserDisconnected { connection_id: id },
    ));
    out.push(Outbound::reliable(
        Audience::All,
        ServerMessage::UserCount {
            count: state.registry.count(),
        },
    ));
    out.push(Outbound::reliable(
        Audience::All,
        ServerMessage::UserNotification {
            event: Presence::Left,
            participant,
        },
    ));
    out
}
