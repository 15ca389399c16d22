//! WebRTC signaling relay
//!
//! Payloads are forwarded verbatim to a single target, tagged with the
//! sender's connection id. Nothing is validated, queued or retried.

use serde_json::Value;

use crate::protocol::ServerMessage;
use crate::room::{ConnectionId, Registry};
use crate::router::{Audience, Delivery, Outbound};

/// Logical channel a signaling payload travels on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalChannel {
    /// Audio offer from a newcomer to an existing peer
    AudioOffer,
    /// Audio answer back to the newcomer
    AudioAnswer,
    IceCandidate,
    /// Screen stream negotiation
    Screen,
}

impl SignalChannel {
    fn wrap(self, from: ConnectionId, signal: Value) -> ServerMessage {
        match self {
            SignalChannel::AudioOffer => ServerMessage::UserJoinedAudio { from, signal },
            SignalChannel::AudioAnswer => ServerMessage::ReceivingReturnedSignal { from, signal },
            SignalChannel::IceCandidate => ServerMessage::IceCandidate { from, signal },
            SignalChannel::Screen => ServerMessage::ScreenSignal { from, signal },
        }
    }
}

/// Build the delivery for one signaling payload. Returns `None` when the
/// target is not in the room.
pub fn forward(
    registry: &Registry,
    from: ConnectionId,
    target: ConnectionId,
    channel: SignalChannel,
    signal: Value,
) -> Option<Outbound> {
    if !registry.contains(target) {
        tracing::debug!(%from, %target, ?channel, "Dropping signal for absent target");
        return None;
    }

    Some(Outbound {
        audience: Audience::Only(target),
        delivery: Delivery::Reliable,
        message: channel.wrap(from, signal),
    })
}
