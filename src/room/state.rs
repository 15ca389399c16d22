//! Aggregate room state
//!
//! Owned exclusively by a [`super::Room`] and only ever mutated through the
//! router while the room lock is held.

use super::history::History;
use super::participant::Registry;
use super::screen_share::ScreenShareLock;

#[derive(Debug, Default)]
pub struct RoomState {
    pub registry: Registry,
    pub history: History,
    pub screen_share: ScreenShareLock,
}

impl RoomState {
    pub fn new() -> Self {
        Self::default()
    }
}
