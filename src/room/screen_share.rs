//! Exclusive screen-share ownership
//!
//! First come, first served. No preemption and no queueing.

use super::participant::ConnectionId;

#[derive(Debug, Default)]
pub struct ScreenShareLock {
    owner: Option<ConnectionId>,
}

impl ScreenShareLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant ownership if nobody holds the lock
    pub fn acquire(&mut self, id: ConnectionId) -> bool {
        if self.owner.is_some() {
            return false;
        }
        self.owner = Some(id);
        true
    }

    /// Release ownership if `id` is the current owner
    pub fn release(&mut self, id: ConnectionId) -> bool {
        if self.owner != Some(id) {
            return false;
        }
        self.owner = None;
        true
    }

    /// Used on disconnect. Returns whether `id` was the owner.
    pub fn release_if_owner(&mut self, id: ConnectionId) -> bool {
        self.release(id)
    }

    pub fn current_owner(&self) -> Option<ConnectionId> {
        self.owner
    }
}
