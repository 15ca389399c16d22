//! Participant model and the connection registry
//!
//! The registry maps a connection to the participant that joined over it.
//! Name and color are fixed for the lifetime of the connection.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Identifier assigned to a connection by the transport layer
pub type ConnectionId = Uuid;

/// A participant in a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Connection this participant joined over
    pub id: ConnectionId,
    /// Display name
    pub name: String,
    /// Cursor/presence color as `#rrggbb`
    pub color: String,
    /// When this participant joined
    pub joined_at: DateTime<Utc>,
}

impl Participant {
    /// Create a participant, falling back to a name derived from the id
    pub fn new(id: ConnectionId, requested_name: Option<String>) -> Self {
        let name = requested_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| fallback_name(id));

        Self {
            id,
            name,
            color: random_color(),
            joined_at: Utc::now(),
        }
    }
}

/// Deterministic display name for a connection that did not pick one
pub fn fallback_name(id: ConnectionId) -> String {
    let simple = id.simple().to_string();
    format!("Guest-{}", &simple[..8])
}

/// Uniformly sampled 24-bit color. Collisions are allowed.
fn random_color() -> String {
    let rgb: u32 = rand::thread_rng().gen_range(0..=0xFF_FFFF);
    format!("#{:06x}", rgb)
}

/// Registry of joined participants, in join order
#[derive(Debug, Default)]
pub struct Registry {
    participants: HashMap<ConnectionId, Participant>,
    order: Vec<ConnectionId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection. Returns `None` if it has already joined.
    pub fn join(&mut self, id: ConnectionId, requested_name: Option<String>) -> Option<Participant> {
        if self.participants.contains_key(&id) {
            return None;
        }

        let participant = Participant::new(id, requested_name);
        self.participants.insert(id, participant.clone());
        self.order.push(id);
        Some(participant)
    }

    /// Remove a connection, returning its participant if it had joined
    pub fn leave(&mut self, id: ConnectionId) -> Option<Participant> {
        let removed = self.participants.remove(&id)?;
        self.order.retain(|c| *c != id);
        Some(removed)
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.participants.contains_key(&id)
    }

    /// Current population
    pub fn count(&self) -> usize {
        self.participants.len()
    }

    /// Every joined connection except `id`
    pub fn list_others(&self, id: ConnectionId) -> Vec<ConnectionId> {
        self.order.iter().copied().filter(|c| *c != id).collect()
    }

    /// All joined connections
    pub fn ids(&self) -> Vec<ConnectionId> {
        self.order.clone()
    }

    /// All participants, in join order
    pub fn participants(&self) -> Vec<Participant> {
        self.order
            .iter()
            .filter_map(|id| self.participants.get(id).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_requested_name() {
        let p = Participant::new(Uuid::new_v4(), Some("Alice".to_string()));
        assert_eq!(p.name, "Alice");
    }

    #[test]
    fn test_participant_fallback_name() {
        let id = Uuid::new_v4();
        let p = Participant::new(id, None);
        assert_eq!(p.name, fallback_name(id));
        assert!(p.name.starts_with("Guest-"));
        assert_eq!(p.name.len(), "Guest-".len() + 8);
    }

    #[test]
    fn test_blank_name_uses_fallback() {
        let id = Uuid::new_v4();
        let p = Participant::new(id, Some("   ".to_string()));
        assert_eq!(p.name, fallback_name(id));
    }

    #[test]
    fn test_color_format() {
        for _ in 0..50 {
            let p = Participant::new(Uuid::new_v4(), None);
            assert_eq!(p.color.len(), 7);
            assert!(p.color.starts_with('#'));
            assert!(p.color[1..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_registry_join_and_leave() {
        let mut registry = Registry::new();
        let a = Uuid::new_v4();

        let p = registry.join(a, Some("Alice".to_string())).unwrap();
        assert_eq!(p.id, a);
        assert_eq!(registry.count(), 1);

        let removed = registry.leave(a).unwrap();
        assert_eq!(removed, p);
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_registry_double_join_is_noop() {
        let mut registry = Registry::new();
        let a = Uuid::new_v4();

        let first = registry.join(a, Some("Alice".to_string())).unwrap();
        assert!(registry.join(a, Some("Mallory".to_string())).is_none());
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.get(a).unwrap().name, first.name);
    }

    #[test]
    fn test_registry_leave_unknown() {
        let mut registry = Registry::new();
        assert!(registry.leave(Uuid::new_v4()).is_none());
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_registry_list_others() {
        let mut registry = Registry::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        registry.join(a, None);
        registry.join(b, None);
        registry.join(c, None);

        assert_eq!(registry.list_others(b), vec![a, c]);
        assert_eq!(registry.ids(), vec![a, b, c]);

        registry.leave(a);
        assert_eq!(registry.list_others(b), vec![c]);
    }

    #[test]
    fn test_population_after_joins_and_leaves() {
        let mut registry = Registry::new();
        let ids: Vec<_> = (0..5).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            registry.join(*id, None);
        }
        registry.leave(ids[1]);
        registry.leave(ids[3]);
        registry.leave(ids[3]);

        assert_eq!(registry.count(), 3);
    }

    #[test]
    fn test_participant_serialization() {
        let p = Participant::new(Uuid::new_v4(), Some("Alice".to_string()));
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["name"], "Alice");
        assert!(json["color"].is_string());
        assert!(json["joined_at"].is_string());
    }
}
