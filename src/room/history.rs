//! Ordered drawing history
//!
//! Insertion order is paint order: later operations draw on top. Every
//! operation carries a client-assigned `id`, and the history holds at most one
//! entry per id. Tool-specific fields are never interpreted here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// One drawing operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawOp {
    id: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl DrawOp {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Attach a tool-specific field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Tool-specific payload, everything except `id`
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// The shared drawing log
#[derive(Debug, Default)]
pub struct History {
    ops: Vec<DrawOp>,
    ids: HashSet<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full copy of the current log
    pub fn snapshot(&self) -> Vec<DrawOp> {
        self.ops.clone()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Append operations in order. An op whose id is already present replaces
    /// the existing entry in place.
    pub fn append_batch(&mut self, ops: Vec<DrawOp>) {
        self.ops.reserve(ops.len());
        for op in ops {
            if self.ids.contains(op.id()) {
                self.replace(op);
            } else {
                self.ids.insert(op.id.clone());
                self.ops.push(op);
            }
        }
    }

    /// Replace entries with matching ids, keeping their position. Returns the
    /// ops that matched; unknown ids are dropped.
    pub fn update_batch(&mut self, ops: Vec<DrawOp>) -> Vec<DrawOp> {
        let mut applied = Vec::with_capacity(ops.len());
        for op in ops {
            if !self.ids.contains(op.id()) {
                continue;
            }
            self.replace(op.clone());
            applied.push(op);
        }
        applied
    }

    /// Remove every entry whose id is listed. Survivors keep their relative
    /// order. Returns the ids that were actually removed.
    pub fn delete_batch(&mut self, ids: &[String]) -> Vec<String> {
        let targets: HashSet<&str> = ids
            .iter()
            .map(String::as_str)
            .filter(|id| self.ids.contains(*id))
            .collect();
        if targets.is_empty() {
            return Vec::new();
        }

        self.ops.retain(|op| !targets.contains(op.id()));
        for id in &targets {
            self.ids.remove(*id);
        }

        let mut removed: Vec<String> = Vec::with_capacity(targets.len());
        for id in ids {
            if targets.contains(id.as_str()) && !removed.contains(id) {
                removed.push(id.clone());
            }
        }
        removed
    }

    /// Remove the most recently appended entry, whoever authored it
    pub fn undo_last(&mut self) -> Option<DrawOp> {
        let op = self.ops.pop()?;
        self.ids.remove(op.id());
        Some(op)
    }

    pub fn clear(&mut self) {
        self.ops.clear();
        self.ids.clear();
    }

    // Linear scan; callers check `ids` first.
    fn replace(&mut self, op: DrawOp) {
        if let Some(slot) = self.ops.iter_mut().find(|existing| existing.id == op.id) {
            *slot = op;
        }
    }
}
