//! Ordered set of remote peers currently in the channel.

use serde::Serialize;
use shared::domain::PeerId;

/// Insertion order decides where a peer lands in the tile grid, so this is a
/// vector rather than a hash set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeerSet {
    ids: Vec<PeerId>,
}

impl PeerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `id` unless it is already present. Returns whether it changed.
    pub fn add(&mut self, id: PeerId) -> bool {
        if self.ids.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Removes every occurrence of `id`. Returns whether it changed.
    pub fn remove(&mut self, id: PeerId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|existing| *existing != id);
        self.ids.len() != before
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: PeerId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn as_slice(&self) -> &[PeerId] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = PeerId> + '_ {
        self.ids.iter().copied()
    }
}

#[cfg(test)]
#[path = "tests/peer_set_tests.rs"]
mod tests;
