//! # Peer Set
//!
//! Tracks every remote peer this synchronizer has seen. Owned by the
//! [`crate::Synchronizer`] and mutated only from its dispatch loop, so
//! no internal locking is needed.

use std::collections::HashMap;

use basin_types::PeerId;

use crate::peer::{Peer, PeerStatus};

/// The set of known remote peers.
#[derive(Debug, Default)]
pub struct PeerSet {
    peers: HashMap<PeerId, Peer>,
}

impl PeerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor for `peer_id`, creating an `Unknown` entry on first
    /// sight.
    pub fn get_peer(&mut self, peer_id: PeerId) -> &Peer {
        self.peers.entry(peer_id).or_insert_with(|| Peer::new(peer_id))
    }

    /// Read-only lookup without creating an entry.
    pub fn peer(&self, peer_id: &PeerId) -> Option<&Peer> {
        self.peers.get(peer_id)
    }

    pub fn update_status(&mut self, peer_id: PeerId, status: PeerStatus) {
        self.entry(peer_id).status = status;
    }

    pub fn update_moniker(&mut self, peer_id: PeerId, moniker: String) {
        self.entry(peer_id).moniker = moniker;
    }

    /// Record the peer's best-known height.
    ///
    /// Monotonic non-decreasing: a lower report can only come from stale
    /// information racing a fresher update and is ignored.
    pub fn update_height(&mut self, peer_id: PeerId, height: u32) {
        let peer = self.entry(peer_id);
        if height > peer.height {
            peer.height = height;
        }
    }

    pub fn update_full_history(&mut self, peer_id: PeerId, full_history: bool) {
        self.entry(peer_id).has_full_history = full_history;
    }

    pub fn increase_received_messages(&mut self, peer_id: PeerId) {
        self.entry(peer_id).received_messages += 1;
    }

    pub fn increase_invalid_messages(&mut self, peer_id: PeerId) {
        self.entry(peer_id).invalid_messages += 1;
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Peer> {
        self.peers.values()
    }

    fn entry(&mut self, peer_id: PeerId) -> &mut Peer {
        self.peers.entry(peer_id).or_insert_with(|| Peer::new(peer_id))
    }
}
