//! Peer descriptor and trust classification.

use basin_types::PeerId;

/// Coarse peer reputation tier gating protocol participation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerStatus {
    /// Seen on the wire, no completed handshake yet.
    Unknown,
    /// Handshake completed.
    Known,
    /// Explicitly trusted by configuration.
    Trusted,
    /// Excluded from the protocol.
    Banned,
}

impl std::fmt::Display for PeerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeerStatus::Unknown => write!(f, "unknown"),
            PeerStatus::Known => write!(f, "known"),
            PeerStatus::Trusted => write!(f, "trusted"),
            PeerStatus::Banned => write!(f, "banned"),
        }
    }
}

/// What the synchronizer knows about one remote peer.
#[derive(Debug, Clone)]
pub struct Peer {
    pub peer_id: PeerId,
    pub status: PeerStatus,
    pub moniker: String,
    /// Best height the peer has advertised. Monotonic non-decreasing;
    /// see [`crate::PeerSet::update_height`].
    pub height: u32,
    /// Whether the peer advertised the full-history capability in its
    /// handshake, meaning it serves arbitrarily deep ranges.
    pub has_full_history: bool,
    pub received_messages: u32,
    pub invalid_messages: u32,
}

impl Peer {
    pub fn new(peer_id: PeerId) -> Self {
        Self {
            peer_id,
            status: PeerStatus::Unknown,
            moniker: String::new(),
            height: 0,
            has_full_history: false,
            received_messages: 0,
            invalid_messages: 0,
        }
    }

    /// Peers below this trust level are neither served nor asked.
    pub fn is_known_or_trusty(&self) -> bool {
        matches!(self.status, PeerStatus::Known | PeerStatus::Trusted)
    }

    pub fn is_banned(&self) -> bool {
        self.status == PeerStatus::Banned
    }
}
