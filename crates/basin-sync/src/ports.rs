//! # Outbound Ports
//!
//! Interfaces the synchronizer drives but does not implement: the
//! transport, the chain state it syncs against, and the consensus
//! engine proposals are relayed to.

use basin_types::{Certificate, PeerId};

use crate::error::SyncError;
use crate::message::Message;

/// Inbound event delivered by the transport.
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    /// A peer sent us a protocol message.
    Message { from: PeerId, message: Message },
    /// A new connection was established.
    Connected(PeerId),
    /// A connection went away.
    Disconnected(PeerId),
}

/// The peer-to-peer transport, consumed as an interface.
///
/// Sends must be best-effort, non-blocking enqueues; the dispatch loop
/// never awaits a remote response while holding its state.
pub trait Network: Send {
    fn send_to(&self, message: Message, to: PeerId);
    fn broadcast(&self, message: Message);
    fn self_id(&self) -> PeerId;
    fn num_connected_peers(&self) -> usize;
}

/// The local chain the synchronizer serves from and applies to.
///
/// Validation rules live behind this port; the synchronizer only moves
/// bytes and tracks protocol state.
pub trait ChainState: Send {
    /// Height of the highest committed block, 0 when empty.
    fn last_block_height(&self) -> u32;

    /// Certificate of the highest committed block, `None` when empty.
    fn last_certificate(&self) -> Option<Certificate>;

    /// Raw payload of a committed block, `None` if not committed.
    fn block_data(&self, height: u32) -> Option<Vec<u8>>;

    /// Apply a block received from a peer. Blocks arrive in height
    /// order within a session.
    fn add_block(&self, height: u32, data: &[u8]) -> Result<(), SyncError>;

    /// Finalize the chain tip with the certificate attached to a
    /// `Synced` response.
    fn commit_certificate(&self, cert: &Certificate) -> Result<(), SyncError>;
}

/// The consensus engine, consumed as an interface.
pub trait Consensus: Send {
    /// Hand over a relayed proposal.
    fn set_proposal(&self, height: u32, round: i16, payload: Vec<u8>);
}
