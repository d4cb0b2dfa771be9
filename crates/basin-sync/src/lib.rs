//! # Basin Synchronizer
//!
//! Session-based block catch-up between peers. The [`Synchronizer`] owns
//! the [`PeerSet`] and [`SessionManager`], receives inbound messages from
//! the transport's event channel, dispatches each to its handler, and
//! emits responses back through the [`Network`] port.
//!
//! ```text
//! transport → Synchronizer → handler → {PeerSet, SessionManager, ChainState}
//!                                   → outbound message(s) → transport
//! ```
//!
//! Dispatch is single-threaded: one event at a time, in arrival order, so
//! peer/session state needs no internal locking. Sends are fire-and-forget
//! enqueues; nothing here blocks on network I/O.

pub mod chain;
pub mod config;
pub mod error;
pub mod message;
pub mod peer;
pub mod peer_set;
pub mod ports;
pub mod session;
pub mod synchronizer;
pub mod testing;

mod handlers;

pub use chain::LedgerChain;
pub use config::SyncConfig;
pub use error::SyncError;
pub use message::{
    BlocksRequestMessage, BlocksResponseMessage, HelloMessage, Message, MessageType,
    ProposalMessage, ResponseCode,
};
pub use peer::{Peer, PeerStatus};
pub use peer_set::PeerSet;
pub use ports::{ChainState, Consensus, Network, NetworkEvent};
pub use session::{Session, SessionManager, SessionStatus};
pub use synchronizer::Synchronizer;
