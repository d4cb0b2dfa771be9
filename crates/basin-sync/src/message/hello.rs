//! Handshake message.

use serde::{Deserialize, Serialize};

use basin_types::PeerId;

use crate::error::SyncError;

/// Set when this hello answers another hello.
pub const HELLO_FLAG_ACK: u32 = 0x1;
/// Set when the sender retains and serves full history.
pub const HELLO_FLAG_FULL_HISTORY: u32 = 0x2;

const MAX_MONIKER_LENGTH: usize = 64;

/// Introduces a peer: who it is, what it calls itself, how tall its
/// chain is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloMessage {
    /// The sender's own id; must match the transport-level sender.
    pub peer_id: PeerId,
    pub moniker: String,
    pub height: u32,
    pub flags: u32,
}

impl HelloMessage {
    pub fn new(peer_id: PeerId, moniker: impl Into<String>, height: u32, flags: u32) -> Self {
        Self {
            peer_id,
            moniker: moniker.into(),
            height,
            flags,
        }
    }

    pub fn is_ack(&self) -> bool {
        self.flags & HELLO_FLAG_ACK != 0
    }

    pub fn has_full_history(&self) -> bool {
        self.flags & HELLO_FLAG_FULL_HISTORY != 0
    }

    pub fn basic_check(&self) -> Result<(), SyncError> {
        if self.moniker.len() > MAX_MONIKER_LENGTH {
            return Err(SyncError::InvalidMessage(format!(
                "moniker is {} bytes, max {MAX_MONIKER_LENGTH}",
                self.moniker.len()
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for HelloMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{hello {} height: {}}}", self.moniker, self.height)
    }
}
