//! Block catch-up request.

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// Asks a peer for blocks in the height range `[from, to]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlocksRequestMessage {
    /// The requester's session id; echoed by every response.
    pub session_id: i32,
    pub from: u32,
    pub to: u32,
}

impl BlocksRequestMessage {
    pub fn new(session_id: i32, from: u32, to: u32) -> Self {
        Self { session_id, from, to }
    }

    pub fn basic_check(&self) -> Result<(), SyncError> {
        if self.from == 0 {
            return Err(SyncError::InvalidMessage(
                "request starts at height 0".to_string(),
            ));
        }
        if self.from > self.to {
            return Err(SyncError::InvalidMessage(format!(
                "invalid range: [{}, {}]",
                self.from, self.to
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for BlocksRequestMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{blocks-request #{} [{}, {}]}}",
            self.session_id, self.from, self.to
        )
    }
}
