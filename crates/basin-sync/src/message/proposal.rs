//! Consensus proposal relay message.
//!
//! The synchronizer only relays proposals; their content is opaque here
//! and handed to the consensus port after structural checks.

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalMessage {
    pub height: u32,
    pub round: i16,
    /// Opaque proposal bytes for the consensus engine.
    pub payload: Vec<u8>,
}

impl ProposalMessage {
    pub fn new(height: u32, round: i16, payload: Vec<u8>) -> Self {
        Self {
            height,
            round,
            payload,
        }
    }

    pub fn basic_check(&self) -> Result<(), SyncError> {
        if self.round < 0 {
            return Err(SyncError::InvalidMessage(format!(
                "invalid round: {}",
                self.round
            )));
        }
        if self.height == 0 {
            return Err(SyncError::InvalidMessage("invalid height: 0".to_string()));
        }
        if self.payload.is_empty() {
            return Err(SyncError::InvalidMessage("empty proposal".to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Display for ProposalMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{proposal {}/{}}}", self.height, self.round)
    }
}
