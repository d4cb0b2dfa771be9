//! Block catch-up response.

use serde::{Deserialize, Serialize};

use basin_types::Certificate;

use crate::error::SyncError;

/// Outcome of a blocks-request, carried by every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseCode {
    /// The server is at its open-session cap; try again later.
    Busy,
    /// The server refuses to serve this peer or range.
    Rejected,
    /// A batch of blocks; more responses follow.
    MoreBlocks,
    /// Nothing further for now, but the requester is not caught up.
    NoMoreBlocks,
    /// The requester is caught up; the last certificate is attached.
    Synced,
}

impl std::fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseCode::Busy => write!(f, "busy"),
            ResponseCode::Rejected => write!(f, "rejected"),
            ResponseCode::MoreBlocks => write!(f, "more-blocks"),
            ResponseCode::NoMoreBlocks => write!(f, "no-more-blocks"),
            ResponseCode::Synced => write!(f, "synced"),
        }
    }
}

/// Answers a [`crate::BlocksRequestMessage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlocksResponseMessage {
    pub code: ResponseCode,
    /// Session id this response correlates to.
    pub session_id: i32,
    /// Height of the first carried block (or the server height for
    /// `Synced`).
    pub from: u32,
    /// Raw block payloads for consecutive heights starting at `from`.
    pub blocks: Vec<Vec<u8>>,
    /// Attached to `Synced` so the requester can finalize.
    pub last_certificate: Option<Certificate>,
}

impl BlocksResponseMessage {
    pub fn new(
        code: ResponseCode,
        session_id: i32,
        from: u32,
        blocks: Vec<Vec<u8>>,
        last_certificate: Option<Certificate>,
    ) -> Self {
        Self {
            code,
            session_id,
            from,
            blocks,
            last_certificate,
        }
    }

    pub fn is_request_rejected(&self) -> bool {
        matches!(self.code, ResponseCode::Busy | ResponseCode::Rejected)
    }

    pub fn count(&self) -> u32 {
        self.blocks.len() as u32
    }

    /// Height of the last carried block, saturating at the height
    /// limit.
    pub fn last_height(&self) -> u32 {
        if self.blocks.is_empty() {
            0
        } else {
            self.from.saturating_add(self.count() - 1)
        }
    }

    pub fn basic_check(&self) -> Result<(), SyncError> {
        match self.code {
            ResponseCode::MoreBlocks => {
                if self.blocks.is_empty() {
                    return Err(SyncError::InvalidMessage(
                        "more-blocks response without blocks".to_string(),
                    ));
                }
                if self.from == 0 {
                    return Err(SyncError::InvalidMessage(
                        "blocks starting at height 0".to_string(),
                    ));
                }
            }
            ResponseCode::Synced => {
                if self.last_certificate.is_none() {
                    return Err(SyncError::InvalidMessage(
                        "synced response without certificate".to_string(),
                    ));
                }
            }
            _ => {
                if !self.blocks.is_empty() {
                    return Err(SyncError::InvalidMessage(format!(
                        "{} response carrying blocks",
                        self.code
                    )));
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for BlocksResponseMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{blocks-response {} #{} from: {} count: {}}}",
            self.code,
            self.session_id,
            self.from,
            self.count()
        )
    }
}
