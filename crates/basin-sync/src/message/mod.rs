//! # Protocol Messages
//!
//! The closed set of message kinds the synchronizer speaks. Dispatch is
//! an exhaustive match over [`Message`]; new kinds are added by extending
//! the enum, not by open-ended registration.

mod blocks_request;
mod blocks_response;
mod hello;
mod proposal;

pub use blocks_request::BlocksRequestMessage;
pub use blocks_response::{BlocksResponseMessage, ResponseCode};
pub use hello::{HelloMessage, HELLO_FLAG_ACK, HELLO_FLAG_FULL_HISTORY};
pub use proposal::ProposalMessage;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// Type tag for logging and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Hello,
    Proposal,
    BlocksRequest,
    BlocksResponse,
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageType::Hello => write!(f, "hello"),
            MessageType::Proposal => write!(f, "proposal"),
            MessageType::BlocksRequest => write!(f, "blocks-request"),
            MessageType::BlocksResponse => write!(f, "blocks-response"),
        }
    }
}

/// A message exchanged between synchronizers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    Hello(HelloMessage),
    Proposal(ProposalMessage),
    BlocksRequest(BlocksRequestMessage),
    BlocksResponse(BlocksResponseMessage),
}

impl Message {
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Hello(_) => MessageType::Hello,
            Message::Proposal(_) => MessageType::Proposal,
            Message::BlocksRequest(_) => MessageType::BlocksRequest,
            Message::BlocksResponse(_) => MessageType::BlocksResponse,
        }
    }

    /// Structural validation before dispatch. Semantic checks (trust,
    /// ranges) belong to the handlers.
    pub fn basic_check(&self) -> Result<(), SyncError> {
        match self {
            Message::Hello(msg) => msg.basic_check(),
            Message::Proposal(msg) => msg.basic_check(),
            Message::BlocksRequest(msg) => msg.basic_check(),
            Message::BlocksResponse(msg) => msg.basic_check(),
        }
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::Hello(msg) => write!(f, "{msg}"),
            Message::Proposal(msg) => write!(f, "{msg}"),
            Message::BlocksRequest(msg) => write!(f, "{msg}"),
            Message::BlocksResponse(msg) => write!(f, "{msg}"),
        }
    }
}
