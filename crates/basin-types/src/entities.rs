//! # Core Ledger Entities
//!
//! Plain data structures for blocks, certificates, transactions, accounts
//! and validators. Hashing is SHA-256 over the bincode encoding; the
//! [`Stamp`] is the first four bytes of a hash and serves as a compact
//! cache key for recently-seen blocks.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A 32-byte SHA-256 digest.
pub type Hash = [u8; 32];

/// A transaction identifier (digest of the transaction encoding).
pub type TxId = Hash;

/// A 21-byte account/validator address (type tag + 20-byte body).
pub type Address = [u8; 21];

/// Truncated block-hash prefix used as a compact lookup key.
pub type Stamp = [u8; 4];

/// The undefined hash, reserved for "no block" / genesis references.
pub const UNDEF_HASH: Hash = [0u8; 32];

/// The stamp of the undefined hash. Always resolves to height 0.
pub const UNDEF_STAMP: Stamp = [0u8; 4];

/// First four bytes of a hash.
pub fn stamp_of(hash: &Hash) -> Stamp {
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Unique identifier for a peer in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct PeerId(pub [u8; 32]);

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0[..6]))
    }
}

/// The header of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockHeader {
    /// Protocol version for this block.
    pub version: u8,
    /// Unix timestamp when the block was proposed.
    pub unix_time: u32,
    /// Hash of the previous block (creates the chain linkage).
    pub prev_block_hash: Hash,
    /// Root hash of the state after applying this block.
    pub state_root: Hash,
    /// Address of the validator that proposed this block.
    pub proposer_address: Address,
}

/// The finalization proof attached to a block.
///
/// Opaque to this layer: signature verification is the consensus
/// engine's concern. The store only persists and returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Certificate {
    /// Consensus round the block was committed in.
    pub round: i16,
    /// Validator numbers that formed the committee.
    pub committers: Vec<i32>,
    /// Committee members that did not sign.
    pub absentees: Vec<i32>,
    /// Aggregated committee signature bytes.
    pub signature: Vec<u8>,
}

impl Certificate {
    pub fn hash(&self) -> Hash {
        digest(&bincode::serialize(self).expect("certificate encoding"))
    }
}

/// A transaction carried inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Transaction {
    /// Transaction format version.
    pub version: u8,
    /// Stamp of a recent block, binding the transaction to the chain.
    pub stamp: Stamp,
    /// Sender sequence number.
    pub sequence: i32,
    /// Fee in base units.
    pub fee: i64,
    /// Payload bytes (transfer, bond, etc. — opaque here).
    pub payload: Vec<u8>,
    /// Optional human-readable memo.
    pub memo: String,
}

impl Transaction {
    /// Transaction ID: digest of the bincode encoding.
    pub fn id(&self) -> TxId {
        digest(&bincode::serialize(self).expect("transaction encoding"))
    }
}

/// A block: header, the previous block's certificate, and transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Block {
    pub header: BlockHeader,
    /// Certificate for the previous block. `None` only for block 1.
    pub prev_certificate: Option<Certificate>,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Block hash: digest over the header and the transaction ids.
    pub fn hash(&self) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(bincode::serialize(&self.header).expect("header encoding"));
        if let Some(cert) = &self.prev_certificate {
            hasher.update(cert.hash());
        }
        for trx in &self.transactions {
            hasher.update(trx.id());
        }
        hasher.finalize().into()
    }

    /// Stamp of this block's hash.
    pub fn stamp(&self) -> Stamp {
        stamp_of(&self.hash())
    }
}

/// An address-keyed account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Account {
    pub address: Address,
    /// Monotonic ordinal assigned at creation, fixes enumeration order.
    pub number: i32,
    pub sequence: i32,
    pub balance: i64,
}

/// An address-keyed validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Validator {
    pub address: Address,
    /// Monotonic ordinal assigned at creation, fixes enumeration order.
    pub number: i32,
    pub sequence: i32,
    pub stake: i64,
    /// Height the validator last joined the committee.
    pub last_joined_height: u32,
    /// Height the validator started unbonding, 0 if bonded.
    pub unbonding_height: u32,
}

fn digest(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn test_stamp_of_takes_hash_prefix() {
        let hash = testing::generate_test_hash();
        let stamp = stamp_of(&hash);
        assert_eq!(stamp, hash[..4]);
    }

    #[test]
    fn test_undef_stamp_matches_undef_hash() {
        assert_eq!(stamp_of(&UNDEF_HASH), UNDEF_STAMP);
    }

    #[test]
    fn test_block_hash_is_stable() {
        let block = testing::generate_test_block(7);
        assert_eq!(block.hash(), block.hash());
    }

    #[test]
    fn test_block_hash_covers_transactions() {
        let mut block = testing::generate_test_block(7);
        let before = block.hash();
        block.transactions.push(testing::generate_test_transaction());
        assert_ne!(before, block.hash());
    }

    #[test]
    fn test_transaction_id_is_stable() {
        let trx = testing::generate_test_transaction();
        assert_eq!(trx.id(), trx.id());
    }
}
