//! Transaction index sub-store.
//!
//! Transactions are not stored independently; the index maps a
//! transaction id to its position inside the owning block's payload.

use basin_types::TxId;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::keys;
use crate::kv::{BatchOperation, KeyValueStore};

/// Where a transaction's bytes live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxPosition {
    /// Height of the owning block.
    pub height: u32,
    /// Byte offset within the block payload.
    pub offset: u32,
    /// Length of the transaction encoding.
    pub length: u32,
    /// Timestamp of the owning block.
    pub block_time: u32,
}

pub(crate) fn save(
    batch: &mut Vec<BatchOperation>,
    id: &TxId,
    pos: &TxPosition,
) -> Result<(), StoreError> {
    batch.push(BatchOperation::put(keys::tx_key(id), bincode::serialize(pos)?));
    Ok(())
}

pub(crate) fn position<KV: KeyValueStore>(kv: &KV, id: &TxId) -> Result<TxPosition, StoreError> {
    let data = kv.get(&keys::tx_key(id))?.ok_or(StoreError::NotFound)?;
    Ok(bincode::deserialize(&data)?)
}
