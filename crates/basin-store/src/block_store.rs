//! Block sub-store.
//!
//! Blocks are keyed by height; the value is the block hash followed by the
//! block payload. A secondary index maps block hash back to height. The
//! payload is written piecewise so per-transaction byte ranges are known
//! at save time, while staying byte-identical to the bincode encoding of
//! the whole [`Block`] (fields in declaration order, fixed-width little
//! endian lengths). Receivers can therefore decode a served payload with
//! a single `bincode::deserialize`.

use basin_types::{Block, Hash, TxId};

use crate::error::StoreError;
use crate::keys;
use crate::kv::{BatchOperation, KeyValueStore};
use crate::tx_store::TxPosition;

pub(crate) const HASH_SIZE: usize = 32;

/// Stage a block write and return its hash plus per-transaction positions.
///
/// Offsets are relative to the payload (the stored value minus its 32-byte
/// hash prefix).
pub(crate) fn save(
    batch: &mut Vec<BatchOperation>,
    height: u32,
    block: &Block,
) -> Result<(Hash, Vec<(TxId, TxPosition)>), StoreError> {
    let hash = block.hash();

    let mut payload = bincode::serialize(&block.header)?;
    payload.extend(bincode::serialize(&block.prev_certificate)?);
    payload.extend((block.transactions.len() as u64).to_le_bytes());

    let mut positions = Vec::with_capacity(block.transactions.len());
    for trx in &block.transactions {
        let bytes = bincode::serialize(trx)?;
        positions.push((
            trx.id(),
            TxPosition {
                height,
                offset: payload.len() as u32,
                length: bytes.len() as u32,
                block_time: block.header.unix_time,
            },
        ));
        payload.extend(bytes);
    }

    let mut value = Vec::with_capacity(HASH_SIZE + payload.len());
    value.extend_from_slice(&hash);
    value.extend_from_slice(&payload);

    batch.push(BatchOperation::put(keys::block_key(height), value));
    batch.push(BatchOperation::put(
        keys::block_height_key(&hash),
        height.to_be_bytes().to_vec(),
    ));

    Ok((hash, positions))
}

/// Read a committed block: its hash and raw payload.
pub(crate) fn block<KV: KeyValueStore>(
    kv: &KV,
    height: u32,
) -> Result<(Hash, Vec<u8>), StoreError> {
    let data = kv
        .get(&keys::block_key(height))?
        .ok_or(StoreError::NotFound)?;
    if data.len() < HASH_SIZE {
        return Err(StoreError::Corrupted(format!(
            "block record at height {height} is {} bytes",
            data.len()
        )));
    }
    let mut hash: Hash = [0u8; HASH_SIZE];
    hash.copy_from_slice(&data[..HASH_SIZE]);
    Ok((hash, data[HASH_SIZE..].to_vec()))
}

/// Height of the block with the given hash, 0 when unknown.
pub(crate) fn block_height<KV: KeyValueStore>(kv: &KV, hash: &Hash) -> Result<u32, StoreError> {
    match kv.get(&keys::block_height_key(hash))? {
        Some(data) => {
            let bytes: [u8; 4] = data
                .as_slice()
                .try_into()
                .map_err(|_| StoreError::Corrupted("height index entry".to_string()))?;
            Ok(u32::from_be_bytes(bytes))
        }
        None => Ok(0),
    }
}
