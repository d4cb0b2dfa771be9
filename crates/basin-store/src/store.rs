//! # Ledger Store Engine
//!
//! Composes the sub-stores and the stamp cache behind one mutex and one
//! write batch. `save_block` only stages; nothing becomes visible to
//! readers of committed state until `write_batch` lands atomically.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use basin_types::{
    stamp_of, Account, Address, Block, Certificate, Hash, Stamp, TxId, Validator, UNDEF_HASH,
    UNDEF_STAMP,
};

use crate::account_store::AccountStore;
use crate::block_store;
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::keys;
use crate::kv::{BatchOperation, KeyValueStore};
use crate::stamp_cache::StampCache;
use crate::tx_store;
use crate::validator_store::ValidatorStore;

/// Version tag embedded in the last-info record. A mismatch means the
/// store predates a supported format and is treated as empty.
const LAST_STORE_VERSION: i32 = 1;

/// The singleton record tracking the chain tip.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LastInfo {
    version: i32,
    height: u32,
    certificate: Certificate,
}

/// A committed block as returned by [`LedgerStore::block`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlock {
    pub hash: Hash,
    pub height: u32,
    /// Raw block payload; decodes as a [`Block`] via bincode.
    pub data: Vec<u8>,
}

/// A committed transaction as returned by [`LedgerStore::transaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTx {
    pub id: TxId,
    pub height: u32,
    pub block_time: u32,
    /// Raw transaction bytes sliced out of the owning block payload.
    pub data: Vec<u8>,
}

struct Inner<KV: KeyValueStore> {
    kv: KV,
    batch: Vec<BatchOperation>,
    accounts: AccountStore,
    validators: ValidatorStore,
    stamp_cache: StampCache,
}

/// The durable ledger store.
///
/// Every public method acquires one mutex for its full duration. The
/// only cross-call transaction is `save_block` + `write_batch`.
pub struct LedgerStore<KV: KeyValueStore> {
    inner: Mutex<Inner<KV>>,
}

impl<KV: KeyValueStore> LedgerStore<KV> {
    /// Open the store over `kv` and rehydrate the stamp cache from the
    /// most recent committed blocks, so restarts serve stamp lookups
    /// without holding the full chain in memory.
    pub fn open(config: &StoreConfig, kv: KV) -> Result<Self, StoreError> {
        let accounts = AccountStore::open(&kv)?;
        let validators = ValidatorStore::open(&kv)?;
        let mut inner = Inner {
            kv,
            batch: Vec::new(),
            accounts,
            validators,
            stamp_cache: StampCache::new(config.stamp_cache_capacity),
        };

        let (last_height, _) = read_last_info(&inner.kv);
        if last_height > 0 {
            let capacity = config.stamp_cache_capacity as u32;
            let from = if last_height > capacity {
                last_height - capacity + 1
            } else {
                1
            };
            for height in from..=last_height {
                let (hash, _) = block_store::block(&inner.kv, height)?;
                inner.stamp_cache.push_back(stamp_of(&hash), height, hash);
            }
            tracing::debug!(
                last_height,
                stamps = inner.stamp_cache.len(),
                "ledger store opened"
            );
        }

        Ok(Self {
            inner: Mutex::new(inner),
        })
    }

    /// Tear down the store and hand back the key-value adapter.
    pub fn close(self) -> KV {
        self.inner.into_inner().kv
    }

    /// Stage a block, its transaction index entries and the last-info
    /// record into the pending batch, and index the block's stamp.
    ///
    /// Does not flush; call [`LedgerStore::write_batch`]. Height
    /// contiguity is the caller's responsibility.
    pub fn save_block(
        &self,
        height: u32,
        block: &Block,
        cert: &Certificate,
    ) -> Result<(), StoreError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let (hash, positions) = block_store::save(&mut inner.batch, height, block)?;
        for (id, pos) in &positions {
            tx_store::save(&mut inner.batch, id, pos)?;
        }

        let last_info = LastInfo {
            version: LAST_STORE_VERSION,
            height,
            certificate: cert.clone(),
        };
        inner.batch.push(BatchOperation::put(
            keys::LAST_INFO_KEY.to_vec(),
            bincode::serialize(&last_info)?,
        ));

        inner.stamp_cache.push_back(stamp_of(&hash), height, hash);

        tracing::debug!(
            height,
            hash = %hex::encode(&hash[..8]),
            txs = block.transactions.len(),
            "block staged"
        );
        Ok(())
    }

    /// Commit everything staged since the last commit, atomically.
    ///
    /// On failure the staged batch is kept and previously committed
    /// state is intact.
    pub fn write_batch(&self) -> Result<(), StoreError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let staged = inner.batch.clone();
        let count = staged.len();
        inner.kv.atomic_batch_write(staged)?;
        inner.batch.clear();
        tracing::debug!(operations = count, "batch committed");
        Ok(())
    }

    /// Read a committed block by height.
    pub fn block(&self, height: u32) -> Result<StoredBlock, StoreError> {
        let guard = self.inner.lock();
        let (hash, data) = block_store::block(&guard.kv, height)?;
        Ok(StoredBlock { hash, height, data })
    }

    /// Hash of the block at `height`, or the undefined hash.
    pub fn block_hash(&self, height: u32) -> Hash {
        let guard = self.inner.lock();
        match block_store::block(&guard.kv, height) {
            Ok((hash, _)) => hash,
            Err(_) => UNDEF_HASH,
        }
    }

    /// Height of the block with `hash`, or 0 when unknown.
    pub fn block_height(&self, hash: &Hash) -> u32 {
        let guard = self.inner.lock();
        block_store::block_height(&guard.kv, hash).unwrap_or(0)
    }

    /// Resolve a stamp to a full block hash via the cache only.
    ///
    /// The all-zero stamp always resolves to the undefined hash,
    /// independent of cache contents.
    pub fn find_block_hash_by_stamp(&self, stamp: &Stamp) -> Option<Hash> {
        if *stamp == UNDEF_STAMP {
            return Some(UNDEF_HASH);
        }
        let guard = self.inner.lock();
        guard.stamp_cache.get(stamp).map(|pair| pair.hash)
    }

    /// Resolve a stamp to a block height via the cache only.
    ///
    /// The all-zero stamp always resolves to height 0.
    pub fn find_block_height_by_stamp(&self, stamp: &Stamp) -> Option<u32> {
        if *stamp == UNDEF_STAMP {
            return Some(0);
        }
        let guard = self.inner.lock();
        guard.stamp_cache.get(stamp).map(|pair| pair.height)
    }

    /// Look up a transaction by id, slicing its bytes out of the owning
    /// block's payload. An index entry pointing outside the payload is a
    /// data-integrity error, not a miss.
    pub fn transaction(&self, id: &TxId) -> Result<StoredTx, StoreError> {
        let guard = self.inner.lock();
        let pos = tx_store::position(&guard.kv, id)?;
        let (_, payload) = block_store::block(&guard.kv, pos.height)?;

        let start = pos.offset as usize;
        let end = start + pos.length as usize;
        if end > payload.len() {
            return Err(StoreError::OffsetOutOfRange {
                start,
                end,
                size: payload.len(),
            });
        }

        Ok(StoredTx {
            id: *id,
            height: pos.height,
            block_time: pos.block_time,
            data: payload[start..end].to_vec(),
        })
    }

    pub fn has_account(&self, addr: &Address) -> Result<bool, StoreError> {
        let guard = self.inner.lock();
        guard.accounts.has(&guard.kv, addr)
    }

    pub fn account(&self, addr: &Address) -> Result<Account, StoreError> {
        let guard = self.inner.lock();
        guard.accounts.account(&guard.kv, addr)
    }

    /// Stage an account write into the current batch.
    pub fn update_account(&self, acc: &Account) -> Result<(), StoreError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.accounts.update(&inner.kv, &mut inner.batch, acc)
    }

    pub fn total_accounts(&self) -> i32 {
        self.inner.lock().accounts.total()
    }

    /// Visit committed accounts in ordinal order; return `true` from the
    /// consumer to stop early.
    pub fn iterate_accounts<F>(&self, consumer: F) -> Result<(), StoreError>
    where
        F: FnMut(&Account) -> bool,
    {
        let guard = self.inner.lock();
        guard.accounts.iterate(&guard.kv, consumer)
    }

    pub fn has_validator(&self, addr: &Address) -> Result<bool, StoreError> {
        let guard = self.inner.lock();
        guard.validators.has(&guard.kv, addr)
    }

    pub fn validator(&self, addr: &Address) -> Result<Validator, StoreError> {
        let guard = self.inner.lock();
        guard.validators.validator(&guard.kv, addr)
    }

    pub fn validator_by_number(&self, number: i32) -> Result<Validator, StoreError> {
        let guard = self.inner.lock();
        guard.validators.validator_by_number(&guard.kv, number)
    }

    /// Stage a validator write into the current batch.
    pub fn update_validator(&self, val: &Validator) -> Result<(), StoreError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.validators.update(&inner.kv, &mut inner.batch, val)
    }

    pub fn total_validators(&self) -> i32 {
        self.inner.lock().validators.total()
    }

    /// Visit committed validators in ordinal order; return `true` from
    /// the consumer to stop early.
    pub fn iterate_validators<F>(&self, consumer: F) -> Result<(), StoreError>
    where
        F: FnMut(&Validator) -> bool,
    {
        let guard = self.inner.lock();
        guard.validators.iterate(&guard.kv, consumer)
    }

    /// The highest committed height and its certificate.
    ///
    /// Returns `(0, None)` on an empty store, and also on a version or
    /// decode mismatch: that only legitimately happens when the store
    /// predates a supported format.
    pub fn last_certificate(&self) -> (u32, Option<Certificate>) {
        let guard = self.inner.lock();
        read_last_info(&guard.kv)
    }

    #[cfg(test)]
    pub(crate) fn with_kv_mut<F: FnOnce(&mut KV)>(&self, f: F) {
        f(&mut self.inner.lock().kv)
    }
}

fn read_last_info<KV: KeyValueStore>(kv: &KV) -> (u32, Option<Certificate>) {
    let data = match kv.get(&keys::LAST_INFO_KEY) {
        Ok(Some(data)) => data,
        _ => return (0, None),
    };
    match bincode::deserialize::<LastInfo>(&data) {
        Ok(info) if info.version == LAST_STORE_VERSION => (info.height, Some(info.certificate)),
        _ => (0, None),
    }
}
