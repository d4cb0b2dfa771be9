//! # Ledger Chain Adapter
//!
//! Implements [`ChainState`] over a [`LedgerStore`]. A block can only be
//! committed once its certificate is known, and a block's certificate
//! travels with its *successor* (as `prev_certificate`) or, for the tip,
//! with the `Synced` response. The adapter therefore holds exactly one
//! pending block and commits it when the next block or the final
//! certificate arrives.

use std::sync::Arc;

use parking_lot::Mutex;

use basin_store::{KeyValueStore, LedgerStore};
use basin_types::{Block, Certificate};

use crate::error::SyncError;
use crate::ports::ChainState;

/// [`ChainState`] backed by the ledger store.
pub struct LedgerChain<KV: KeyValueStore> {
    store: Arc<LedgerStore<KV>>,
    pending: Mutex<Option<(u32, Block)>>,
}

impl<KV: KeyValueStore> LedgerChain<KV> {
    pub fn new(store: Arc<LedgerStore<KV>>) -> Self {
        Self {
            store,
            pending: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &Arc<LedgerStore<KV>> {
        &self.store
    }

    fn commit(&self, height: u32, block: &Block, cert: &Certificate) -> Result<(), SyncError> {
        self.store.save_block(height, block, cert)?;
        self.store.write_batch()?;
        Ok(())
    }
}

impl<KV: KeyValueStore> ChainState for LedgerChain<KV> {
    fn last_block_height(&self) -> u32 {
        self.store.last_certificate().0
    }

    fn last_certificate(&self) -> Option<Certificate> {
        self.store.last_certificate().1
    }

    fn block_data(&self, height: u32) -> Option<Vec<u8>> {
        self.store.block(height).ok().map(|stored| stored.data)
    }

    fn add_block(&self, height: u32, data: &[u8]) -> Result<(), SyncError> {
        let block: Block = bincode::deserialize(data)?;
        let mut pending = self.pending.lock();

        if let Some((pending_height, pending_block)) = pending.take() {
            if pending_height + 1 == height {
                let cert = block.prev_certificate.clone().ok_or_else(|| {
                    SyncError::InvalidMessage(format!(
                        "block {height} carries no certificate for block {pending_height}"
                    ))
                })?;
                self.commit(pending_height, &pending_block, &cert)?;
            } else {
                // Stale leftover from an abandoned session.
                tracing::debug!(pending_height, height, "dropping stale pending block");
            }
        }

        *pending = Some((height, block));
        Ok(())
    }

    fn commit_certificate(&self, cert: &Certificate) -> Result<(), SyncError> {
        let mut pending = self.pending.lock();
        if let Some((height, block)) = pending.take() {
            self.commit(height, &block, cert)?;
        }
        Ok(())
    }
}
