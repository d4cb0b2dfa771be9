//! Account sub-store.

use basin_types::{Account, Address};

use crate::error::StoreError;
use crate::keys;
use crate::kv::{BatchOperation, KeyValueStore};

/// Typed access to the account key range, plus the running total.
#[derive(Debug)]
pub(crate) struct AccountStore {
    total: i32,
}

impl AccountStore {
    /// Count committed accounts so the total survives restarts.
    pub(crate) fn open<KV: KeyValueStore>(kv: &KV) -> Result<Self, StoreError> {
        let total = kv.prefix_scan(&keys::account_prefix())?.len() as i32;
        Ok(Self { total })
    }

    pub(crate) fn has<KV: KeyValueStore>(
        &self,
        kv: &KV,
        addr: &Address,
    ) -> Result<bool, StoreError> {
        Ok(kv.exists(&keys::account_key(addr))?)
    }

    pub(crate) fn account<KV: KeyValueStore>(
        &self,
        kv: &KV,
        addr: &Address,
    ) -> Result<Account, StoreError> {
        let data = kv.get(&keys::account_key(addr))?.ok_or(StoreError::NotFound)?;
        Ok(bincode::deserialize(&data)?)
    }

    /// Stage an account write. New addresses bump the total.
    pub(crate) fn update<KV: KeyValueStore>(
        &mut self,
        kv: &KV,
        batch: &mut Vec<BatchOperation>,
        acc: &Account,
    ) -> Result<(), StoreError> {
        if !self.has(kv, &acc.address)? {
            self.total += 1;
        }
        batch.push(BatchOperation::put(
            keys::account_key(&acc.address),
            bincode::serialize(acc)?,
        ));
        Ok(())
    }

    pub(crate) fn total(&self) -> i32 {
        self.total
    }

    /// Visit committed accounts in ordinal order until the consumer
    /// returns `true`.
    pub(crate) fn iterate<KV, F>(&self, kv: &KV, mut consumer: F) -> Result<(), StoreError>
    where
        KV: KeyValueStore,
        F: FnMut(&Account) -> bool,
    {
        let mut accounts = Vec::new();
        for (_, value) in kv.prefix_scan(&keys::account_prefix())? {
            accounts.push(bincode::deserialize::<Account>(&value)?);
        }
        accounts.sort_by_key(|acc| acc.number);
        for acc in &accounts {
            if consumer(acc) {
                break;
            }
        }
        Ok(())
    }
}
