//! Validator sub-store.

use basin_types::{Address, Validator};

use crate::error::StoreError;
use crate::keys;
use crate::kv::{BatchOperation, KeyValueStore};

/// Typed access to the validator key range, plus the running total.
#[derive(Debug)]
pub(crate) struct ValidatorStore {
    total: i32,
}

impl ValidatorStore {
    pub(crate) fn open<KV: KeyValueStore>(kv: &KV) -> Result<Self, StoreError> {
        let total = kv.prefix_scan(&keys::validator_prefix())?.len() as i32;
        Ok(Self { total })
    }

    pub(crate) fn has<KV: KeyValueStore>(
        &self,
        kv: &KV,
        addr: &Address,
    ) -> Result<bool, StoreError> {
        Ok(kv.exists(&keys::validator_key(addr))?)
    }

    pub(crate) fn validator<KV: KeyValueStore>(
        &self,
        kv: &KV,
        addr: &Address,
    ) -> Result<Validator, StoreError> {
        let data = kv
            .get(&keys::validator_key(addr))?
            .ok_or(StoreError::NotFound)?;
        Ok(bincode::deserialize(&data)?)
    }

    /// Linear scan by ordinal. The validator set is small enough that a
    /// dedicated number index has not been worth its write cost.
    pub(crate) fn validator_by_number<KV: KeyValueStore>(
        &self,
        kv: &KV,
        number: i32,
    ) -> Result<Validator, StoreError> {
        let mut found = None;
        self.iterate(kv, |val| {
            if val.number == number {
                found = Some(val.clone());
                return true;
            }
            false
        })?;
        found.ok_or(StoreError::NotFound)
    }

    pub(crate) fn update<KV: KeyValueStore>(
        &mut self,
        kv: &KV,
        batch: &mut Vec<BatchOperation>,
        val: &Validator,
    ) -> Result<(), StoreError> {
        if !self.has(kv, &val.address)? {
            self.total += 1;
        }
        batch.push(BatchOperation::put(
            keys::validator_key(&val.address),
            bincode::serialize(val)?,
        ));
        Ok(())
    }

    pub(crate) fn total(&self) -> i32 {
        self.total
    }

    /// Visit committed validators in ordinal order until the consumer
    /// returns `true`.
    pub(crate) fn iterate<KV, F>(&self, kv: &KV, mut consumer: F) -> Result<(), StoreError>
    where
        KV: KeyValueStore,
        F: FnMut(&Validator) -> bool,
    {
        let mut validators = Vec::new();
        for (_, value) in kv.prefix_scan(&keys::validator_prefix())? {
            validators.push(bincode::deserialize::<Validator>(&value)?);
        }
        validators.sort_by_key(|val| val.number);
        for val in &validators {
            if consumer(val) {
                break;
            }
        }
        Ok(())
    }
}
