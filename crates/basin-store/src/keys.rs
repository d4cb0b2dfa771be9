//! Stable key layout for the shared key-value store.
//!
//! Each sub-store owns one byte prefix. Prefixes are part of the on-disk
//! format and must never be reused.

use basin_types::{Address, Hash, TxId};

pub(crate) const LAST_INFO_KEY: [u8; 1] = [0x00];

const BLOCK_PREFIX: u8 = 0x01;
const TX_PREFIX: u8 = 0x03;
const ACCOUNT_PREFIX: u8 = 0x05;
const VALIDATOR_PREFIX: u8 = 0x07;
const BLOCK_HEIGHT_PREFIX: u8 = 0x09;

pub(crate) fn block_key(height: u32) -> Vec<u8> {
    let mut key = Vec::with_capacity(5);
    key.push(BLOCK_PREFIX);
    key.extend_from_slice(&height.to_be_bytes());
    key
}

pub(crate) fn tx_key(id: &TxId) -> Vec<u8> {
    prefixed(TX_PREFIX, id)
}

pub(crate) fn account_key(addr: &Address) -> Vec<u8> {
    prefixed(ACCOUNT_PREFIX, addr)
}

pub(crate) fn account_prefix() -> Vec<u8> {
    vec![ACCOUNT_PREFIX]
}

pub(crate) fn validator_key(addr: &Address) -> Vec<u8> {
    prefixed(VALIDATOR_PREFIX, addr)
}

pub(crate) fn validator_prefix() -> Vec<u8> {
    vec![VALIDATOR_PREFIX]
}

pub(crate) fn block_height_key(hash: &Hash) -> Vec<u8> {
    prefixed(BLOCK_HEIGHT_PREFIX, hash)
}

fn prefixed(prefix: u8, body: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + body.len());
    key.push(prefix);
    key.extend_from_slice(body);
    key
}
