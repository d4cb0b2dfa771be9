//! # Basin Ledger Store
//!
//! The authoritative persistence layer for chain data. One [`LedgerStore`]
//! composes four sub-stores (blocks, transactions, accounts, validators)
//! over a shared key-value port, staging every mutation into a single write
//! batch that commits atomically via [`LedgerStore::write_batch`].
//!
//! ## Key space
//!
//! | Prefix | Record                                   |
//! |--------|------------------------------------------|
//! | `0x00` | last-info singleton (version, height, certificate) |
//! | `0x01` | block by height (hash-prefixed payload)  |
//! | `0x03` | transaction index by id                  |
//! | `0x05` | account by address                       |
//! | `0x07` | validator by address                     |
//! | `0x09` | height by block hash                     |
//!
//! ## Concurrency
//!
//! Every public method holds one mutex for its full duration. Operations
//! are individually atomic; the only cross-call transaction is the
//! `save_block` + `write_batch` pair.

pub mod account_store;
pub mod block_store;
pub mod config;
pub mod error;
pub mod kv;
pub mod stamp_cache;
pub mod store;
pub mod tx_store;
pub mod validator_store;

mod keys;

pub use config::StoreConfig;
pub use error::StoreError;
pub use kv::{BatchOperation, FileBackedKvStore, InMemoryKvStore, KeyValueStore, KvError};
pub use stamp_cache::StampCache;
pub use store::{LedgerStore, StoredBlock, StoredTx};
