//! # Basin Shared Types
//!
//! Core ledger entities shared by the storage engine and the synchronizer.
//!
//! ## Clusters
//!
//! - **Chain**: [`Block`], [`BlockHeader`], [`Certificate`], [`Transaction`]
//! - **State**: [`Account`], [`Validator`]
//! - **Networking**: [`PeerId`]
//! - **Primitives**: [`Hash`], [`Stamp`], [`Address`]
//!
//! All persisted entities derive `Serialize`/`Deserialize` and are encoded
//! with bincode by the storage layer.

pub mod entities;
pub mod testing;

pub use entities::{
    stamp_of, Account, Address, Block, BlockHeader, Certificate, Hash, PeerId, Stamp, Transaction,
    TxId, Validator, UNDEF_HASH, UNDEF_STAMP,
};
