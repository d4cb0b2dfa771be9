//! # Basin Test Suite
//!
//! Cross-crate integration tests: scenarios that exercise the storage
//! engine and the synchronizer together, beyond what each crate's unit
//! tests cover.
//!
//! ```bash
//! cargo test -p basin-tests
//! ```

#[cfg(test)]
mod integration;
