//! Ledger store lifecycle tests against the file-backed adapter:
//! everything a restart must and must not carry over.

use std::fs;
use std::path::PathBuf;

use basin_store::{FileBackedKvStore, LedgerStore, StoreConfig};
use basin_types::{stamp_of, testing, Block, Certificate};

struct TempDb {
    path: PathBuf,
}

impl TempDb {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!(
            "basin-tests-{}-{:x}.db",
            std::process::id(),
            rand::random::<u64>()
        ));
        Self { path }
    }

    fn open(&self) -> FileBackedKvStore {
        FileBackedKvStore::open(&self.path).expect("open backing file")
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Chained test blocks plus the certificate that finalizes the tip.
fn make_chain(height: u32) -> (Vec<Block>, Certificate) {
    let blocks: Vec<Block> = (1..=height).map(testing::generate_test_block).collect();
    (blocks, testing::generate_test_certificate())
}

fn commit_chain(
    store: &LedgerStore<FileBackedKvStore>,
    blocks: &[Block],
    tip_cert: &Certificate,
) {
    for (i, block) in blocks.iter().enumerate() {
        let cert = blocks
            .get(i + 1)
            .and_then(|next| next.prev_certificate.as_ref())
            .unwrap_or(tip_cert);
        store.save_block(i as u32 + 1, block, cert).unwrap();
        store.write_batch().unwrap();
    }
}

#[test]
fn test_committed_state_survives_reopen() {
    let db = TempDb::new();
    let config = StoreConfig::default();
    let (blocks, tip_cert) = make_chain(5);

    let store = LedgerStore::open(&config, db.open()).unwrap();
    commit_chain(&store, &blocks, &tip_cert);
    let hash_at_3 = store.block_hash(3);
    let tx_id = blocks[2].transactions[0].id();
    drop(store.close());

    let store = LedgerStore::open(&config, db.open()).unwrap();
    let (height, cert) = store.last_certificate();
    assert_eq!(height, 5);
    assert_eq!(cert, Some(tip_cert));

    assert_eq!(store.block_hash(3), hash_at_3);
    assert_eq!(store.block_height(&hash_at_3), 3);

    let stored = store.transaction(&tx_id).unwrap();
    assert_eq!(stored.height, 3);
    assert_eq!(stored.block_time, blocks[2].header.unix_time);
    assert_eq!(
        stored.data,
        bincode::serialize(&blocks[2].transactions[0]).unwrap()
    );
}

#[test]
fn test_stamp_lookups_survive_reopen() {
    let db = TempDb::new();
    let config = StoreConfig::default();
    let (blocks, tip_cert) = make_chain(5);

    let store = LedgerStore::open(&config, db.open()).unwrap();
    commit_chain(&store, &blocks, &tip_cert);
    let stamp = stamp_of(&store.block_hash(4));
    drop(store.close());

    let store = LedgerStore::open(&config, db.open()).unwrap();
    assert_eq!(store.find_block_height_by_stamp(&stamp), Some(4));
}

#[test]
fn test_stamp_rehydration_is_bounded_by_capacity() {
    let db = TempDb::new();
    let config = StoreConfig {
        stamp_cache_capacity: 2,
        ..StoreConfig::default()
    };
    let (blocks, tip_cert) = make_chain(5);

    let store = LedgerStore::open(&config, db.open()).unwrap();
    commit_chain(&store, &blocks, &tip_cert);
    let old_stamp = stamp_of(&store.block_hash(1));
    let recent_stamp = stamp_of(&store.block_hash(5));
    drop(store.close());

    let store = LedgerStore::open(&config, db.open()).unwrap();
    assert_eq!(store.find_block_height_by_stamp(&recent_stamp), Some(5));
    assert_eq!(store.find_block_height_by_stamp(&old_stamp), None);
}

#[test]
fn test_staged_but_uncommitted_blocks_do_not_survive() {
    let db = TempDb::new();
    let config = StoreConfig::default();
    let (blocks, tip_cert) = make_chain(2);

    let store = LedgerStore::open(&config, db.open()).unwrap();
    store.save_block(1, &blocks[0], &tip_cert).unwrap();
    // No write_batch: the stage never hits the backing file.
    drop(store.close());

    let store = LedgerStore::open(&config, db.open()).unwrap();
    assert_eq!(store.last_certificate().0, 0);
    assert!(store.block(1).is_err());
}
