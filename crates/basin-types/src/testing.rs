//! Deterministic-enough generators for tests across the workspace.
//!
//! Kept in the library (not behind `cfg(test)`) so downstream crates can
//! build fixtures without duplicating them.

use rand::Rng;

use crate::entities::{
    Account, Address, Block, BlockHeader, Certificate, Hash, PeerId, Transaction, Validator,
};

pub fn generate_test_hash() -> Hash {
    rand::thread_rng().gen()
}

pub fn generate_test_address() -> Address {
    let mut addr = [0u8; 21];
    rand::thread_rng().fill(&mut addr[..]);
    addr[0] = 1;
    addr
}

pub fn generate_test_peer_id() -> PeerId {
    PeerId(rand::thread_rng().gen())
}

pub fn generate_test_certificate() -> Certificate {
    let mut rng = rand::thread_rng();
    Certificate {
        round: rng.gen_range(0..10),
        committers: vec![0, 1, 2, 3],
        absentees: vec![],
        signature: (0..48).map(|_| rng.gen()).collect(),
    }
}

pub fn generate_test_transaction() -> Transaction {
    let mut rng = rand::thread_rng();
    Transaction {
        version: 1,
        stamp: rng.gen(),
        sequence: rng.gen_range(1..1000),
        fee: rng.gen_range(1..10_000),
        payload: (0..rng.gen_range(16..64)).map(|_| rng.gen()).collect(),
        memo: String::new(),
    }
}

/// A block at the given height with a handful of transactions.
///
/// Height only influences the header timestamp; chain linkage across
/// generated blocks is the caller's business.
pub fn generate_test_block(height: u32) -> Block {
    let mut rng = rand::thread_rng();
    Block {
        header: BlockHeader {
            version: 1,
            unix_time: 1_600_000_000 + height * 10,
            prev_block_hash: rng.gen(),
            state_root: rng.gen(),
            proposer_address: generate_test_address(),
        },
        prev_certificate: if height > 1 {
            Some(generate_test_certificate())
        } else {
            None
        },
        transactions: (0..rng.gen_range(1..5))
            .map(|_| generate_test_transaction())
            .collect(),
    }
}

pub fn generate_test_account(number: i32) -> Account {
    let mut rng = rand::thread_rng();
    Account {
        address: generate_test_address(),
        number,
        sequence: rng.gen_range(0..100),
        balance: rng.gen_range(0..1_000_000),
    }
}

pub fn generate_test_validator(number: i32) -> Validator {
    let mut rng = rand::thread_rng();
    Validator {
        address: generate_test_address(),
        number,
        sequence: rng.gen_range(0..100),
        stake: rng.gen_range(1000..1_000_000),
        last_joined_height: 0,
        unbonding_height: 0,
    }
}
