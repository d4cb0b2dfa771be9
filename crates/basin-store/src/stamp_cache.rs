//! # Stamp Cache
//!
//! Bounded insertion-ordered map from a block-hash stamp to the
//! `(height, hash)` pair that produced it. Eviction is strictly
//! oldest-inserted-first: reads never affect eviction order. This is
//! deliberately not an LRU — downstream consumers only ever resolve
//! *recent* stamps, and read-driven reordering would change which
//! entries survive.

use std::collections::{HashMap, VecDeque};

use basin_types::{Hash, Stamp};

/// A recently-seen block, indexed by its stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashPair {
    pub height: u32,
    pub hash: Hash,
}

/// Capacity-bounded FIFO map keyed by [`Stamp`].
#[derive(Debug)]
pub struct StampCache {
    capacity: usize,
    order: VecDeque<Stamp>,
    entries: HashMap<Stamp, HashPair>,
}

impl StampCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Insert or update an entry.
    ///
    /// Re-pushing an existing stamp overwrites its pair (last-write-wins
    /// on truncation collisions) and moves it to the back of the eviction
    /// queue, as a fresh insertion would. Once `len` exceeds capacity the
    /// oldest-inserted entry is evicted.
    pub fn push_back(&mut self, stamp: Stamp, height: u32, hash: Hash) {
        if self.entries.insert(stamp, HashPair { height, hash }).is_some() {
            self.order.retain(|s| *s != stamp);
        }
        self.order.push_back(stamp);

        while self.entries.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    /// Pure lookup; no ordering side effect.
    pub fn get(&self, stamp: &Stamp) -> Option<&HashPair> {
        self.entries.get(stamp)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_with_stamp(stamp: Stamp) -> Hash {
        let mut hash = [0xAAu8; 32];
        hash[..4].copy_from_slice(&stamp);
        hash
    }

    #[test]
    fn test_get_returns_inserted_pair() {
        let mut cache = StampCache::new(4);
        let hash = hash_with_stamp([1, 2, 3, 4]);
        cache.push_back([1, 2, 3, 4], 9, hash);

        let pair = cache.get(&[1, 2, 3, 4]).unwrap();
        assert_eq!(pair.height, 9);
        assert_eq!(pair.hash, hash);
        assert!(cache.get(&[9, 9, 9, 9]).is_none());
    }

    #[test]
    fn test_fifo_eviction_drops_oldest_first() {
        let mut cache = StampCache::new(3);
        for i in 1u8..=4 {
            let stamp = [i, 0, 0, 0];
            cache.push_back(stamp, u32::from(i), hash_with_stamp(stamp));
        }

        assert_eq!(cache.len(), 3);
        assert!(cache.get(&[1, 0, 0, 0]).is_none());
        for i in 2u8..=4 {
            assert!(cache.get(&[i, 0, 0, 0]).is_some());
        }
    }

    #[test]
    fn test_reads_do_not_affect_eviction_order() {
        let mut cache = StampCache::new(2);
        cache.push_back([1, 0, 0, 0], 1, hash_with_stamp([1, 0, 0, 0]));
        cache.push_back([2, 0, 0, 0], 2, hash_with_stamp([2, 0, 0, 0]));

        // Touch the oldest entry; it must still be the eviction victim.
        assert!(cache.get(&[1, 0, 0, 0]).is_some());
        cache.push_back([3, 0, 0, 0], 3, hash_with_stamp([3, 0, 0, 0]));

        assert!(cache.get(&[1, 0, 0, 0]).is_none());
        assert!(cache.get(&[2, 0, 0, 0]).is_some());
    }

    #[test]
    fn test_update_overwrites_and_repushes() {
        let mut cache = StampCache::new(2);
        cache.push_back([1, 0, 0, 0], 1, hash_with_stamp([1, 0, 0, 0]));
        cache.push_back([2, 0, 0, 0], 2, hash_with_stamp([2, 0, 0, 0]));

        // Re-push the first stamp with a new pair, then overflow.
        let newer = hash_with_stamp([1, 0, 0, 0]);
        cache.push_back([1, 0, 0, 0], 10, newer);
        cache.push_back([3, 0, 0, 0], 3, hash_with_stamp([3, 0, 0, 0]));

        assert!(cache.get(&[2, 0, 0, 0]).is_none());
        assert_eq!(cache.get(&[1, 0, 0, 0]).unwrap().height, 10);
        assert_eq!(cache.len(), 2);
    }
}
