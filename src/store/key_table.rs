//! Separate-chaining hash table from key to dense insertion slot.
//!
//! The slot assigned to a key is its index in the chain-node store, so
//! `len()` doubles as the number of inserted items and slot numbering
//! stays in lock-step with any other store appended alongside this one.
//! Chains are threaded through the node store itself; new nodes are
//! always appended at strictly greater indices, so every `next` link
//! points forward and chain walks terminate.

use crate::error::{IndexError, Result};
use crate::store::paged::PagedBytes;

/// Chain terminator and "no such slot" marker inside stored records.
const NO_INDEX: u32 = u32::MAX;

/// Bytes per chain node: two little-endian u32s, `(key, next)`.
const PAIR_BYTES: usize = 8;

fn encode_pair(key: u32, next: u32) -> [u8; PAIR_BYTES] {
    let mut record = [0u8; PAIR_BYTES];
    record[..4].copy_from_slice(&key.to_le_bytes());
    record[4..].copy_from_slice(&next.to_le_bytes());
    record
}

fn decode_pair(record: &[u8]) -> (u32, u32) {
    (
        u32::from_le_bytes([record[0], record[1], record[2], record[3]]),
        u32::from_le_bytes([record[4], record[5], record[6], record[7]]),
    )
}

/// Fixed-capacity hash map from externally supplied u32 keys to dense
/// insertion slots, with chains stored in a [`PagedBytes`].
#[derive(Debug)]
pub struct KeyTable {
    /// Per-hash head-of-chain index into `pairs`, `NO_INDEX` when empty.
    heads: Vec<u32>,
    /// Chain nodes `(key, next)`; a node's index is its key's slot.
    pairs: PagedBytes,
}

impl KeyTable {
    /// Creates an empty table with `hash_buckets` chain heads (nonzero)
    /// and `pairs_page_size` chain nodes per storage page.
    pub fn new(hash_buckets: usize, pairs_page_size: usize) -> Self {
        assert!(hash_buckets > 0, "hash bucket count must be nonzero");
        Self {
            heads: vec![NO_INDEX; hash_buckets],
            pairs: PagedBytes::new(PAIR_BYTES, pairs_page_size),
        }
    }

    /// Number of keys inserted so far.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if no keys have been inserted.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[inline]
    fn hash(&self, key: u32) -> usize {
        key as usize % self.heads.len()
    }

    /// Returns `true` if `key` has been inserted.
    pub fn contains(&self, key: u32) -> bool {
        self.slot_of(key).is_some()
    }

    /// Slot assigned to `key`, or `None` if the key was never inserted.
    pub fn slot_of(&self, key: u32) -> Option<u32> {
        let mut index = self.heads[self.hash(key)];
        while index != NO_INDEX {
            let (node_key, next) = decode_pair(self.pairs.get(index as usize));
            if node_key == key {
                return Some(index);
            }
            debug_assert!(next == NO_INDEX || next > index);
            index = next;
        }
        None
    }

    /// Key stored at `slot`. Panics if `slot >= len()`.
    pub fn key_at(&self, slot: u32) -> u32 {
        decode_pair(self.pairs.get(slot as usize)).0
    }

    /// Inserts `key`, assigning it the next dense slot (`len()` before the
    /// call). Fails without side effects if the key is already present.
    pub fn push(&mut self, key: u32) -> Result<()> {
        let new_index = self.pairs.len() as u32;
        let hash = self.hash(key);
        let mut index = self.heads[hash];
        if index == NO_INDEX {
            self.heads[hash] = new_index;
            self.pairs.push(&encode_pair(key, NO_INDEX));
            return Ok(());
        }
        loop {
            let (node_key, next) = decode_pair(self.pairs.get(index as usize));
            if node_key == key {
                return Err(IndexError::DuplicateKey(key));
            }
            if next == NO_INDEX {
                // Point the tail at the node we are about to append. The
                // new index is strictly greater than every existing one,
                // keeping chain links forward-only.
                self.pairs.get_mut(index as usize)[4..].copy_from_slice(&new_index.to_le_bytes());
                self.pairs.push(&encode_pair(key, NO_INDEX));
                return Ok(());
            }
            debug_assert!(next > index);
            index = next;
        }
    }

    /// Resets every chain head and frees the node store.
    pub fn clear(&mut self) {
        self.heads.fill(NO_INDEX);
        self.pairs.clear();
    }

    /// Heap bytes currently held by the head array and the node store.
    pub fn allocated_bytes(&self) -> usize {
        self.heads.capacity() * std::mem::size_of::<u32>() + self.pairs.allocated_bytes()
    }
}
