//! Multi-index over binary vectors in Hamming space.
//!
//! [`MultiIndex`] splits every item into 16-bit words and maintains one
//! bucket per (word position, word value) cell holding the keys of the
//! items whose vector has that word there. A range query with a small
//! radius only has to probe the cells reachable by flipping a bounded
//! number of bits in each query word; candidates are then verified
//! against the stored vectors with true Hamming distance.

/// Popcount backends and Hamming distance.
pub mod distance;
/// XOR mask table for popcount-ascending probe enumeration.
pub mod masks;
/// Range queries: linear scan and the mask-probed optimized path.
pub mod search;

use crate::config::{
    DEFAULT_BRUTE_FORCE_BOUND, DEFAULT_BUCKET_PAGE_SIZE, DEFAULT_HASH_TABLE_SIZE,
    DEFAULT_PAGE_SIZE, ITEM_SIZE_ALIGNMENT, WORD_BYTES, WORD_VALUES,
};
use crate::error::{IndexError, Result};
use crate::store::{KeyBucket, KeyTable, PagedBytes};
use search::Neighbor;
use serde::{Deserialize, Serialize};

/// Construction parameters for a [`MultiIndex`].
///
/// Controls the trade-off between allocation count, fixed memory floor,
/// and the crossover point between the two query paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Item length in bytes; must be positive and divisible by 8.
    pub item_bytes: usize,
    /// Entries per bucket page. Larger pages mean fewer allocations on
    /// hot buckets, more slack in sparse ones.
    pub bucket_page_size: usize,
    /// Length of the key table's head-of-chain array. Larger means
    /// shorter chains at a higher fixed memory cost.
    pub hash_table_size: usize,
    /// Records per page for the raw-item and chain-node stores.
    pub page_size: usize,
    /// Radius above which the optimized query degrades to a linear scan.
    pub brute_force_bound: f32,
}

impl IndexConfig {
    /// Configuration for `item_bytes`-sized items with default tunables.
    pub fn new(item_bytes: usize) -> Self {
        Self {
            item_bytes,
            bucket_page_size: DEFAULT_BUCKET_PAGE_SIZE,
            hash_table_size: DEFAULT_HASH_TABLE_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            brute_force_bound: DEFAULT_BRUTE_FORCE_BOUND,
        }
    }
}

/// Insert-and-search index for fixed-length binary vectors under
/// normalized Hamming distance.
///
/// Keys are caller-supplied u32s, unique per item; slots (dense insertion
/// ordinals) are internal. All three stores grow in lock-step on
/// [`add`](MultiIndex::add) and reset together on
/// [`clear`](MultiIndex::clear). Single-threaded: queries see every
/// earlier insertion on the same thread, and no internal synchronization
/// is provided.
#[derive(Debug)]
pub struct MultiIndex {
    config: IndexConfig,
    /// `item_bytes / 2`: number of 16-bit words per item.
    words_per_item: usize,
    /// One bucket per (word position, word value); flat index
    /// `position * WORD_VALUES + value`.
    buckets: Vec<KeyBucket>,
    /// key -> slot; also the slot -> key direction via `key_at`.
    key_table: KeyTable,
    /// Raw item bytes, indexed by slot.
    items: PagedBytes,
    /// `(mask, popcount)` pairs sorted by popcount ascending.
    masks: Vec<(u16, u8)>,
}

impl MultiIndex {
    /// Creates an index for `item_bytes`-sized items with default
    /// tunables (see [`IndexConfig::new`]).
    pub fn new(item_bytes: usize) -> Result<Self> {
        Self::with_config(IndexConfig::new(item_bytes))
    }

    /// Creates an index from an explicit configuration.
    ///
    /// Fails if `item_bytes` is zero or not divisible by 8, if any size
    /// parameter is zero, or if a hardware popcount backend was compiled
    /// in but the CPU lacks the instruction.
    pub fn with_config(config: IndexConfig) -> Result<Self> {
        if config.item_bytes == 0 || config.item_bytes % ITEM_SIZE_ALIGNMENT != 0 {
            return Err(IndexError::ItemBytesNotAligned(config.item_bytes));
        }
        if config.hash_table_size == 0 {
            return Err(IndexError::ZeroHashTableSize);
        }
        if config.page_size == 0 {
            return Err(IndexError::ZeroPageSize);
        }
        if config.bucket_page_size == 0 {
            return Err(IndexError::ZeroBucketPageSize);
        }
        if !distance::popcount_supported() {
            return Err(IndexError::PopcountUnsupported);
        }
        let words_per_item = config.item_bytes / WORD_BYTES;
        let buckets = (0..words_per_item * WORD_VALUES)
            .map(|_| KeyBucket::new(config.bucket_page_size))
            .collect();
        Ok(Self {
            words_per_item,
            buckets,
            key_table: KeyTable::new(config.hash_table_size, config.page_size),
            items: PagedBytes::new(config.item_bytes, config.page_size),
            masks: masks::build_mask_table(),
            config,
        })
    }

    /// The configuration this index was built with.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Item length in bytes.
    pub fn item_bytes(&self) -> usize {
        self.config.item_bytes
    }

    /// Number of items in the index.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the index holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` if `key` has been inserted.
    pub fn contains_key(&self, key: u32) -> bool {
        self.key_table.contains(key)
    }

    /// Inserts one item under a caller-supplied unique key.
    ///
    /// Fails on a wrong-length item or a duplicate key; both checks run
    /// before any store is touched, so a failed call leaves the index
    /// unchanged.
    pub fn add(&mut self, key: u32, item: &[u8]) -> Result<()> {
        if item.len() != self.config.item_bytes {
            return Err(IndexError::ItemSizeMismatch {
                expected: self.config.item_bytes,
                actual: item.len(),
            });
        }
        self.key_table.push(key)?;
        for position in 0..self.words_per_item {
            let word = distance::word_at(item, position);
            self.buckets[position * WORD_VALUES + word as usize].push(key);
        }
        self.items.push(item);
        Ok(())
    }

    /// Inserts a batch of `(key, item)` pairs, skipping the ones that
    /// fail. Returns how many were actually added.
    pub fn add_batch<'a, I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = (u32, &'a [u8])>,
    {
        let mut added = 0;
        for (key, item) in entries {
            match self.add(key, item) {
                Ok(()) => added += 1,
                Err(err) => tracing::debug!(key, %err, "batch add skipped an item"),
            }
        }
        added
    }

    /// Removes every item; all pages are freed. Tunables are kept.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.key_table.clear();
        self.items.clear();
    }

    /// All items within normalized Hamming distance `range` of `query`,
    /// by linear scan. See [`search::range_brute`].
    pub fn range_brute(&self, query: &[u8], range: f32) -> Result<Vec<Neighbor>> {
        search::range_brute(self, query, range)
    }

    /// All items within normalized Hamming distance `range` of `query`,
    /// via the multi-index. See [`search::range_fast`].
    pub fn range_fast(&self, query: &[u8], range: f32) -> Result<Vec<Neighbor>> {
        search::range_fast(self, query, range)
    }

    /// Heap bytes currently held across all internal stores.
    pub fn allocated_bytes(&self) -> usize {
        let buckets: usize = self.buckets.iter().map(KeyBucket::allocated_bytes).sum();
        buckets
            + self.key_table.allocated_bytes()
            + self.items.allocated_bytes()
            + self.masks.capacity() * std::mem::size_of::<(u16, u8)>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test-sized tunables: the defaults allocate a 400 MB head array.
    fn small_config(item_bytes: usize) -> IndexConfig {
        IndexConfig {
            bucket_page_size: 4,
            hash_table_size: 1009,
            page_size: 16,
            ..IndexConfig::new(item_bytes)
        }
    }

    #[test]
    fn test_construction_validates_item_bytes() {
        assert_eq!(
            MultiIndex::with_config(small_config(7)).err(),
            Some(IndexError::ItemBytesNotAligned(7))
        );
        assert_eq!(
            MultiIndex::with_config(small_config(0)).err(),
            Some(IndexError::ItemBytesNotAligned(0))
        );
        assert!(MultiIndex::with_config(small_config(8)).is_ok());
        assert!(MultiIndex::with_config(small_config(32)).is_ok());
        assert!(MultiIndex::with_config(small_config(256)).is_ok());
    }

    #[test]
    fn test_construction_validates_sizes() {
        let mut config = small_config(8);
        config.hash_table_size = 0;
        assert_eq!(
            MultiIndex::with_config(config).err(),
            Some(IndexError::ZeroHashTableSize)
        );

        let mut config = small_config(8);
        config.page_size = 0;
        assert_eq!(
            MultiIndex::with_config(config).err(),
            Some(IndexError::ZeroPageSize)
        );

        let mut config = small_config(8);
        config.bucket_page_size = 0;
        assert_eq!(
            MultiIndex::with_config(config).err(),
            Some(IndexError::ZeroBucketPageSize)
        );
    }

    #[test]
    fn test_derived_shape() {
        let index = MultiIndex::with_config(small_config(8)).unwrap();
        assert_eq!(index.words_per_item, 4);
        assert_eq!(index.buckets.len(), 4 * WORD_VALUES);
        assert_eq!(index.masks.len(), WORD_VALUES);
        assert!(index.is_empty());
    }

    #[test]
    fn test_add_updates_all_stores() {
        let mut index = MultiIndex::with_config(small_config(8)).unwrap();
        let item = [0x34, 0x12, 0x00, 0x00, 0xFF, 0xFF, 0xCD, 0xAB];
        index.add(77, &item).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.contains_key(77));
        assert_eq!(index.items.get(0), &item);
        assert_eq!(index.key_table.slot_of(77), Some(0));

        // Each word position's bucket holds the key once.
        let words = [0x1234u16, 0x0000, 0xFFFF, 0xABCD];
        for (position, &word) in words.iter().enumerate() {
            let mut keys = Vec::new();
            index.buckets[position * WORD_VALUES + word as usize].collect_into(&mut keys);
            assert_eq!(keys, vec![77]);
        }
    }

    #[test]
    fn test_duplicate_key_leaves_index_unchanged() {
        let mut index = MultiIndex::with_config(small_config(8)).unwrap();
        index.add(1, &[0u8; 8]).unwrap();
        assert_eq!(index.add(1, &[0xFFu8; 8]).err(), Some(IndexError::DuplicateKey(1)));
        assert_eq!(index.len(), 1);
        assert_eq!(index.items.get(0), &[0u8; 8]);
        // The all-ones words were never indexed.
        let mut keys = Vec::new();
        index.buckets[0xFFFF].collect_into(&mut keys);
        assert!(keys.is_empty());
    }

    #[test]
    fn test_add_rejects_wrong_length() {
        let mut index = MultiIndex::with_config(small_config(8)).unwrap();
        assert_eq!(
            index.add(1, &[0u8; 7]).err(),
            Some(IndexError::ItemSizeMismatch {
                expected: 8,
                actual: 7
            })
        );
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn test_bucket_entry_count_invariant() {
        let mut index = MultiIndex::with_config(small_config(8)).unwrap();
        for key in 0..20u32 {
            let item = [key as u8; 8];
            index.add(key, &item).unwrap();
        }
        let total: usize = index.buckets.iter().map(KeyBucket::len).sum();
        assert_eq!(total, 20 * index.words_per_item);
        assert_eq!(index.items.len(), index.key_table.len());
    }

    #[test]
    fn test_add_batch_swallows_failures() {
        let mut index = MultiIndex::with_config(small_config(8)).unwrap();
        let good = [1u8; 8];
        let short = [2u8; 4];
        let entries: Vec<(u32, &[u8])> = vec![
            (1, &good),
            (1, &good),  // duplicate key
            (2, &short), // wrong length
            (3, &good),
        ];
        assert_eq!(index.add_batch(entries), 2);
        assert_eq!(index.len(), 2);
        assert!(index.contains_key(1));
        assert!(index.contains_key(3));
    }

    #[test]
    fn test_clear_resets_and_reuses() {
        let mut index = MultiIndex::with_config(small_config(8)).unwrap();
        for key in 0..10u32 {
            index.add(key, &[key as u8; 8]).unwrap();
        }
        index.clear();
        assert_eq!(index.len(), 0);
        assert!(!index.contains_key(0));
        // Keys are insertable again after clear.
        index.add(0, &[9u8; 8]).unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_allocated_bytes_grows_with_inserts() {
        let mut index = MultiIndex::with_config(small_config(8)).unwrap();
        let empty = index.allocated_bytes();
        for key in 0..50u32 {
            index.add(key, &[key as u8; 8]).unwrap();
        }
        assert!(index.allocated_bytes() > empty);
    }
}
