//! Default tuning parameters and structural constants.
//!
//! The defaults reflect the empirical sweet spot for 256-bit vectors at
//! the ~100M item scale. Runtime overrides go through
//! [`IndexConfig`](crate::IndexConfig).

/// Item lengths must be a multiple of this, so distances can be computed
/// over whole 64-bit chunks with a single popcount per chunk.
pub const ITEM_SIZE_ALIGNMENT: usize = 8;

/// The multi-index splits items into words of this many bytes.
pub const WORD_BYTES: usize = 2;

/// Number of distinct values a word can take (and the number of buckets
/// per word position).
pub const WORD_VALUES: usize = 1 << (WORD_BYTES * BITS_PER_BYTE);

/// Bits per byte, named to keep the normalization arithmetic readable.
pub const BITS_PER_BYTE: usize = 8;

/// Default number of 32-bit entries per bucket page.
///
/// Larger pages mean fewer allocations on hot buckets but more slack in
/// the sparsely populated ones. At 128 entries the per-page pointer
/// overhead is about 2%.
pub const DEFAULT_BUCKET_PAGE_SIZE: usize = 128;

/// Default length of the key table's head-of-chain array.
///
/// More heads mean shorter chains and faster lookups at a higher fixed
/// memory floor (4 bytes per head).
pub const DEFAULT_HASH_TABLE_SIZE: usize = 100_000_000;

/// Default number of records per page for the raw-item and chain-node
/// stores.
pub const DEFAULT_PAGE_SIZE: usize = 100_000;

/// Default radius above which the optimized query path degrades to a
/// linear scan.
///
/// Above this bound the mask enumeration touches enough buckets that
/// deduplicating candidates costs more than scanning every item.
/// Empirical crossover for 256-bit vectors.
pub const DEFAULT_BRUTE_FORCE_BOUND: f32 = 0.25;
