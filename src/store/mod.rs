//! Append-only paged storage primitives.
//!
//! The index's working set is dominated by tens of millions of tiny
//! containers plus a handful of huge ones, so everything here allocates
//! in fixed-size pages: expansion never moves existing data and the
//! per-container header stays a few words.

/// Singly linked pages of 32-bit values, one instance per multi-index cell.
pub mod bucket;
/// Separate-chaining hash table from key to dense insertion slot.
pub mod key_table;
/// Indexed paged store of fixed-size byte records.
pub mod paged;

pub use bucket::KeyBucket;
pub use key_table::KeyTable;
pub use paged::PagedBytes;
