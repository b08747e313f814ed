//! Crate error type and `Result` alias.

use thiserror::Error;

/// Errors surfaced by index construction, insertion, and queries.
///
/// Allocation failure is not represented here: the stores treat
/// out-of-memory as fatal, matching the default allocator's abort.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("item byte count {0} must be positive and divisible by 8")]
    ItemBytesNotAligned(usize),

    #[error("hash table size must be nonzero")]
    ZeroHashTableSize,

    #[error("page size must be nonzero")]
    ZeroPageSize,

    #[error("bucket page size must be nonzero")]
    ZeroBucketPageSize,

    #[error("selected hardware popcount is not supported by this CPU")]
    PopcountUnsupported,

    #[error("range {0} must lie inside the [0, 1] interval")]
    RangeOutOfBounds(f32),

    #[error("key {0} is already present in the index")]
    DuplicateKey(u32),

    #[error("item length mismatch: expected {expected} bytes, got {actual}")]
    ItemSizeMismatch { expected: usize, actual: usize },
}

/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;
