//! # hamming-index
//!
//! Embeddable in-memory range-search index for fixed-length binary vectors
//! in Hamming space. Handles ~100M 256-bit items on a conventional 16 GB
//! machine. Insert-and-search only: no removal, no in-place updates, no
//! persistence.
//!
//! A range query returns every `(key, distance)` whose normalized Hamming
//! distance to the query lies within a radius in `[0, 1]`, sorted by
//! ascending distance. Small radii are served from a multi-index (one
//! bucket per 16-bit word position and value, probed via XOR masks of
//! increasing popcount); large radii fall back to a linear scan.

/// Default tuning parameters and structural constants.
pub mod config;
/// Crate error type and `Result` alias.
pub mod error;
/// The multi-index itself: construction, insertion, mask table, Hamming
/// distance, and the two range-query paths.
pub mod index;
/// Append-only paged storage primitives shared by the index internals.
pub mod store;

pub use error::{IndexError, Result};
pub use index::search::Neighbor;
pub use index::{IndexConfig, MultiIndex};
