//! Range queries: linear scan and the mask-probed optimized path.
//!
//! Both entry points return every item within normalized Hamming
//! distance `range` of the query, sorted by ascending distance. The
//! optimized path probes multi-index cells reachable by flipping at
//! most `floor(range * 16)` bits per query word; any item within the
//! radius differs from the query by at most that many bits in at least
//! one word position, so the union of probes over all positions cannot
//! miss it. False positives are discarded by verifying true distance.

use crate::config::{BITS_PER_BYTE, WORD_BYTES, WORD_VALUES};
use crate::error::{IndexError, Result};
use crate::index::distance::{hamming_distance, word_at};
use crate::index::MultiIndex;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// A single range-query match.
///
/// `#[repr(C)]` with two 4-byte fields and no padding, so result slices
/// can cross an ABI boundary verbatim.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub key: u32,
    /// Normalized Hamming distance to the query, in `[0, 1]`.
    pub distance: f32,
}

fn check_query(index: &MultiIndex, query: &[u8], range: f32) -> Result<()> {
    if query.len() != index.item_bytes() {
        return Err(IndexError::ItemSizeMismatch {
            expected: index.item_bytes(),
            actual: query.len(),
        });
    }
    if !(0.0..=1.0).contains(&range) {
        return Err(IndexError::RangeOutOfBounds(range));
    }
    Ok(())
}

/// Linear-scan range query: compares the query against every stored
/// item. O(N) distance computations regardless of `range`.
pub fn range_brute(index: &MultiIndex, query: &[u8], range: f32) -> Result<Vec<Neighbor>> {
    check_query(index, query, range)?;
    let total_bits = (index.item_bytes() * BITS_PER_BYTE) as f32;
    let mut results = Vec::new();
    for slot in 0..index.items.len() {
        let distance = hamming_distance(query, index.items.get(slot)) as f32 / total_bits;
        if distance <= range {
            results.push(Neighbor {
                key: index.key_table.key_at(slot as u32),
                distance,
            });
        }
    }
    // Stable: equal distances keep insertion order.
    results.sort_by_key(|neighbor| OrderedFloat(neighbor.distance));
    Ok(results)
}

/// Multi-index range query.
///
/// Collects candidate keys from every bucket whose word value lies
/// within the per-word bit ceiling of the query, verifies each distinct
/// candidate once against its stored vector, and returns the verified
/// matches sorted by ascending distance (ties in ascending key order).
/// Radii above the brute-force bound delegate to [`range_brute`].
pub fn range_fast(index: &MultiIndex, query: &[u8], range: f32) -> Result<Vec<Neighbor>> {
    if range > index.config().brute_force_bound {
        tracing::debug!(
            range,
            bound = index.config().brute_force_bound,
            "range above bound, falling back to linear scan"
        );
        return range_brute(index, query, range);
    }
    check_query(index, query, range)?;

    let max_bits_changed = (range * (WORD_BYTES * BITS_PER_BYTE) as f32) as u32;

    // Collect candidate keys from every probed cell. The same key shows
    // up once per word position that matched.
    let mut candidates: Vec<u32> = Vec::new();
    for position in 0..index.words_per_item {
        let query_word = word_at(query, position);
        for &(mask, bits) in &index.masks {
            if u32::from(bits) > max_bits_changed {
                break;
            }
            let probe = query_word ^ mask;
            index.buckets[position * WORD_VALUES + probe as usize].collect_into(&mut candidates);
        }
    }
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    // Verify each distinct key exactly once.
    candidates.sort_unstable();
    candidates.dedup();

    let total_bits = (index.item_bytes() * BITS_PER_BYTE) as f32;
    let mut results = Vec::new();
    for &key in &candidates {
        let slot = match index.key_table.slot_of(key) {
            Some(slot) => slot,
            // Unreachable: buckets only ever hold inserted keys.
            None => continue,
        };
        let distance = hamming_distance(query, index.items.get(slot as usize)) as f32 / total_bits;
        if distance <= range {
            results.push(Neighbor { key, distance });
        }
    }
    // Stable: ties stay in ascending key order from the candidate sort.
    results.sort_by_key(|neighbor| OrderedFloat(neighbor.distance));
    Ok(results)
}
