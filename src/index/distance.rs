//! Population count and Hamming distance.
//!
//! The popcount backend is a build-time choice: the `popcnt-intel` and
//! `popcnt-amd` features both route through the x86_64 POPCNT
//! instruction (the vendors expose the same opcode), while the default
//! is a portable clear-lowest-set-bit loop. With a hardware feature
//! enabled, CPU support is verified at runtime and index construction
//! refuses to proceed without it.

#[cfg(all(feature = "popcnt-intel", feature = "popcnt-amd"))]
compile_error!("features `popcnt-intel` and `popcnt-amd` are mutually exclusive; enable one");

/// Returns `true` if the compiled-in popcount backend can run on this
/// CPU. Always true for the software backend.
#[cfg(any(feature = "popcnt-intel", feature = "popcnt-amd"))]
pub fn popcount_supported() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        std::arch::is_x86_feature_detected!("popcnt")
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        false
    }
}

/// Returns `true` if the compiled-in popcount backend can run on this
/// CPU. Always true for the software backend.
#[cfg(not(any(feature = "popcnt-intel", feature = "popcnt-amd")))]
pub fn popcount_supported() -> bool {
    true
}

#[cfg(all(
    target_arch = "x86_64",
    any(feature = "popcnt-intel", feature = "popcnt-amd")
))]
#[target_feature(enable = "popcnt")]
unsafe fn popcount_u64_hw(x: u64) -> u32 {
    std::arch::x86_64::_popcnt64(x as i64) as u32
}

/// Kernighan's loop: one iteration per set bit.
fn popcount_u64_sw(mut x: u64) -> u32 {
    let mut count = 0;
    while x != 0 {
        x &= x - 1;
        count += 1;
    }
    count
}

/// Number of set bits in `x`, via the selected backend.
#[inline]
pub fn popcount_u64(x: u64) -> u32 {
    #[cfg(all(
        target_arch = "x86_64",
        any(feature = "popcnt-intel", feature = "popcnt-amd")
    ))]
    {
        if std::arch::is_x86_feature_detected!("popcnt") {
            // Safety: POPCNT presence was just checked.
            return unsafe { popcount_u64_hw(x) };
        }
    }
    popcount_u64_sw(x)
}

/// Hamming distance between two equal-length byte strings whose length
/// is a multiple of 8. Little-endian 64-bit chunks, XOR, popcount sum.
/// Returns a value in `[0, 8 * len]`.
#[inline]
pub fn hamming_distance(a: &[u8], b: &[u8]) -> u32 {
    debug_assert_eq!(a.len(), b.len());
    debug_assert_eq!(a.len() % crate::config::ITEM_SIZE_ALIGNMENT, 0);
    let mut distance = 0;
    for (chunk_a, chunk_b) in a.chunks_exact(8).zip(b.chunks_exact(8)) {
        let word_a = u64::from_le_bytes(chunk_a.try_into().unwrap());
        let word_b = u64::from_le_bytes(chunk_b.try_into().unwrap());
        distance += popcount_u64(word_a ^ word_b);
    }
    distance
}

/// Little-endian 16-bit word at the given word position of an item.
/// Insertion and probing both read words through here, so the two sides
/// always agree on byte order.
#[inline]
pub(crate) fn word_at(item: &[u8], position: usize) -> u16 {
    u16::from_le_bytes([item[2 * position], item[2 * position + 1]])
}
