//! Uniform random offsets
//!
//! Draws come from the caller's generator (a per-worker xoshiro256++ in
//! practice), so there is no shared state between workers and the same seed
//! reproduces the same offsets.

use rand::Rng;

/// Uniform byte offset in `[0, span)`
///
/// `span` is `file_size - io_size`. Returns 0 for an empty span.
#[inline(always)]
pub fn random_offset<R: Rng + ?Sized>(span: u64, rng: &mut R) -> u64 {
    if span == 0 {
        return 0;
    }
    rng.gen_range(0..span)
}

/// Uniform offset on a `block_size` boundary
///
/// The block index is drawn from `[0, span / block_size)`, so the returned
/// offset never exceeds `span`. When the span is narrower than one block the
/// only candidate is offset 0.
#[inline(always)]
pub fn random_block_offset<R: Rng + ?Sized>(span: u64, block_size: u64, rng: &mut R) -> u64 {
    let num_blocks = span / block_size;
    if num_blocks == 0 {
        return 0;
    }
    rng.gen_range(0..num_blocks) * block_size
}
