//! Read/write decision
//!
//! One uniform draw in `[0, 1)` per request from the worker's own generator;
//! the request is a read when the draw is at most `read_ratio`. Because each
//! worker draws from its own generator, workers never contend on or correlate
//! through a shared random source.

use rand::Rng;

/// Decide whether the next request is a read
///
/// A ratio of 0 always yields a write; the draw is still consumed so the
/// generator advances identically for every ratio.
#[inline(always)]
pub fn is_read<R: Rng + ?Sized>(read_ratio: f64, rng: &mut R) -> bool {
    let draw: f64 = rng.gen();
    read_ratio > 0.0 && draw <= read_ratio
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn read_fraction(ratio: f64, draws: usize, seed: u64) -> f64 {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let reads = (0..draws).filter(|_| is_read(ratio, &mut rng)).count();
        reads as f64 / draws as f64
    }

    #[test]
    fn test_ratio_converges() {
        for (seed, ratio) in [(1, 0.1), (2, 0.4), (3, 0.5), (4, 0.9)] {
            let observed = read_fraction(ratio, 100_000, seed);
            assert!(
                (observed - ratio).abs() < 0.01,
                "ratio {} observed {}",
                ratio,
                observed
            );
        }
    }

    #[test]
    fn test_zero_ratio_is_all_writes() {
        assert_eq!(read_fraction(0.0, 10_000, 7), 0.0);
    }

    #[test]
    fn test_full_ratio_is_all_reads() {
        assert_eq!(read_fraction(1.0, 10_000, 7), 1.0);
    }

    #[test]
    fn test_one_draw_per_call() {
        let mut a = Xoshiro256PlusPlus::seed_from_u64(99);
        let mut b = Xoshiro256PlusPlus::seed_from_u64(99);

        is_read(0.0, &mut a);
        is_read(1.0, &mut b);
        assert_eq!(a.gen::<u64>(), b.gen::<u64>());
    }
}
