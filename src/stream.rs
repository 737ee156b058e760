//! Deterministic random stream for one synthesis run
//!
//! The stream is an explicit, passed-by-reference handle owned by exactly one
//! synthesis run. Every stage draws from the same stream in a fixed order, so
//! two runs with identical configuration produce bit-identical output. The
//! stream must never be shared across concurrently executing syntheses; each
//! concurrent request gets its own instance.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic pseudo-random stream keyed by the configuration's seed
///
/// Backed by ChaCha8, which is deterministic across platforms and word sizes.
/// The order of draws is part of the reproducibility contract: stages consume
/// the stream in the fixed pipeline order, and the attribute assigner walks
/// cells in ascending id order.
#[derive(Debug, Clone)]
pub struct RandomStream {
    rng: ChaCha8Rng,
}

impl RandomStream {
    /// Create a stream from a configuration seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Draw a value in `[0, 1)`
    #[inline]
    pub fn next_unit(&mut self) -> f32 {
        self.rng.gen_range(0.0..1.0)
    }

    /// Draw a value in `[lo, hi)`
    ///
    /// Returns `lo` when the range is empty, still consuming one draw so that
    /// stream position stays independent of the configured range.
    #[inline]
    pub fn next_range(&mut self, lo: f32, hi: f32) -> f32 {
        let unit = self.next_unit();
        if hi > lo {
            lo + unit * (hi - lo)
        } else {
            lo
        }
    }

    /// Draw a raw 32-bit value
    ///
    /// Used to derive per-cell noise seeds: the rasterizer needs a
    /// deterministic per-cell seed rather than per-pixel stream draws, so
    /// that pixel resolution stays a pure function of (pixel, cell).
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut a = RandomStream::new(42);
        let mut b = RandomStream::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_seed_changes_sequence() {
        let mut a = RandomStream::new(42);
        let mut b = RandomStream::new(43);
        let same = (0..32).all(|_| a.next_u32() == b.next_u32());
        assert!(!same, "different seeds should diverge");
    }

    #[test]
    fn test_unit_range() {
        let mut stream = RandomStream::new(7);
        for _ in 0..1000 {
            let v = stream.next_unit();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_empty_range_consumes_draw() {
        let mut a = RandomStream::new(5);
        let mut b = RandomStream::new(5);
        assert_eq!(a.next_range(3.0, 3.0), 3.0);
        b.next_unit();
        // Both streams must be at the same position afterwards
        assert_eq!(a.next_u32(), b.next_u32());
    }
}
