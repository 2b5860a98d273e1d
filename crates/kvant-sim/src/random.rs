//! Seeded randomness for measurement sampling.
//!
//! Measurement is the only consumer of randomness in a run. Draws happen in
//! program order, one per measured qubit, so the same seed and program give
//! the same outcome sequence on every platform and with either kernel.

/// A stream of uniform draws in `[0, 1)`.
pub trait RandomSource {
    /// Next uniform value in `[0, 1)`.
    fn next_uniform(&mut self) -> f64;
}

/// 64-bit Mersenne Twister (MT19937-64).
///
/// `Mt64::new(seed)` runs the reference `init_genrand64` routine, so a given
/// `u64` seed yields the same stream as `std::mt19937_64`. Prefer it over
/// `SeedableRng::seed_from_u64`, which expands the seed differently.
pub use rand_mt::Mt64;

/// 2^-53, the spacing of the uniform grid.
const UNIFORM_SCALE: f64 = 1.0 / 9_007_199_254_740_992.0;

impl RandomSource for Mt64 {
    /// 53 high bits scaled by 2^-53.
    fn next_uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * UNIFORM_SCALE
    }
}

/// Scripted draws, for exercising measurement edge cases.
#[derive(Debug, Clone)]
pub struct FixedSequence {
    values: Vec<f64>,
    next: usize,
}

impl FixedSequence {
    /// Replay `values` in order, cycling when exhausted.
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            next: 0,
        }
    }
}

impl RandomSource for FixedSequence {
    fn next_uniform(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.next % self.values.len()];
        self.next += 1;
        v
    }
}
