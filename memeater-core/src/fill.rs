use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Per-worker source of fill bytes.
///
/// Seeded from the iteration count, so two runs with the same count write the
/// same byte sequence regardless of block size.
pub struct FillPattern {
    rng: StdRng,
}

impl FillPattern {
    pub fn new(iterations: u32) -> Self {
        Self { rng: StdRng::seed_from_u64(u64::from(iterations)) }
    }

    /// Next pseudo-random byte.
    pub fn next_byte(&mut self) -> u8 {
        (self.rng.gen::<u32>() & 0xFF) as u8
    }
}
