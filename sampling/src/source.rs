use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_core::{OsRng, RngCore};

const MAXF64: f64 = 9007199254740992.0;

/// Source is a seedable cryptographic randomness stream.
/// All secret material of the library is derived from a Source.
pub struct Source {
    source: ChaCha8Rng,
    buf: u64,
    buf_bits: usize,
}

pub fn new_seed() -> [u8; 32] {
    let mut seed = [0u8; 32];
    OsRng.fill_bytes(&mut seed);
    seed
}

impl Source {
    pub fn new(seed: [u8; 32]) -> Source {
        Source {
            source: ChaCha8Rng::from_seed(seed),
            buf: 0,
            buf_bits: 0,
        }
    }

    pub fn new_seed(&mut self) -> [u8; 32] {
        let mut seed: [u8; 32] = [0u8; 32];
        self.source.fill_bytes(&mut seed);
        seed
    }

    /// Returns an independent Source seeded from self.
    pub fn branch(&mut self) -> Self {
        Source::new(self.new_seed())
    }

    /// Returns a uniform u64 in [0, max) by rejection over the masked word.
    /// mask must be of the form 2^k - 1 with 2^k >= max.
    #[inline(always)]
    pub fn next_u64n(&mut self, max: u64, mask: u64) -> u64 {
        let mut x: u64 = self.next_u64() & mask;
        while x >= max {
            x = self.next_u64() & mask;
        }
        x
    }

    /// Returns a uniform f64 in [min, max).
    #[inline(always)]
    pub fn next_f64(&mut self, min: f64, max: f64) -> f64 {
        min + ((self.next_u64() << 11 >> 11) as f64) / MAXF64 * (max - min)
    }

    /// Returns a single uniform bit, replenishing the internal word when empty.
    #[inline(always)]
    pub fn next_bit(&mut self) -> u64 {
        if self.buf_bits == 0 {
            self.buf = self.source.next_u64();
            self.buf_bits = 64;
        }
        let bit: u64 = self.buf & 1;
        self.buf >>= 1;
        self.buf_bits -= 1;
        bit
    }
}

impl RngCore for Source {
    #[inline(always)]
    fn next_u32(&mut self) -> u32 {
        self.source.next_u32()
    }

    #[inline(always)]
    fn next_u64(&mut self) -> u64 {
        self.source.next_u64()
    }

    #[inline(always)]
    fn fill_bytes(&mut self, bytes: &mut [u8]) {
        self.source.fill_bytes(bytes)
    }

    #[inline(always)]
    fn try_fill_bytes(&mut self, bytes: &mut [u8]) -> Result<(), rand_core::Error> {
        self.source.try_fill_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_u64n_in_range() {
        let mut source: Source = Source::new([0u8; 32]);
        let max: u64 = 0x1fffffffffe00001;
        let mask: u64 = (1u64 << 61) - 1;
        for _ in 0..1024 {
            assert!(source.next_u64n(max, mask) < max);
        }
    }

    #[test]
    fn test_branch_diverges() {
        let mut a: Source = Source::new([1u8; 32]);
        let mut b: Source = a.branch();
        assert!(a.next_u64() != b.next_u64());
    }
}
