//! Process-level randomness handle.
//!
//! Every API entry point takes `&mut impl RngCore`, so callers may pass
//! their own generator. `Sysenv` is the batteries-included choice: seeded
//! from the operating system by default, or deterministically for tests and
//! platforms without an entropy source.

use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRng, RngCore};

pub struct Sysenv {
    rng: ChaCha20Rng,
}

impl Sysenv {
    /// Seeds from the operating system's entropy source.
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    /// Deterministic stream from a fixed seed. Never use for production
    /// key material.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl RngCore for Sysenv {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

impl CryptoRng for Sysenv {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_streams_are_reproducible() {
        let mut a = Sysenv::from_seed(42);
        let mut b = Sysenv::from_seed(42);
        assert_eq!(a.next_u64(), b.next_u64());

        let mut c = Sysenv::from_seed(43);
        assert_ne!(a.next_u64(), c.next_u64());
    }
}
