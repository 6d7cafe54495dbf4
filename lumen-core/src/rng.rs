use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::num::Wrapping;

use crate::ONE_MINUS_EPSILON;

const PCG32_DEFAULT_STATE: Wrapping<u64> = Wrapping(0x853c_49e6_748f_ea9b);
const PCG32_DEFAULT_STREAM: Wrapping<u64> = Wrapping(0xda3e_39cb_94b9_5bdb);
const PCG32_MULT: Wrapping<u64> = Wrapping(0x5851_f42d_4c95_7f2d);

/// PCG32 stream. Workers each own one; there is no cross-worker sharing.
#[derive(Copy, Clone)]
pub struct Rng {
    state: Wrapping<u64>,
    inc: Wrapping<u64>,
}

impl Rng {
    pub fn new() -> Rng {
        Rng {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        }
    }

    /// Deterministic stream for the given seed.
    pub fn seeded(seed: u64) -> Rng {
        let mut rng = Rng::new();
        rng.set_sequence(seed);
        rng
    }

    /// Seed drawn from the system entropy source.
    pub fn entropy_seed() -> u64 {
        RandomState::new().build_hasher().finish()
    }

    pub fn set_sequence(&mut self, seed: u64) {
        self.state = Wrapping(0);
        self.inc = Wrapping((seed << 1) | 1);
        let _ = self.uniform_u32();
        self.state += PCG32_DEFAULT_STATE;
        let _ = self.uniform_u32();
    }

    pub fn uniform_u32(&mut self) -> u32 {
        let oldstate = self.state;
        self.state = oldstate * PCG32_MULT + self.inc;
        let xorshifted = (((oldstate >> 18) ^ oldstate) >> 27).0 as u32;
        let rot = (oldstate >> 59).0 as u32;

        (xorshifted >> rot) | (xorshifted << (rot.wrapping_neg() & 31))
    }

    /// Uniform float in [0, 1).
    pub fn uniform_f32(&mut self) -> f32 {
        (self.uniform_u32() as f32 * 2.328_306_4e-10).min(ONE_MINUS_EPSILON)
    }

    pub fn uniform_2d(&mut self) -> (f32, f32) {
        let u1 = self.uniform_f32();
        let u2 = self.uniform_f32();
        (u1, u2)
    }
}

impl Default for Rng {
    fn default() -> Rng {
        Rng::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let mut a = Rng::seeded(42);
        let mut b = Rng::seeded(42);
        for _ in 0..100 {
            assert_eq!(a.uniform_u32(), b.uniform_u32());
        }
    }

    #[test]
    fn test_streams_differ() {
        let mut a = Rng::seeded(1);
        let mut b = Rng::seeded(2);
        let same = (0..32).filter(|_| a.uniform_u32() == b.uniform_u32()).count();
        assert!(same < 4);
    }

    #[test]
    fn test_unit_interval() {
        let mut rng = Rng::seeded(7);
        for _ in 0..10_000 {
            let u = rng.uniform_f32();
            assert!((0.0..1.0).contains(&u));
        }
    }
}
