//! Deterministic dice for `roll` magnitudes.
//!
//! Every roll is a pure function of `(world seed, invocation nonce, owner id,
//! roll counter)`, so replaying the same invocations on the same world yields
//! the same numbers and requirement evaluation stays side-effect free.

/// Random oracle keyed by an explicit seed.
///
/// Implementations must return the same value for the same seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a die with N sides (1-N inclusive). A zero-sided die rolls 0.
    fn roll_die(&self, seed: u64, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        (self.next_u32(seed) % sides) + 1
    }
}

/// PCG-XSH-RR generator: 64-bit LCG state, 32-bit permuted output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::output(Self::step(seed))
    }
}

/// Mixes the roll inputs into a single seed.
///
/// `counter` distinguishes independent dice inside one invocation; the
/// evaluation context bumps it once per die.
pub fn compute_seed(world_seed: u64, nonce: u64, owner: u32, counter: u32) -> u64 {
    let mut hash = world_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (owner as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (counter as u64).wrapping_mul(0x85ebca6b);

    // avalanche
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
