//! Weak, fast pseudo-randomness for jitter, not for security.
//!
//! The teacher's kernel has no `rand` dependency and derives its only
//! timestamp source from a tick counter (`logger::get_ticks`); in the
//! same spirit, this is a small xorshift64 generator seeded once by the
//! caller from whatever per-boot entropy the integrator has (TSC jitter,
//! a hardware RNG, interrupt timing — anything not derivable from the
//! node's own IPv6 address, per §9 "Randomized timers").

#[derive(Clone)]
pub struct WeakRng {
    state: u64,
}

impl WeakRng {
    pub fn new(seed: u64) -> Self {
        // xorshift64 cannot start at zero.
        Self {
            state: if seed == 0 { 0x9e3779b97f4a7c15 } else { seed },
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform integer in `[0, bound)`. Returns 0 when `bound == 0`.
    pub fn next_below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        (self.next_u64() % bound as u64) as u32
    }

    /// Uniform value in `[lo, hi]` (inclusive), saturating if `hi < lo`.
    pub fn uniform_range(&mut self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            return lo;
        }
        lo + self.next_below(hi - lo + 1)
    }
}
