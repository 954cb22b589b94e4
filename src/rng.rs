//! Deterministic random source derived from the experiment seed.
//!
//! Each test owns its generators; nothing here touches process-wide random
//! state. The same seed string always yields the same sequence, so an
//! experiment evaluated twice on the same data reaches the same decisions.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use sha2::{Digest, Sha256};

/// Map a seed string to its numeric seed.
///
/// SHA-256 of the UTF-8 bytes, keeping the first four bytes big-endian
/// (the first eight hex digits of the digest).
pub fn hash_seed(seed: &str) -> u64 {
    let digest = Sha256::digest(seed.as_bytes());
    let prefix = [digest[0], digest[1], digest[2], digest[3]];
    u64::from(u32::from_be_bytes(prefix))
}

/// Independent uses of the seed.
///
/// Each stream gets its own generator so that, for example, changing the
/// number of planned looks never shifts the draws used for decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Jitter of the interim look schedule.
    Schedule,
    /// Draws compared against between-look crossing probabilities.
    Crossing,
}

impl Stream {
    fn salt(self) -> u64 {
        match self {
            Stream::Schedule => 0x7363_6865_6475_6c65, // "schedule"
            Stream::Crossing => 0,
        }
    }
}

/// Reproducible uniform source for one stream of one test.
#[derive(Debug, Clone)]
pub struct SeededGenerator {
    rng: Xoshiro256PlusPlus,
    numeric_seed: u64,
    draws: u64,
}

impl SeededGenerator {
    /// Create a generator for the given numeric seed and stream.
    pub fn new(numeric_seed: u64, stream: Stream) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(numeric_seed ^ stream.salt()),
            numeric_seed,
            draws: 0,
        }
    }

    /// Create a generator directly from a seed string.
    pub fn from_seed_str(seed: &str, stream: Stream) -> Self {
        Self::new(hash_seed(seed), stream)
    }

    /// Next value, uniform in [0, 1).
    pub fn next_uniform(&mut self) -> f64 {
        self.draws += 1;
        self.rng.random::<f64>()
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// The numeric seed this generator was built from.
    pub fn numeric_seed(&self) -> u64 {
        self.numeric_seed
    }

    /// Discard values until `draws` values have been consumed in total.
    ///
    /// Used when restoring a persisted test so that it continues the exact
    /// sequence it was on. Does nothing if the generator is already past it.
    pub fn fast_forward(&mut self, draws: u64) {
        while self.draws < draws {
            self.next_uniform();
        }
    }
}
