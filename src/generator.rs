//! Random source for hypervector generation.
//!
//! A [`Generator`] is a seeded ChaCha8 stream. Passing the same seeded
//! generator state to a constructor produces bit-identical batches on every
//! platform. When no generator is supplied, constructors draw from a
//! per-thread default generator, which is non-reproducible unless seeded with
//! [`manual_seed`].

use std::cell::RefCell;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

thread_local! {
    static DEFAULT: RefCell<Generator> = RefCell::new(Generator::new());
}

/// Seeded pseudo-random generator.
#[derive(Clone, Debug)]
pub struct Generator {
    rng: ChaCha8Rng,
    seed: u64,
}

impl Generator {
    /// Create a generator seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create a generator with a specific seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Derive a generator from a seed and a label.
    ///
    /// Uses SHA-256 of (seed || label) so that distinct labels get
    /// independent streams under one global seed.
    pub fn derived(seed: u64, label: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(seed.to_le_bytes());
        hasher.update(label.as_bytes());
        let hash = hasher.finalize();

        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash[0..8]);
        Self::with_seed(u64::from_le_bytes(bytes))
    }

    /// Reset the stream to the start of `seed`.
    pub fn manual_seed(&mut self, seed: u64) -> &mut Self {
        *self = Self::with_seed(seed);
        self
    }

    /// The seed this stream started from.
    pub fn initial_seed(&self) -> u64 {
        self.seed
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for Generator {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Seed this thread's default generator.
pub fn manual_seed(seed: u64) {
    DEFAULT.with(|default| {
        default.borrow_mut().manual_seed(seed);
    });
}

/// Run `f` with the supplied generator, or with this thread's default one.
pub(crate) fn with_generator<T>(
    generator: Option<&mut Generator>,
    f: impl FnOnce(&mut Generator) -> T,
) -> T {
    match generator {
        Some(generator) => f(generator),
        None => DEFAULT.with(|default| f(&mut *default.borrow_mut())),
    }
}
