//! # hypervec: hypervector generation for VSA models
//!
//! hypervec is a hyperdimensional computing (HDC) / vector symbolic
//! architecture (VSA) library. It generates families of random
//! high-dimensional vectors under four algebraic models and provides the
//! operations that combine them.
//!
//! ## Quick Start
//!
//! ```rust
//! use hypervec::{Model, Space};
//!
//! let mut space = Space::with_seed(Model::Map, 10000, 42);
//!
//! // Random symbols, an ordered scale, and a cyclic scale
//! let symbols = space.random(26)?;
//! let levels = space.level(100)?;
//! let hours = space.circular(24)?;
//!
//! // Algebra
//! let a = symbols.row(0)?;
//! let b = symbols.row(1)?;
//! let ab = space.bind(&a, &b)?;
//! let sim = space.similarity(&ab, &a)?;
//! assert!(sim.abs() < 0.1);
//! # Ok::<(), hypervec::HdError>(())
//! ```
//!
//! ## Core Concepts
//!
//! - **Models**: BSC (bits), MAP (±1), HRR (Gaussian reals), FHRR (unit complex)
//! - **Random**: i.i.d. quasi-orthogonal hypervectors
//! - **Level**: similarity to the first vector decays linearly with index
//! - **Circular**: similarity falls to the antipode, then rises back
//! - **Bind / Bundle / Quantize**: per-model algebra in [`Primitives`]

mod basis;
pub mod batch;
pub mod circular;
pub mod codebook;
pub mod config;
pub mod error;
pub mod generator;
pub mod level;
pub mod model;
pub mod primitives;
pub mod random;
pub mod similarity;

// Re-exports for convenience
pub use batch::{Batch, Complex, Storage};
pub use circular::{circular, CircularOptions};
pub use codebook::Codebook;
pub use config::Config;
pub use error::{HdError, Result};
pub use generator::{manual_seed, Generator};
pub use level::{level, level_index, LevelOptions};
pub use model::{DType, Device, Model, DTYPES, MODELS};
pub use primitives::{hard_quantize, Primitives};
pub use random::{random, RandomOptions};
pub use similarity::{Metric, Similarity};

/// A model and dimensionality bound to one seeded generator.
///
/// Convenience wrapper over the free functions: every call draws from the
/// space's own generator, so a space created with a seed replays the same
/// sequence of batches.
pub struct Space {
    model: Model,
    dimensions: usize,
    generator: Generator,
}

impl Space {
    /// Create a space seeded from OS entropy.
    pub fn new(model: Model, dimensions: usize) -> Self {
        Self {
            model,
            dimensions,
            generator: Generator::new(),
        }
    }

    /// Create a space with a specific seed.
    pub fn with_seed(model: Model, dimensions: usize, seed: u64) -> Self {
        Self {
            model,
            dimensions,
            generator: Generator::with_seed(seed),
        }
    }

    pub fn model(&self) -> Model {
        self.model
    }

    /// Get the vector dimensionality.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    // =========================================================================
    // Generation
    // =========================================================================

    /// `n` random hypervectors with default options.
    pub fn random(&mut self, n: usize) -> Result<Batch> {
        self.random_with(n, &RandomOptions::default())
    }

    pub fn random_with(&mut self, n: usize, options: &RandomOptions) -> Result<Batch> {
        random(n, self.dimensions, self.model, options, Some(&mut self.generator))
    }

    /// `n` level hypervectors with default options.
    pub fn level(&mut self, n: usize) -> Result<Batch> {
        self.level_with(n, &LevelOptions::default())
    }

    pub fn level_with(&mut self, n: usize, options: &LevelOptions) -> Result<Batch> {
        level(n, self.dimensions, self.model, options, Some(&mut self.generator))
    }

    /// `n` circular hypervectors with default options.
    pub fn circular(&mut self, n: usize) -> Result<Batch> {
        self.circular_with(n, &CircularOptions::default())
    }

    pub fn circular_with(&mut self, n: usize, options: &CircularOptions) -> Result<Batch> {
        circular(n, self.dimensions, self.model, options, Some(&mut self.generator))
    }

    // =========================================================================
    // VSA Primitives
    // =========================================================================

    /// Bind two batches (association).
    pub fn bind(&self, a: &Batch, b: &Batch) -> Result<Batch> {
        Primitives::bind(a, b)
    }

    /// Unbind to retrieve an associated value.
    pub fn unbind(&self, bound: &Batch, key: &Batch) -> Result<Batch> {
        Primitives::unbind(bound, key)
    }

    /// Bundle two batches (superposition).
    pub fn bundle(&mut self, a: &Batch, b: &Batch) -> Result<Batch> {
        Primitives::bundle(a, b, Some(&mut self.generator))
    }

    /// Bundle all rows of a batch into one hypervector.
    pub fn multibundle(&mut self, batch: &Batch) -> Batch {
        Primitives::multibundle(batch, Some(&mut self.generator))
    }

    /// Map a bundled batch back into the model's domain.
    pub fn quantize(&self, batch: &Batch) -> Batch {
        Primitives::quantize(batch)
    }

    // =========================================================================
    // Similarity
    // =========================================================================

    /// Cosine similarity between two equally shaped batches.
    pub fn similarity(&self, a: &Batch, b: &Batch) -> Result<f64> {
        Similarity::cosine(a, b)
    }

    /// Similarity with a specific metric.
    pub fn similarity_with_metric(&self, a: &Batch, b: &Batch, metric: Metric) -> Result<f64> {
        Similarity::compute(a, b, metric)
    }
}
