//! Codebook: deterministic symbol → hypervector mapping.
//!
//! The same symbol under the same model, dimensionality and seed always maps
//! to the same random hypervector, on every run and machine.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::batch::Batch;
use crate::error::Result;
use crate::generator::Generator;
use crate::model::{DType, Model};
use crate::random::{random, RandomOptions};

/// Maps symbols to random hypervectors of one model.
///
/// Each symbol's vector is drawn from a generator derived from
/// SHA-256(seed || symbol), so lookups are order-independent.
#[derive(Clone)]
pub struct Codebook {
    model: Model,
    dimensions: usize,
    dtype: Option<DType>,
    global_seed: u64,
    /// Cache of computed vectors
    cache: Arc<RwLock<HashMap<String, Batch>>>,
}

impl Codebook {
    /// Create a codebook with seed 0.
    pub fn new(model: Model, dimensions: usize) -> Self {
        Self::with_seed(model, dimensions, 0)
    }

    /// Create a codebook with a specific global seed.
    pub fn with_seed(model: Model, dimensions: usize, global_seed: u64) -> Self {
        Self {
            model,
            dimensions,
            dtype: None,
            global_seed,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Store vectors as `dtype` instead of the model default.
    pub fn with_dtype(mut self, dtype: DType) -> Self {
        self.dtype = Some(dtype);
        self
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Get the `(1, d)` hypervector for a symbol.
    ///
    /// Computed on first use, then served from cache.
    pub fn get(&self, symbol: &str) -> Result<Batch> {
        if let Some(vec) = self.read_cache(symbol) {
            return Ok(vec);
        }

        let mut generator = Generator::derived(self.global_seed, symbol);
        let options = RandomOptions {
            dtype: self.dtype,
            ..RandomOptions::default()
        };
        let vec = random(1, self.dimensions, self.model, &options, Some(&mut generator))?;
        tracing::trace!(symbol, model = %self.model, "codebook miss");

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        cache.insert(symbol.to_string(), vec.clone());
        Ok(vec)
    }

    fn read_cache(&self, symbol: &str) -> Option<Batch> {
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        cache.get(symbol).cloned()
    }

    /// Clear the vector cache.
    pub fn clear_cache(&self) {
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        cache.clear();
    }

    /// Get the number of cached vectors.
    pub fn cache_size(&self) -> usize {
        let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
        cache.len()
    }
}
