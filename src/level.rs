//! Level hypervectors: an ordered scale with linearly decaying similarity.
//!
//! Vector 0 is random. A fixed seeded permutation of `[0, d)` decides the
//! order in which positions change; vector `i` has the first `offset(i)`
//! permuted positions toggled relative to vector 0. The toggled set only
//! grows with the index, so similarity to vector 0 never increases, and the
//! offsets are spread evenly so the decay is linear down to
//! `min_similarity` at index `n - 1`.
//!
//! BSC families accept a sparsity. Away from 0.5 the toggled positions are
//! copied from a partner vector of the same sparsity, so every vector keeps
//! that density and the last one becomes the partner itself when
//! `min_similarity` is 0 or less.
//!
//! Used to encode ordered values such as pixel intensities, where nearby
//! levels should be similar and distant ones dissimilar.

use crate::basis::{
    check_similarity, check_unit_interval, partition, permutation, require_toggle_model,
    resolve_sparsity, scramble, Canonical, Request, Toggle,
};
use crate::batch::Batch;
use crate::error::{HdError, Result};
use crate::generator::{with_generator, Generator};
use crate::model::{DType, Device, Model};

/// Options for [`level`].
#[derive(Clone, Debug)]
pub struct LevelOptions {
    /// Element type; the model default when `None`.
    pub dtype: Option<DType>,
    /// Placement; the configured default when `None`.
    pub device: Option<Device>,
    /// Gradient tracking flag on the result.
    pub requires_grad: bool,
    /// Interpolates from an exact level family (0.0) toward independent
    /// random vectors (1.0).
    pub randomness: f64,
    /// Cosine similarity between the first and last vector.
    pub min_similarity: f64,
    /// Lowest value of the encoded range, mapped to index 0.
    pub low: f64,
    /// Highest value of the encoded range, mapped to index `n - 1`.
    pub high: f64,
    /// BSC only: probability of an element being `false`. Defaults to 0.5.
    pub sparsity: Option<f64>,
}

impl Default for LevelOptions {
    fn default() -> Self {
        Self {
            dtype: None,
            device: None,
            requires_grad: false,
            randomness: 0.0,
            min_similarity: 0.0,
            low: 0.0,
            high: 1.0,
            sparsity: None,
        }
    }
}

impl LevelOptions {
    pub fn dtype(mut self, dtype: DType) -> Self {
        self.dtype = Some(dtype);
        self
    }

    pub fn device(mut self, device: Device) -> Self {
        self.device = Some(device);
        self
    }

    pub fn requires_grad(mut self, requires_grad: bool) -> Self {
        self.requires_grad = requires_grad;
        self
    }

    pub fn randomness(mut self, randomness: f64) -> Self {
        self.randomness = randomness;
        self
    }

    pub fn min_similarity(mut self, min_similarity: f64) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    pub fn sparsity(mut self, sparsity: f64) -> Self {
        self.sparsity = Some(sparsity);
        self
    }

    pub fn range(mut self, low: f64, high: f64) -> Self {
        self.low = low;
        self.high = high;
        self
    }

    /// Index of the level encoding `value` in a family of `n`.
    pub fn index_of(&self, value: f64, n: usize) -> usize {
        level_index(value, self.low, self.high, n)
    }
}

/// Map `value` in `[low, high]` to a level index in `[0, n)`.
///
/// Values outside the range clamp to the first or last level.
pub fn level_index(value: f64, low: f64, high: f64, n: usize) -> usize {
    if n <= 1 || high <= low || value.is_nan() {
        return 0;
    }
    let fraction = ((value - low) / (high - low)).clamp(0.0, 1.0);
    (fraction * (n - 1) as f64).round() as usize
}

/// Generate `n` level hypervectors of dimensionality `d`.
///
/// HRR has no toggle construction and is rejected.
///
/// # Example
///
/// ```
/// use hypervec::{level, Generator, LevelOptions, Model, Similarity};
///
/// let mut g = Generator::with_seed(1);
/// let hv = level(5, 10000, Model::Map, &LevelOptions::default(), Some(&mut g)).unwrap();
/// let first = hv.row(0).unwrap();
/// let s1 = Similarity::cosine(&first, &hv.row(1).unwrap()).unwrap();
/// let s4 = Similarity::cosine(&first, &hv.row(4).unwrap()).unwrap();
/// assert!(s1 > s4);
/// ```
pub fn level(
    n: usize,
    d: usize,
    model: Model,
    options: &LevelOptions,
    generator: Option<&mut Generator>,
) -> Result<Batch> {
    require_toggle_model(model, "level")?;
    let request = Request::validate(
        n,
        d,
        model,
        options.dtype,
        options.device,
        options.requires_grad,
    )?;
    check_unit_interval("randomness", options.randomness)?;
    check_similarity(options.min_similarity)?;
    if !(options.low < options.high) {
        return Err(HdError::InvalidParameter(format!(
            "level range must satisfy low < high, got [{}, {}]",
            options.low, options.high
        )));
    }

    let sparsity = resolve_sparsity(model, options.sparsity)?;

    with_generator(generator, |rng| {
        let base = Canonical::sample(model, d, d, sparsity, rng)?;
        let toggle = Toggle::new(model, d, sparsity, rng)?;
        let order = permutation(d, rng);
        let toggles = toggle.span(d, options.min_similarity);
        let offsets = partition(toggles, n - 1);

        tracing::debug!(
            n,
            d,
            %model,
            dtype = %request.dtype,
            toggles,
            sparsity,
            randomness = options.randomness,
            "generating level hypervectors"
        );

        let mut rows = base.empty_like(request.len());
        let mut current = base.clone();
        for i in 0..n {
            if i > 0 {
                for &position in &order[offsets[i - 1]..offsets[i]] {
                    toggle.apply(&mut current, &base, position);
                }
            }
            rows.extend(&current);
        }
        debug_assert_eq!(rows.len(), request.len());

        scramble(&mut rows, &request, options.randomness, sparsity, rng)?;
        request.finish(rows)
    })
}
