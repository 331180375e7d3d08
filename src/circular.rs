//! Circular hypervectors: a cyclic scale with a triangular similarity profile.
//!
//! Vector 0 is random. Two pointers walk one seeded permutation of
//! `[0, d)`. Over the outgoing arc (indices `0..=n/2`) the leading pointer
//! advances, toggling positions; over the returning arc (indices `n/2..n`,
//! where index `n` wraps back to 0) the trailing pointer follows it through
//! the same positions, restoring them. Vector `i` holds toggled exactly the
//! permuted positions in `[trail(i), lead(i))`, so:
//!
//! - similarity to vector 0 falls linearly to `min_similarity` at `n/2`,
//! - then rises linearly, and
//! - vector `n - 1` is one step away from vector 0, like its neighbours.
//!
//! BSC families accept a sparsity; away from 0.5 toggled positions are
//! copied from a partner vector of the same sparsity, so every vector keeps
//! that density.
//!
//! Used for periodic values: angles, hours, weekdays.

use crate::basis::{
    check_similarity, check_unit_interval, partition, permutation, require_toggle_model,
    resolve_sparsity, scramble, Canonical, Request, Toggle,
};
use crate::batch::Batch;
use crate::error::Result;
use crate::generator::{with_generator, Generator};
use crate::model::{DType, Device, Model};

/// Options for [`circular`].
#[derive(Clone, Debug)]
pub struct CircularOptions {
    /// Element type; the model default when `None`.
    pub dtype: Option<DType>,
    /// Placement; the configured default when `None`.
    pub device: Option<Device>,
    /// Gradient tracking flag on the result.
    pub requires_grad: bool,
    /// Interpolates from an exact circular family (0.0) toward independent
    /// random vectors (1.0).
    pub randomness: f64,
    /// Cosine similarity between vector 0 and the antipodal vector `n/2`.
    pub min_similarity: f64,
    /// BSC only: probability of an element being `false`. Defaults to 0.5.
    pub sparsity: Option<f64>,
}

impl Default for CircularOptions {
    fn default() -> Self {
        Self {
            dtype: None,
            device: None,
            requires_grad: false,
            randomness: 0.0,
            min_similarity: 0.0,
            sparsity: None,
        }
    }
}

impl CircularOptions {
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
}

/// Leading and trailing pointer positions for every index of the cycle.
///
/// The outgoing arc spans `n / 2` transitions and the returning arc the
/// remaining `n - n / 2`; each arc spreads `half_span` toggles with the
/// remainder on its earliest transitions.
fn pointers(n: usize, half_span: usize) -> Vec<(usize, usize)> {
    let half = n / 2;
    let lead = partition(half_span, half);
    let trail = partition(half_span, n - half);

    (0..n)
        .map(|i| {
            if i <= half {
                (0, lead[i])
            } else {
                (trail[i - half], half_span)
            }
        })
        .collect()
}

/// Generate `n` circular hypervectors of dimensionality `d`.
///
/// HRR has no toggle construction and is rejected.
///
/// # Example
///
/// ```
/// use hypervec::{circular, CircularOptions, Generator, Model, Similarity};
///
/// let mut g = Generator::with_seed(1);
/// let hv = circular(8, 8000, Model::Bsc, &CircularOptions::default(), Some(&mut g)).unwrap();
/// let first = hv.row(0).unwrap();
/// let far = Similarity::cosine(&first, &hv.row(4).unwrap()).unwrap();
/// let last = Similarity::cosine(&first, &hv.row(7).unwrap()).unwrap();
/// assert!(last > far);
/// ```
pub fn circular(
    n: usize,
    d: usize,
    model: Model,
    options: &CircularOptions,
    generator: Option<&mut Generator>,
) -> Result<Batch> {
    require_toggle_model(model, "circular")?;
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

    let sparsity = resolve_sparsity(model, options.sparsity)?;

    with_generator(generator, |rng| {
        let base = Canonical::sample(model, d, d, sparsity, rng)?;
        let toggle = Toggle::new(model, d, sparsity, rng)?;
        let order = permutation(d, rng);
        let half_span = toggle.span(d, options.min_similarity);

        tracing::debug!(
            n,
            d,
            %model,
            dtype = %request.dtype,
            half_span,
            sparsity,
            randomness = options.randomness,
            "generating circular hypervectors"
        );

        let mut rows = base.empty_like(request.len());
        let mut current = base.clone();
        let (mut trail, mut lead) = (0, 0);
        for (next_trail, next_lead) in pointers(n, half_span) {
            for &position in &order[lead..next_lead] {
                toggle.apply(&mut current, &base, position);
            }
            for &position in &order[trail..next_trail] {
                current.set_from(position, &base, position);
            }
            tracing::trace!(trail = next_trail, lead = next_lead, "circular step");
            trail = next_trail;
            lead = next_lead;
            rows.extend(&current);
        }
        debug_assert_eq!(rows.len(), request.len());

        scramble(&mut rows, &request, options.randomness, sparsity, rng)?;
        request.finish(rows)
    })
}
