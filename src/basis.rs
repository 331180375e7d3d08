//! Shared machinery for the basis constructors.
//!
//! Every constructor works in a model's canonical domain (bits, signs, reals
//! or phases), then narrows into the requested dtype once at the end. The
//! level and circular families are built by toggling positions taken from
//! one seeded permutation of `[0, d)`.

use std::f64::consts::{PI, TAU};

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use rand_distr::{Distribution, Normal};

use crate::batch::{element_count, Batch, Complex, Values};
use crate::config::Config;
use crate::error::{HdError, Result};
use crate::generator::Generator;
use crate::model::{DType, Device, Model};

/// A validated generation request.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Request {
    pub rows: usize,
    pub dimensions: usize,
    pub model: Model,
    pub dtype: DType,
    pub device: Device,
    pub requires_grad: bool,
}

impl Request {
    /// Check shape, dtype, device and gradient flag. Nothing is allocated
    /// until this succeeds.
    pub(crate) fn validate(
        rows: usize,
        dimensions: usize,
        model: Model,
        dtype: Option<DType>,
        device: Option<Device>,
        requires_grad: bool,
    ) -> Result<Self> {
        if rows == 0 {
            return Err(HdError::InvalidParameter(
                "number of hypervectors must be at least 1".to_string(),
            ));
        }
        if dimensions == 0 {
            return Err(HdError::InvalidParameter(
                "dimensions must be at least 1".to_string(),
            ));
        }
        element_count(rows, dimensions)?;

        let config = Config::current();
        let dtype = model.resolve_dtype(dtype, &config)?;
        let device = device.unwrap_or(config.default_device).ensure_available()?;

        if requires_grad && !dtype.supports_grad() {
            return Err(HdError::InvalidParameter(format!(
                "requires_grad needs a float or complex dtype, got {}",
                dtype
            )));
        }

        Ok(Self {
            rows,
            dimensions,
            model,
            dtype,
            device,
            requires_grad,
        })
    }

    /// Total number of elements; checked during validation.
    pub(crate) fn len(&self) -> usize {
        self.rows * self.dimensions
    }

    /// Narrow canonical values into the requested batch.
    pub(crate) fn finish(&self, canonical: Canonical) -> Result<Batch> {
        let mut batch = Batch::from_values(
            self.model,
            self.rows,
            self.dimensions,
            canonical.into_values(),
            self.dtype,
            self.device,
        );
        batch.set_requires_grad(self.requires_grad)?;
        Ok(batch)
    }
}

/// Check that a fraction lies in `[0, 1]`.
pub(crate) fn check_unit_interval(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(HdError::InvalidParameter(format!(
            "{} must be in [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

/// Check that a similarity floor lies in `[-1, 1]`.
pub(crate) fn check_similarity(value: f64) -> Result<()> {
    if !(-1.0..=1.0).contains(&value) {
        return Err(HdError::InvalidParameter(format!(
            "min_similarity must be in [-1, 1], got {}",
            value
        )));
    }
    Ok(())
}

/// Effective BSC sparsity for a request. Other models reject one.
pub(crate) fn resolve_sparsity(model: Model, sparsity: Option<f64>) -> Result<f64> {
    match sparsity {
        None => Ok(0.5),
        Some(s) if !model.accepts_sparsity() => Err(HdError::InvalidParameter(format!(
            "sparsity {} is only supported for BSC, not {}",
            s, model
        ))),
        Some(s) => {
            check_unit_interval("sparsity", s)?;
            Ok(s)
        }
    }
}

/// Elements in a model's canonical domain.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Canonical {
    Bits(Vec<bool>),
    Signs(Vec<f64>),
    Reals(Vec<f64>),
    Phases(Vec<f64>),
}

impl Canonical {
    /// Draw `len` i.i.d. elements by the model's random rule.
    ///
    /// `dimensions` sets the HRR variance (1/d); `sparsity` is the BSC
    /// probability of `false`.
    pub(crate) fn sample(
        model: Model,
        len: usize,
        dimensions: usize,
        sparsity: f64,
        rng: &mut Generator,
    ) -> Result<Self> {
        let canonical = match model {
            Model::Bsc => {
                let p = 1.0 - sparsity;
                Canonical::Bits((0..len).map(|_| rng.gen_bool(p)).collect())
            }
            Model::Map => Canonical::Signs(
                (0..len)
                    .map(|_| if rng.next_u32() & 1 == 0 { 1.0 } else { -1.0 })
                    .collect(),
            ),
            Model::Hrr => {
                let std_dev = 1.0 / (dimensions as f64).sqrt();
                let normal = Normal::new(0.0, std_dev)
                    .map_err(|e| HdError::InvalidParameter(format!("HRR variance: {}", e)))?;
                Canonical::Reals((0..len).map(|_| normal.sample(rng)).collect())
            }
            Model::Fhrr => Canonical::Phases((0..len).map(|_| rng.gen_range(0.0..TAU)).collect()),
        };
        Ok(canonical)
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Canonical::Bits(v) => v.len(),
            Canonical::Signs(v) | Canonical::Reals(v) | Canonical::Phases(v) => v.len(),
        }
    }

    /// Set element `at` to the toggled value of `base[from]`.
    ///
    /// BSC flips, MAP negates, FHRR rotates the phase by π. Toggling is its
    /// own inverse, so cosine similarity to the base drops by `2/d` per
    /// toggled position.
    pub(crate) fn set_toggled(&mut self, at: usize, base: &Canonical, from: usize) {
        match (self, base) {
            (Canonical::Bits(dst), Canonical::Bits(src)) => dst[at] = !src[from],
            (Canonical::Signs(dst), Canonical::Signs(src))
            | (Canonical::Reals(dst), Canonical::Reals(src)) => dst[at] = -src[from],
            (Canonical::Phases(dst), Canonical::Phases(src)) => {
                let rotated = src[from] + PI;
                dst[at] = if rotated >= TAU { rotated - TAU } else { rotated };
            }
            _ => debug_assert!(false, "toggle across canonical domains"),
        }
    }

    /// Copy `src[from]` into element `at`.
    pub(crate) fn set_from(&mut self, at: usize, src: &Canonical, from: usize) {
        match (self, src) {
            (Canonical::Bits(dst), Canonical::Bits(src)) => dst[at] = src[from],
            (Canonical::Signs(dst), Canonical::Signs(src))
            | (Canonical::Reals(dst), Canonical::Reals(src))
            | (Canonical::Phases(dst), Canonical::Phases(src)) => dst[at] = src[from],
            _ => debug_assert!(false, "copy across canonical domains"),
        }
    }

    /// Append all of `other`.
    pub(crate) fn extend(&mut self, other: &Canonical) {
        match (self, other) {
            (Canonical::Bits(dst), Canonical::Bits(src)) => dst.extend_from_slice(src),
            (Canonical::Signs(dst), Canonical::Signs(src))
            | (Canonical::Reals(dst), Canonical::Reals(src))
            | (Canonical::Phases(dst), Canonical::Phases(src)) => dst.extend_from_slice(src),
            _ => debug_assert!(false, "extend across canonical domains"),
        }
    }

    /// Empty buffer of the same domain with room for `capacity` elements.
    pub(crate) fn empty_like(&self, capacity: usize) -> Canonical {
        match self {
            Canonical::Bits(_) => Canonical::Bits(Vec::with_capacity(capacity)),
            Canonical::Signs(_) => Canonical::Signs(Vec::with_capacity(capacity)),
            Canonical::Reals(_) => Canonical::Reals(Vec::with_capacity(capacity)),
            Canonical::Phases(_) => Canonical::Phases(Vec::with_capacity(capacity)),
        }
    }

    pub(crate) fn into_values(self) -> Values {
        match self {
            Canonical::Bits(v) => Values::Bool(v),
            Canonical::Signs(v) | Canonical::Reals(v) => Values::Real(v),
            Canonical::Phases(v) => {
                Values::Complex(v.into_iter().map(Complex::<f64>::from_phase).collect())
            }
        }
    }
}

/// The rule that moves a position away from the base.
///
/// Balanced families toggle in place: BSC flips, MAP negates, FHRR rotates
/// by π. A BSC family with sparsity other than 0.5 would drift toward half
/// density under flips, so it copies from a partner vector drawn with the
/// same sparsity instead.
pub(crate) struct Toggle {
    partner: Option<Canonical>,
}

impl Toggle {
    pub(crate) fn new(
        model: Model,
        dimensions: usize,
        sparsity: f64,
        rng: &mut Generator,
    ) -> Result<Self> {
        let partner = if model == Model::Bsc && sparsity != 0.5 {
            Some(Canonical::sample(model, dimensions, dimensions, sparsity, rng)?)
        } else {
            None
        };
        Ok(Self { partner })
    }

    /// Positions to move for the family to reach `min_similarity`.
    ///
    /// A partner only disagrees with the base on part of the positions, so
    /// the partner rule needs twice the flip span and saturates at `d`,
    /// where the last vector is the partner itself.
    pub(crate) fn span(&self, dimensions: usize, min_similarity: f64) -> usize {
        let toggles = span(dimensions, min_similarity);
        match self.partner {
            Some(_) => (2 * toggles).min(dimensions),
            None => toggles,
        }
    }

    pub(crate) fn apply(&self, current: &mut Canonical, base: &Canonical, position: usize) {
        match &self.partner {
            Some(partner) => current.set_from(position, partner, position),
            None => current.set_toggled(position, base, position),
        }
    }
}

/// Seeded permutation of `[0, len)`.
pub(crate) fn permutation(len: usize, rng: &mut Generator) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(rng);
    order
}

/// Cumulative offsets splitting `total` over `steps` transitions.
///
/// Returns `steps + 1` offsets from 0 to `total`. Each transition gets
/// `total / steps`; the remainder goes one apiece to the earliest ones.
pub(crate) fn partition(total: usize, steps: usize) -> Vec<usize> {
    if steps == 0 {
        return vec![0];
    }
    let share = total / steps;
    let remainder = total % steps;
    (0..=steps).map(|i| i * share + i.min(remainder)).collect()
}

/// Positions that must toggle to bring cosine similarity down to
/// `min_similarity`.
pub(crate) fn span(dimensions: usize, min_similarity: f64) -> usize {
    let toggles = (dimensions as f64 * (1.0 - min_similarity) / 2.0).round() as usize;
    toggles.min(dimensions)
}

/// Resample `round(randomness * d)` positions of every row after the first
/// from the model's random rule.
pub(crate) fn scramble(
    rows: &mut Canonical,
    request: &Request,
    randomness: f64,
    sparsity: f64,
    rng: &mut Generator,
) -> Result<()> {
    let d = request.dimensions;
    let amount = ((randomness * d as f64).round() as usize).min(d);
    if amount == 0 {
        return Ok(());
    }

    for row in 1..request.rows {
        let fresh = Canonical::sample(request.model, d, d, sparsity, rng)?;
        for position in rand::seq::index::sample(rng, d, amount) {
            rows.set_from(row * d + position, &fresh, position);
        }
    }
    Ok(())
}

/// Reject models that have no toggle construction.
pub(crate) fn require_toggle_model(model: Model, generator: &'static str) -> Result<()> {
    match model {
        Model::Hrr => Err(HdError::UnsupportedModelForGenerator { model, generator }),
        Model::Bsc | Model::Map | Model::Fhrr => Ok(()),
    }
}
