//! Similarity metrics for hypervector comparison.
//!
//! Each model compares in its own domain:
//! - **BSC** bits are read as bipolar (`false` → -1, `true` → +1) for
//!   cosine and dot; Hamming counts agreeing bits.
//! - **MAP** and **HRR** compare as real vectors.
//! - **FHRR** uses the real part of the Hermitian inner product.
//!
//! When compiled with the `simd` feature, real dot products use
//! SIMD-accelerated kernels.

use crate::batch::{Batch, Values};
use crate::error::{HdError, Result};

/// Available similarity metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    /// Cosine similarity (scale-invariant)
    Cosine,
    /// Dot product (raw inner product)
    Dot,
    /// Hamming similarity (agreement rate)
    Hamming,
}

/// Similarity computation for batches.
pub struct Similarity;

impl Similarity {
    /// Compute similarity using the specified metric.
    pub fn compute(a: &Batch, b: &Batch, metric: Metric) -> Result<f64> {
        match metric {
            Metric::Cosine => Self::cosine(a, b),
            Metric::Dot => Self::dot(a, b),
            Metric::Hamming => Self::hamming(a, b),
        }
    }

    /// Cosine similarity: dot(a, b) / (||a|| * ||b||)
    ///
    /// Returns a value in [-1, 1]; 0 for a zero vector.
    pub fn cosine(a: &Batch, b: &Batch) -> Result<f64> {
        check_compatible(a, b)?;
        let (x, y) = (a.values(), b.values());
        let norm_product = (inner(&x, &x) * inner(&y, &y)).sqrt();
        if norm_product < 1e-10 {
            return Ok(0.0);
        }
        Ok(inner(&x, &y) / norm_product)
    }

    /// Raw dot product (real part for FHRR).
    pub fn dot(a: &Batch, b: &Batch) -> Result<f64> {
        check_compatible(a, b)?;
        Ok(inner(&a.values(), &b.values()))
    }

    /// Hamming similarity: fraction of positions that agree.
    ///
    /// Returns a value in [0, 1].
    pub fn hamming(a: &Batch, b: &Batch) -> Result<f64> {
        check_compatible(a, b)?;
        let matching = match (a.values(), b.values()) {
            (Values::Bool(x), Values::Bool(y)) => {
                x.iter().zip(y.iter()).filter(|(p, q)| p == q).count()
            }
            (Values::Real(x), Values::Real(y)) => {
                x.iter().zip(y.iter()).filter(|(p, q)| p == q).count()
            }
            (Values::Complex(x), Values::Complex(y)) => {
                x.iter().zip(y.iter()).filter(|(p, q)| p == q).count()
            }
            _ => 0,
        };
        Ok(matching as f64 / a.storage().len() as f64)
    }

    /// Similarity of a single query row to every row of `batch`.
    pub fn against(query: &Batch, batch: &Batch, metric: Metric) -> Result<Vec<f64>> {
        if query.rows() != 1 {
            return Err(HdError::ShapeMismatch {
                expected: (1, batch.dimensions()),
                got: query.shape(),
            });
        }
        (0..batch.rows())
            .map(|i| Self::compute(query, &batch.row(i)?, metric))
            .collect()
    }
}

fn check_compatible(a: &Batch, b: &Batch) -> Result<()> {
    if a.model() != b.model() {
        return Err(HdError::ModelMismatch {
            expected: a.model(),
            got: b.model(),
        });
    }
    if a.shape() != b.shape() {
        return Err(HdError::ShapeMismatch {
            expected: a.shape(),
            got: b.shape(),
        });
    }
    Ok(())
}

fn bipolar(bits: &[bool]) -> Vec<f64> {
    bits.iter().map(|&b| if b { 1.0 } else { -1.0 }).collect()
}

fn inner(a: &Values, b: &Values) -> f64 {
    match (a, b) {
        (Values::Bool(x), Values::Bool(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(&p, &q)| if p == q { 1.0 } else { -1.0 })
            .sum(),
        (Values::Real(x), Values::Real(y)) => real_dot(x, y),
        (Values::Complex(x), Values::Complex(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(&p, &q)| (p * q.conj()).re)
            .sum(),
        (Values::Bool(x), Values::Real(y)) => real_dot(&bipolar(x), y),
        (Values::Real(x), Values::Bool(y)) => real_dot(x, &bipolar(y)),
        _ => 0.0,
    }
}

#[cfg(feature = "simd")]
fn real_dot(a: &[f64], b: &[f64]) -> f64 {
    use simsimd::SpatialSimilarity;
    f64::dot(a, b).unwrap_or(0.0)
}

#[cfg(not(feature = "simd"))]
fn real_dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum()
}
