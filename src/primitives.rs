//! VSA primitives: the algebra attached to each model.
//!
//! | Model | bind | inverse | bundle | quantize |
//! |---|---|---|---|---|
//! | BSC | XOR | identity | majority, random ties | identity |
//! | MAP | multiply | identity | sum | sign (>0 → +1, else -1) |
//! | HRR | circular convolution | involution | sum | unit L2 norm per row |
//! | FHRR | complex multiply | conjugate | sum | unit magnitude per element |
//!
//! Binary operations take two batches of one model. The second operand may
//! be a single row, which is applied to every row of the first. Bundles of
//! integer MAP batches are stored as `Int64` so sums never saturate.

use rand::RngCore;

use crate::batch::{Batch, Complex, Values};
use crate::error::{HdError, Result};
use crate::generator::{with_generator, Generator};
use crate::model::{DType, Model};

/// Collection of VSA primitive operations.
pub struct Primitives;

impl Primitives {
    /// Bind two batches.
    ///
    /// The result is dissimilar to both inputs, and
    /// `unbind(bind(a, b), b) ≈ a`. HRR binding is a direct circular
    /// convolution, O(d²) per row.
    pub fn bind(a: &Batch, b: &Batch) -> Result<Batch> {
        let d = a.dimensions();
        let rhs = broadcast(a, b)?;
        let values = match (a.values(), rhs) {
            (Values::Bool(x), Values::Bool(y)) => {
                Values::Bool(x.iter().zip(y.iter()).map(|(&p, &q)| p ^ q).collect())
            }
            (Values::Real(x), Values::Real(y)) if a.model() == Model::Hrr => {
                let mut out = Vec::with_capacity(x.len());
                for (xs, ys) in x.chunks(d).zip(y.chunks(d)) {
                    out.extend(circular_convolution(xs, ys));
                }
                Values::Real(out)
            }
            (Values::Real(x), Values::Real(y)) => {
                Values::Real(x.iter().zip(y.iter()).map(|(&p, &q)| p * q).collect())
            }
            (Values::Complex(x), Values::Complex(y)) => {
                Values::Complex(x.iter().zip(y.iter()).map(|(&p, &q)| p * q).collect())
            }
            _ => return Err(domain_mismatch(a, b)),
        };
        Ok(a.with_values(a.rows(), values))
    }

    /// Inverse under binding.
    pub fn inverse(a: &Batch) -> Batch {
        let d = a.dimensions();
        let values = match (a.model(), a.values()) {
            (Model::Hrr, Values::Real(x)) => {
                let mut out = Vec::with_capacity(x.len());
                for row in x.chunks(d) {
                    out.push(row[0]);
                    out.extend(row[1..].iter().rev());
                }
                Values::Real(out)
            }
            (Model::Fhrr, Values::Complex(x)) => {
                Values::Complex(x.into_iter().map(|z| z.conj()).collect())
            }
            (_, values) => values,
        };
        a.with_values(a.rows(), values)
    }

    /// Unbind `key` from `bound`: `bind(bound, inverse(key))`.
    pub fn unbind(bound: &Batch, key: &Batch) -> Result<Batch> {
        Self::bind(bound, &Self::inverse(key))
    }

    /// Bundle two batches into their superposition.
    ///
    /// BSC breaks ties (positions where the inputs disagree) with random bits
    /// drawn from `generator`, or from the default generator.
    pub fn bundle(a: &Batch, b: &Batch, generator: Option<&mut Generator>) -> Result<Batch> {
        let rhs = broadcast(a, b)?;
        let values = match (a.values(), rhs) {
            (Values::Bool(x), Values::Bool(y)) => with_generator(generator, |rng| {
                Values::Bool(
                    x.iter()
                        .zip(y.iter())
                        .map(|(&p, &q)| if p == q { p } else { rng.next_u32() & 1 == 1 })
                        .collect(),
                )
            }),
            (Values::Real(x), Values::Real(y)) => {
                Values::Real(x.iter().zip(y.iter()).map(|(&p, &q)| p + q).collect())
            }
            (Values::Complex(x), Values::Complex(y)) => {
                Values::Complex(x.iter().zip(y.iter()).map(|(&p, &q)| p + q).collect())
            }
            _ => return Err(domain_mismatch(a, b)),
        };
        Ok(a.with_values_as(a.rows(), values, sum_dtype(a.dtype())))
    }

    /// Bundle every row of `batch` into a single `(1, d)` hypervector.
    ///
    /// BSC takes the element-wise majority; ties (even row counts) are
    /// broken with random bits.
    pub fn multibundle(batch: &Batch, generator: Option<&mut Generator>) -> Batch {
        let d = batch.dimensions();
        let rows = batch.rows();
        let values = match batch.values() {
            Values::Bool(x) => {
                let mut counts = vec![0usize; d];
                for row in x.chunks(d) {
                    for (count, &bit) in counts.iter_mut().zip(row.iter()) {
                        *count += bit as usize;
                    }
                }
                with_generator(generator, |rng| {
                    Values::Bool(
                        counts
                            .iter()
                            .map(|&c| match (2 * c).cmp(&rows) {
                                std::cmp::Ordering::Greater => true,
                                std::cmp::Ordering::Less => false,
                                std::cmp::Ordering::Equal => rng.next_u32() & 1 == 1,
                            })
                            .collect(),
                    )
                })
            }
            Values::Real(x) => {
                let mut sums = vec![0.0; d];
                for row in x.chunks(d) {
                    for (sum, &v) in sums.iter_mut().zip(row.iter()) {
                        *sum += v;
                    }
                }
                Values::Real(sums)
            }
            Values::Complex(x) => {
                let mut sums = vec![Complex::<f64>::default(); d];
                for row in x.chunks(d) {
                    for (sum, &z) in sums.iter_mut().zip(row.iter()) {
                        *sum = *sum + z;
                    }
                }
                Values::Complex(sums)
            }
        };
        batch.with_values_as(1, values, sum_dtype(batch.dtype()))
    }

    /// Circular shift of every row by `shifts` positions.
    ///
    /// Used for encoding sequential position.
    pub fn permute(batch: &Batch, shifts: isize) -> Batch {
        let d = batch.dimensions();
        let shift = shifts.rem_euclid(d as isize) as usize;
        let values = match batch.values() {
            Values::Bool(x) => Values::Bool(roll(&x, d, shift)),
            Values::Real(x) => Values::Real(roll(&x, d, shift)),
            Values::Complex(x) => Values::Complex(roll(&x, d, shift)),
        };
        batch.with_values(batch.rows(), values)
    }

    /// Map aggregated values back into the model's canonical domain.
    pub fn quantize(batch: &Batch) -> Batch {
        let d = batch.dimensions();
        let values = match (batch.model(), batch.values()) {
            (Model::Map, Values::Real(x)) => Values::Real(hard_quantize(&x)),
            (Model::Hrr, Values::Real(x)) => {
                let mut out = Vec::with_capacity(x.len());
                for row in x.chunks(d) {
                    let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
                    if norm < 1e-10 {
                        out.extend_from_slice(row);
                    } else {
                        out.extend(row.iter().map(|v| v / norm));
                    }
                }
                Values::Real(out)
            }
            (Model::Fhrr, Values::Complex(x)) => Values::Complex(
                x.into_iter()
                    .map(|z| {
                        let norm = z.norm();
                        if norm < 1e-10 {
                            Complex { re: 1.0, im: 0.0 }
                        } else {
                            Complex {
                                re: z.re / norm,
                                im: z.im / norm,
                            }
                        }
                    })
                    .collect(),
            ),
            (_, values) => values,
        };
        batch.with_values(batch.rows(), values)
    }
}

/// Sign quantization: positive → +1, everything else → -1.
pub fn hard_quantize(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .map(|&v| if v > 0.0 { 1.0 } else { -1.0 })
        .collect()
}

/// Storage for a sum of rows.
fn sum_dtype(dtype: DType) -> DType {
    match dtype {
        DType::Int8 | DType::Int16 | DType::Int32 => DType::Int64,
        other => other,
    }
}

/// Second operand's values, repeated per row when it is a single row.
fn broadcast(a: &Batch, b: &Batch) -> Result<Values> {
    if a.model() != b.model() {
        return Err(HdError::ModelMismatch {
            expected: a.model(),
            got: b.model(),
        });
    }
    if a.shape() == b.shape() {
        return Ok(b.values());
    }
    if b.rows() != 1 || b.dimensions() != a.dimensions() {
        return Err(HdError::ShapeMismatch {
            expected: a.shape(),
            got: b.shape(),
        });
    }
    let repeated = match b.values() {
        Values::Bool(v) => Values::Bool(v.repeat(a.rows())),
        Values::Real(v) => Values::Real(v.repeat(a.rows())),
        Values::Complex(v) => Values::Complex(v.repeat(a.rows())),
    };
    Ok(repeated)
}

fn domain_mismatch(a: &Batch, b: &Batch) -> HdError {
    HdError::DTypeMismatch {
        expected: a.dtype(),
        got: b.dtype(),
    }
}

fn circular_convolution(a: &[f64], b: &[f64]) -> Vec<f64> {
    let d = a.len();
    (0..d)
        .map(|k| {
            (0..d)
                .map(|j| a[j] * b[(k + d - j) % d])
                .sum::<f64>()
        })
        .collect()
}

fn roll<T: Copy>(data: &[T], d: usize, shift: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(data.len());
    for row in data.chunks(d) {
        out.extend_from_slice(&row[d - shift..]);
        out.extend_from_slice(&row[..d - shift]);
    }
    out
}
