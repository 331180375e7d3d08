//! Batch type for hypervec.
//!
//! A [`Batch`] is a dense, row-major `(n, d)` container of `n` hypervectors of
//! dimensionality `d`, all sharing one model, dtype and device.

use std::ops::{Add, Mul};

use serde::{Deserialize, Serialize};

use crate::error::{HdError, Result};
use crate::model::{DType, Device, Model};

/// A complex number stored as real and imaginary parts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Complex<T> {
    pub re: T,
    pub im: T,
}

impl Complex<f64> {
    /// Unit complex number with the given phase.
    pub fn from_phase(theta: f64) -> Self {
        Self {
            re: theta.cos(),
            im: theta.sin(),
        }
    }

    /// Magnitude.
    pub fn norm(self) -> f64 {
        self.re.hypot(self.im)
    }

    /// Complex conjugate.
    pub fn conj(self) -> Self {
        Self {
            re: self.re,
            im: -self.im,
        }
    }
}

impl Complex<f32> {
    /// Magnitude.
    pub fn norm(self) -> f32 {
        self.re.hypot(self.im)
    }
}

impl Add for Complex<f64> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

impl Mul for Complex<f64> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self {
            re: self.re * rhs.re - self.im * rhs.im,
            im: self.re * rhs.im + self.im * rhs.re,
        }
    }
}

/// Typed element storage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Storage {
    Bool(Vec<bool>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Complex64(Vec<Complex<f32>>),
    Complex128(Vec<Complex<f64>>),
}

/// Element values widened to the three working domains used by the
/// generators and operators.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Values {
    Bool(Vec<bool>),
    Real(Vec<f64>),
    Complex(Vec<Complex<f64>>),
}

impl Values {
    pub(crate) fn len(&self) -> usize {
        match self {
            Values::Bool(v) => v.len(),
            Values::Real(v) => v.len(),
            Values::Complex(v) => v.len(),
        }
    }
}

impl Storage {
    /// Element type.
    pub fn dtype(&self) -> DType {
        match self {
            Storage::Bool(_) => DType::Bool,
            Storage::Int8(_) => DType::Int8,
            Storage::Int16(_) => DType::Int16,
            Storage::Int32(_) => DType::Int32,
            Storage::Int64(_) => DType::Int64,
            Storage::Float32(_) => DType::Float32,
            Storage::Float64(_) => DType::Float64,
            Storage::Complex64(_) => DType::Complex64,
            Storage::Complex128(_) => DType::Complex128,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Storage::Bool(v) => v.len(),
            Storage::Int8(v) => v.len(),
            Storage::Int16(v) => v.len(),
            Storage::Int32(v) => v.len(),
            Storage::Int64(v) => v.len(),
            Storage::Float32(v) => v.len(),
            Storage::Float64(v) => v.len(),
            Storage::Complex64(v) => v.len(),
            Storage::Complex128(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Narrow working values into `dtype`.
    ///
    /// Reals round to the nearest integer for integer dtypes; complex
    /// values keep their real part for real dtypes.
    pub(crate) fn from_values(values: Values, dtype: DType) -> Self {
        match values {
            Values::Bool(v) => match dtype {
                DType::Bool => Storage::Bool(v),
                _ => Self::from_values(
                    Values::Real(v.into_iter().map(|b| if b { 1.0 } else { 0.0 }).collect()),
                    dtype,
                ),
            },
            Values::Real(v) => match dtype {
                DType::Bool => Storage::Bool(v.into_iter().map(|x| x != 0.0).collect()),
                DType::Int8 => Storage::Int8(v.into_iter().map(|x| x.round() as i8).collect()),
                DType::Int16 => Storage::Int16(v.into_iter().map(|x| x.round() as i16).collect()),
                DType::Int32 => Storage::Int32(v.into_iter().map(|x| x.round() as i32).collect()),
                DType::Int64 => Storage::Int64(v.into_iter().map(|x| x.round() as i64).collect()),
                DType::Float32 => Storage::Float32(v.into_iter().map(|x| x as f32).collect()),
                DType::Float64 => Storage::Float64(v),
                DType::Complex64 | DType::Complex128 => Self::from_values(
                    Values::Complex(v.into_iter().map(|re| Complex { re, im: 0.0 }).collect()),
                    dtype,
                ),
            },
            Values::Complex(v) => match dtype {
                DType::Complex64 => Storage::Complex64(
                    v.into_iter()
                        .map(|z| Complex {
                            re: z.re as f32,
                            im: z.im as f32,
                        })
                        .collect(),
                ),
                DType::Complex128 => Storage::Complex128(v),
                _ => Self::from_values(Values::Real(v.into_iter().map(|z| z.re).collect()), dtype),
            },
        }
    }

    /// Widen into working values.
    pub(crate) fn to_values(&self) -> Values {
        match self {
            Storage::Bool(v) => Values::Bool(v.clone()),
            Storage::Int8(v) => Values::Real(v.iter().map(|&x| x as f64).collect()),
            Storage::Int16(v) => Values::Real(v.iter().map(|&x| x as f64).collect()),
            Storage::Int32(v) => Values::Real(v.iter().map(|&x| x as f64).collect()),
            Storage::Int64(v) => Values::Real(v.iter().map(|&x| x as f64).collect()),
            Storage::Float32(v) => Values::Real(v.iter().map(|&x| x as f64).collect()),
            Storage::Float64(v) => Values::Real(v.clone()),
            Storage::Complex64(v) => Values::Complex(
                v.iter()
                    .map(|z| Complex {
                        re: z.re as f64,
                        im: z.im as f64,
                    })
                    .collect(),
            ),
            Storage::Complex128(v) => Values::Complex(v.clone()),
        }
    }

    fn slice(&self, start: usize, end: usize) -> Self {
        match self {
            Storage::Bool(v) => Storage::Bool(v[start..end].to_vec()),
            Storage::Int8(v) => Storage::Int8(v[start..end].to_vec()),
            Storage::Int16(v) => Storage::Int16(v[start..end].to_vec()),
            Storage::Int32(v) => Storage::Int32(v[start..end].to_vec()),
            Storage::Int64(v) => Storage::Int64(v[start..end].to_vec()),
            Storage::Float32(v) => Storage::Float32(v[start..end].to_vec()),
            Storage::Float64(v) => Storage::Float64(v[start..end].to_vec()),
            Storage::Complex64(v) => Storage::Complex64(v[start..end].to_vec()),
            Storage::Complex128(v) => Storage::Complex128(v[start..end].to_vec()),
        }
    }
}

/// Widest element, in bytes, of any storage or working buffer.
const MAX_ELEMENT_BYTES: usize = 16;

/// `rows * dimensions`, or an error when the shape cannot be allocated.
pub(crate) fn element_count(rows: usize, dimensions: usize) -> Result<usize> {
    rows.checked_mul(dimensions)
        .filter(|&len| len <= isize::MAX as usize / MAX_ELEMENT_BYTES)
        .ok_or_else(|| {
            HdError::InvalidParameter(format!(
                "shape ({}, {}) is too large to allocate",
                rows, dimensions
            ))
        })
}

/// A batch of `n` hypervectors of dimensionality `d`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    model: Model,
    rows: usize,
    dimensions: usize,
    storage: Storage,
    device: Device,
    requires_grad: bool,
}

impl Batch {
    /// Wrap existing storage as a batch.
    ///
    /// Fails if the storage length is not `rows * dimensions` or its dtype
    /// is not allowed for `model`.
    pub fn new(model: Model, rows: usize, dimensions: usize, storage: Storage) -> Result<Self> {
        if rows == 0 || dimensions == 0 {
            return Err(HdError::InvalidParameter(format!(
                "batch shape must be non-empty, got ({}, {})",
                rows, dimensions
            )));
        }
        let len = element_count(rows, dimensions)?;
        if storage.len() != len {
            return Err(HdError::InvalidParameter(format!(
                "storage holds {} elements, shape ({}, {}) needs {}",
                storage.len(),
                rows,
                dimensions,
                len
            )));
        }
        let dtype = storage.dtype();
        if !model.supports(dtype) {
            return Err(HdError::InvalidDtypeForModel { model, dtype });
        }

        Ok(Self {
            model,
            rows,
            dimensions,
            storage,
            device: Device::Cpu,
            requires_grad: false,
        })
    }

    pub(crate) fn from_values(
        model: Model,
        rows: usize,
        dimensions: usize,
        values: Values,
        dtype: DType,
        device: Device,
    ) -> Self {
        debug_assert_eq!(values.len(), rows * dimensions);
        Self {
            model,
            rows,
            dimensions,
            storage: Storage::from_values(values, dtype),
            device,
            requires_grad: false,
        }
    }

    /// The model every row belongs to.
    pub fn model(&self) -> Model {
        self.model
    }

    /// Element type.
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    /// `(n, d)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.dimensions)
    }

    /// Number of hypervectors.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Dimensionality of each hypervector.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Gradient tracking flag.
    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// Set the gradient tracking flag.
    ///
    /// Only float and complex batches may track gradients.
    pub fn set_requires_grad(&mut self, requires_grad: bool) -> Result<()> {
        if requires_grad && !self.dtype().supports_grad() {
            return Err(HdError::InvalidParameter(format!(
                "requires_grad needs a float or complex dtype, got {}",
                self.dtype()
            )));
        }
        self.requires_grad = requires_grad;
        Ok(())
    }

    /// Raw storage.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Consume the batch, returning its storage.
    pub fn into_storage(self) -> Storage {
        self.storage
    }

    /// Row `index` as a `(1, d)` batch.
    pub fn row(&self, index: usize) -> Result<Batch> {
        if index >= self.rows {
            return Err(HdError::InvalidParameter(format!(
                "row {} out of range for {} rows",
                index, self.rows
            )));
        }
        let start = index * self.dimensions;
        Ok(Self {
            model: self.model,
            rows: 1,
            dimensions: self.dimensions,
            storage: self.storage.slice(start, start + self.dimensions),
            device: self.device,
            requires_grad: self.requires_grad,
        })
    }

    /// Row `index` widened to `f64`. Booleans map to 0/1, complex values to
    /// their real part.
    pub fn row_f64(&self, index: usize) -> Result<Vec<f64>> {
        match self.row(index)?.values() {
            Values::Bool(v) => Ok(v.into_iter().map(|b| if b { 1.0 } else { 0.0 }).collect()),
            Values::Real(v) => Ok(v),
            Values::Complex(v) => Ok(v.into_iter().map(|z| z.re).collect()),
        }
    }

    pub fn as_bool(&self) -> Option<&[bool]> {
        match &self.storage {
            Storage::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match &self.storage {
            Storage::Float32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<&[f64]> {
        match &self.storage {
            Storage::Float64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_complex64(&self) -> Option<&[Complex<f32>]> {
        match &self.storage {
            Storage::Complex64(v) => Some(v),
            _ => None,
        }
    }

    pub(crate) fn values(&self) -> Values {
        self.storage.to_values()
    }

    /// Build a batch like `self` (model, device, dtype) around new values.
    pub(crate) fn with_values(&self, rows: usize, values: Values) -> Batch {
        self.with_values_as(rows, values, self.dtype())
    }

    /// Like [`with_values`](Self::with_values), stored as `dtype`.
    pub(crate) fn with_values_as(&self, rows: usize, values: Values, dtype: DType) -> Batch {
        Batch::from_values(self.model, rows, self.dimensions, values, dtype, self.device)
    }
}
