//! Model registry: the supported VSA models and their value domains.
//!
//! | Model | Domain | Default dtype | Allowed dtypes |
//! |---|---|---|---|
//! | BSC | {false, true} | Bool | Bool |
//! | MAP | {-1, +1} | default float | Int8..Int64, Float32, Float64 |
//! | HRR | real, zero mean | default float | Float32, Float64 |
//! | FHRR | unit complex | Complex64 | Complex64, Complex128 |
//!
//! The default float is taken from [`Config`], mirroring a process-wide
//! default floating point type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{HdError, Result};

/// A VSA algebraic model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Model {
    /// Binary Spatter Codes
    Bsc,
    /// Multiply-Add-Permute
    Map,
    /// Holographic Reduced Representations
    Hrr,
    /// Fourier Holographic Reduced Representations
    Fhrr,
}

/// All models, in registry order.
pub const MODELS: [Model; 4] = [Model::Bsc, Model::Map, Model::Hrr, Model::Fhrr];

/// Element type of a [`Batch`](crate::Batch).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Complex64,
    Complex128,
}

/// All dtypes, in registry order.
pub const DTYPES: [DType; 9] = [
    DType::Bool,
    DType::Int8,
    DType::Int16,
    DType::Int32,
    DType::Int64,
    DType::Float32,
    DType::Float64,
    DType::Complex64,
    DType::Complex128,
];

impl DType {
    /// Real floating point dtypes.
    pub fn is_float(self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }

    /// Complex dtypes.
    pub fn is_complex(self) -> bool {
        matches!(self, DType::Complex64 | DType::Complex128)
    }

    /// Whether a batch of this dtype may carry `requires_grad`.
    pub fn supports_grad(self) -> bool {
        self.is_float() || self.is_complex()
    }
}

/// Storage placement of a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Device {
    #[default]
    Cpu,
    Cuda(usize),
}

impl Device {
    /// Fail unless storage can be allocated on this device.
    pub fn ensure_available(self) -> Result<Self> {
        match self {
            Device::Cpu => Ok(self),
            Device::Cuda(_) => Err(HdError::UnavailableDevice(self)),
        }
    }
}

impl Model {
    /// The dtypes a batch of this model may be stored as.
    pub fn allowed_dtypes(self) -> &'static [DType] {
        match self {
            Model::Bsc => &[DType::Bool],
            Model::Map => &[
                DType::Int8,
                DType::Int16,
                DType::Int32,
                DType::Int64,
                DType::Float32,
                DType::Float64,
            ],
            Model::Hrr => &[DType::Float32, DType::Float64],
            Model::Fhrr => &[DType::Complex64, DType::Complex128],
        }
    }

    /// Whether `dtype` is in the allowed set.
    pub fn supports(self, dtype: DType) -> bool {
        self.allowed_dtypes().contains(&dtype)
    }

    /// The dtype used when the caller does not request one.
    pub fn default_dtype(self, config: &Config) -> DType {
        match self {
            Model::Bsc => DType::Bool,
            Model::Map | Model::Hrr => config.default_float,
            Model::Fhrr => DType::Complex64,
        }
    }

    /// Effective dtype for a request: the requested one if allowed, else the default.
    pub fn resolve_dtype(self, requested: Option<DType>, config: &Config) -> Result<DType> {
        let dtype = requested.unwrap_or_else(|| self.default_dtype(config));
        if self.supports(dtype) {
            Ok(dtype)
        } else {
            Err(HdError::InvalidDtypeForModel { model: self, dtype })
        }
    }

    /// Whether generation accepts a BSC sparsity.
    pub fn accepts_sparsity(self) -> bool {
        matches!(self, Model::Bsc)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Model::Bsc => "BSC",
            Model::Map => "MAP",
            Model::Hrr => "HRR",
            Model::Fhrr => "FHRR",
        };
        f.write_str(name)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Bool => "bool",
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Complex64 => "complex64",
            DType::Complex128 => "complex128",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => f.write_str("cpu"),
            Device::Cuda(ordinal) => write!(f, "cuda:{}", ordinal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(Model::Bsc.default_dtype(&config), DType::Bool);
        assert_eq!(Model::Map.default_dtype(&config), DType::Float32);
        assert_eq!(Model::Hrr.default_dtype(&config), DType::Float32);
        assert_eq!(Model::Fhrr.default_dtype(&config), DType::Complex64);
    }

    #[test]
    fn test_default_follows_config() {
        let config = Config {
            default_float: DType::Float64,
            ..Config::default()
        };
        assert_eq!(Model::Map.resolve_dtype(None, &config).unwrap(), DType::Float64);
        assert_eq!(Model::Fhrr.resolve_dtype(None, &config).unwrap(), DType::Complex64);
    }

    #[test]
    fn test_every_default_is_allowed() {
        let config = Config::default();
        for model in MODELS {
            assert!(model.supports(model.default_dtype(&config)));
        }
    }

    #[test]
    fn test_rejects_unsupported() {
        let config = Config::default();
        let err = Model::Bsc
            .resolve_dtype(Some(DType::Complex64), &config)
            .unwrap_err();
        assert!(matches!(
            err,
            HdError::InvalidDtypeForModel {
                model: Model::Bsc,
                dtype: DType::Complex64
            }
        ));
        assert!(Model::Hrr.resolve_dtype(Some(DType::Int32), &config).is_err());
        assert!(Model::Map.resolve_dtype(Some(DType::Bool), &config).is_err());
    }

    #[test]
    fn test_device() {
        assert_eq!(Device::Cpu.ensure_available().unwrap(), Device::Cpu);
        assert!(Device::Cuda(0).ensure_available().is_err());
        assert_eq!(Device::Cuda(1).to_string(), "cuda:1");
    }
}
