//! Error types for hypervec.

use thiserror::Error;

use crate::model::{DType, Device, Model};

/// Hypervector error types.
#[derive(Error, Debug)]
pub enum HdError {
    /// Requested dtype is not in the model's allowed set
    #[error("{model} does not support dtype {dtype}")]
    InvalidDtypeForModel { model: Model, dtype: DType },

    /// Out-of-range or inapplicable argument
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Construction has no definition for this model
    #[error("{generator} hypervectors are not supported for {model}")]
    UnsupportedModelForGenerator {
        model: Model,
        generator: &'static str,
    },

    /// Storage cannot be placed on the requested device
    #[error("Device {0} is not available")]
    UnavailableDevice(Device),

    /// Operands with incompatible shapes
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    /// Operands built under different models
    #[error("Model mismatch: expected {expected}, got {got}")]
    ModelMismatch { expected: Model, got: Model },

    /// Operands stored with different element types
    #[error("DType mismatch: expected {expected}, got {got}")]
    DTypeMismatch { expected: DType, got: DType },

    /// Configuration could not be parsed
    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type alias for hypervec operations.
pub type Result<T> = std::result::Result<T, HdError>;
