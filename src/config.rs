//! Generation defaults.
//!
//! Holds the values used when a request leaves them out: the default real
//! floating point dtype (used by MAP and HRR) and the default device. The
//! active config is per thread, like the default generator.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use crate::error::{HdError, Result};
use crate::model::{DType, Device};

thread_local! {
    static ACTIVE: RefCell<Config> = RefCell::new(Config::default());
}

/// Defaults applied to generation requests.
///
/// # Example
///
/// ```
/// use hypervec::{Config, DType};
///
/// let config = Config::from_json(r#"{"default_float": "Float64"}"#).unwrap();
/// assert_eq!(config.default_float, DType::Float64);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dtype for MAP and HRR when none is requested.
    /// Must be `Float32` or `Float64`.
    pub default_float: DType,

    /// Device used when none is requested.
    pub default_device: Device,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_float: DType::Float32,
            default_device: Device::Cpu,
        }
    }
}

impl Config {
    /// Parse a config from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the defaults are usable.
    pub fn validate(&self) -> Result<()> {
        if !self.default_float.is_float() {
            return Err(HdError::InvalidParameter(format!(
                "default_float must be a real floating point dtype, got {}",
                self.default_float
            )));
        }
        Ok(())
    }

    /// The config active on this thread.
    pub fn current() -> Config {
        ACTIVE.with(|active| active.borrow().clone())
    }

    /// Install `self` as this thread's active config.
    pub fn install(self) -> Result<()> {
        self.validate()?;
        tracing::debug!(
            default_float = %self.default_float,
            default_device = %self.default_device,
            "installing hypervec config"
        );
        ACTIVE.with(|active| *active.borrow_mut() = self);
        Ok(())
    }
}
