//! Random hypervectors: i.i.d. draws from each model's domain.
//!
//! - **BSC**: each element `true` with probability `1 - sparsity`
//! - **MAP**: each element ±1 with equal probability
//! - **HRR**: each element from N(0, 1/d), so norms are close to 1
//! - **FHRR**: unit complex numbers with phase uniform in [0, 2π)
//!
//! Random hypervectors of large dimension are quasi-orthogonal: their
//! pairwise cosine similarity concentrates around zero.

use crate::basis::{resolve_sparsity, Canonical, Request};
use crate::batch::Batch;
use crate::error::Result;
use crate::generator::{with_generator, Generator};
use crate::model::{DType, Device, Model};

/// Options for [`random`].
#[derive(Clone, Debug, Default)]
pub struct RandomOptions {
    /// Element type; the model default when `None`.
    pub dtype: Option<DType>,
    /// Placement; the configured default when `None`.
    pub device: Option<Device>,
    /// Gradient tracking flag on the result.
    pub requires_grad: bool,
    /// BSC only: probability of an element being `false`. Defaults to 0.5.
    pub sparsity: Option<f64>,
}

impl RandomOptions {
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

    pub fn sparsity(mut self, sparsity: f64) -> Self {
        self.sparsity = Some(sparsity);
        self
    }
}

/// Generate `n` random hypervectors of dimensionality `d`.
///
/// Draws from `generator`, or from this thread's default generator when
/// `None`.
///
/// # Example
///
/// ```
/// use hypervec::{random, Generator, Model, RandomOptions};
///
/// let mut g = Generator::with_seed(42);
/// let hv = random(3, 1000, Model::Map, &RandomOptions::default(), Some(&mut g)).unwrap();
/// assert_eq!(hv.shape(), (3, 1000));
/// ```
pub fn random(
    n: usize,
    d: usize,
    model: Model,
    options: &RandomOptions,
    generator: Option<&mut Generator>,
) -> Result<Batch> {
    let request = Request::validate(
        n,
        d,
        model,
        options.dtype,
        options.device,
        options.requires_grad,
    )?;
    let sparsity = resolve_sparsity(model, options.sparsity)?;

    tracing::debug!(n, d, %model, dtype = %request.dtype, sparsity, "generating random hypervectors");

    with_generator(generator, |rng| {
        let canonical = Canonical::sample(model, request.len(), d, sparsity, rng)?;
        request.finish(canonical)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Storage;
    use crate::error::HdError;
    use crate::similarity::Similarity;

    const SEED: u64 = 2147483644;

    fn seeded() -> Generator {
        Generator::with_seed(SEED)
    }

    #[test]
    fn test_shape() {
        for model in crate::model::MODELS {
            for (n, d) in [(1, 10), (3, 84), (55, 10)] {
                let hv = random(n, d, model, &RandomOptions::default(), None).unwrap();
                assert_eq!(hv.shape(), (n, d));
                assert_eq!(hv.model(), model);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        for model in crate::model::MODELS {
            let a = random(20, 1000, model, &RandomOptions::default(), Some(&mut seeded())).unwrap();
            let b = random(20, 1000, model, &RandomOptions::default(), Some(&mut seeded())).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_bsc_domain_and_sparsity() {
        for sparsity in [0.0, 0.1, 0.756, 1.0] {
            let opts = RandomOptions::default().sparsity(sparsity);
            let hv = random(100, 10000, Model::Bsc, &opts, Some(&mut seeded())).unwrap();
            let bits = hv.as_bool().unwrap();
            let zeros = bits.iter().filter(|&&b| !b).count() as f64 / bits.len() as f64;
            assert!(
                (zeros - sparsity).abs() < 0.005,
                "sparsity {} measured {}",
                sparsity,
                zeros
            );
        }
    }

    #[test]
    fn test_map_domain() {
        for dtype in [DType::Int8, DType::Int64, DType::Float32, DType::Float64] {
            let opts = RandomOptions::default().dtype(dtype);
            let hv = random(4, 1000, Model::Map, &opts, Some(&mut seeded())).unwrap();
            assert_eq!(hv.dtype(), dtype);
            for i in 0..hv.rows() {
                assert!(hv.row_f64(i).unwrap().iter().all(|&x| x == 1.0 || x == -1.0));
            }
        }
    }

    #[test]
    fn test_hrr_distribution() {
        let d = 10000;
        let opts = RandomOptions::default().dtype(DType::Float64);
        let hv = random(10, d, Model::Hrr, &opts, Some(&mut seeded())).unwrap();
        let data = hv.as_f64().unwrap();
        let mean = data.iter().sum::<f64>() / data.len() as f64;
        assert!(mean.abs() < 1e-3, "mean {}", mean);

        let row = hv.row_f64(0).unwrap();
        let norm = row.iter().map(|x| x * x).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 0.05, "norm {}", norm);
    }

    #[test]
    fn test_fhrr_unit_magnitude() {
        let hv = random(5, 1000, Model::Fhrr, &RandomOptions::default(), Some(&mut seeded())).unwrap();
        assert_eq!(hv.dtype(), DType::Complex64);
        assert!(hv
            .as_complex64()
            .unwrap()
            .iter()
            .all(|z| (z.norm() - 1.0).abs() < 1e-5));
    }

    #[test]
    fn test_quasi_orthogonal() {
        for model in crate::model::MODELS {
            let hv = random(2, 10000, model, &RandomOptions::default(), Some(&mut seeded())).unwrap();
            let sim = Similarity::cosine(&hv.row(0).unwrap(), &hv.row(1).unwrap()).unwrap();
            assert!(sim.abs() < 0.05, "{} similarity {}", model, sim);
        }
    }

    #[test]
    fn test_requires_grad() {
        let opts = RandomOptions::default().requires_grad(true);
        let hv = random(3, 52, Model::Map, &opts, None).unwrap();
        assert!(hv.requires_grad());
        let hv = random(3, 52, Model::Fhrr, &opts, None).unwrap();
        assert!(hv.requires_grad());

        let err = random(3, 52, Model::Bsc, &opts, None).unwrap_err();
        assert!(matches!(err, HdError::InvalidParameter(_)));

        let hv = random(3, 52, Model::Map, &RandomOptions::default(), None).unwrap();
        assert!(!hv.requires_grad());
    }

    #[test]
    fn test_rejections() {
        let opts = RandomOptions::default().dtype(DType::Complex64);
        assert!(matches!(
            random(3, 26, Model::Bsc, &opts, None),
            Err(HdError::InvalidDtypeForModel { .. })
        ));

        let opts = RandomOptions::default().sparsity(1.5);
        assert!(matches!(
            random(5, 100, Model::Bsc, &opts, None),
            Err(HdError::InvalidParameter(_))
        ));

        let opts = RandomOptions::default().sparsity(0.3);
        assert!(matches!(
            random(5, 100, Model::Map, &opts, None),
            Err(HdError::InvalidParameter(_))
        ));

        assert!(matches!(
            random(0, 10, Model::Map, &RandomOptions::default(), None),
            Err(HdError::InvalidParameter(_))
        ));
        assert!(matches!(
            random(3, 0, Model::Map, &RandomOptions::default(), None),
            Err(HdError::InvalidParameter(_))
        ));
        assert!(matches!(
            random(usize::MAX / 2 + 1, 2, Model::Map, &RandomOptions::default(), None),
            Err(HdError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_default_dtype_follows_config() {
        let hv = random(3, 52, Model::Bsc, &RandomOptions::default(), None).unwrap();
        assert_eq!(hv.dtype(), DType::Bool);

        crate::Config {
            default_float: DType::Float64,
            ..crate::Config::default()
        }
        .install()
        .unwrap();
        let hv = random(3, 52, Model::Map, &RandomOptions::default(), None).unwrap();
        assert_eq!(hv.dtype(), DType::Float64);
        assert!(matches!(hv.storage(), Storage::Float64(_)));
        crate::Config::default().install().unwrap();

        let hv = random(3, 52, Model::Fhrr, &RandomOptions::default(), None).unwrap();
        assert_eq!(hv.dtype(), DType::Complex64);
    }
}
