//! End-to-end properties of the random, level and circular constructors.

use hypervec::{
    circular, level, manual_seed, random, CircularOptions, Config, DType, Device, Generator,
    HdError, LevelOptions, Metric, Model, Primitives, RandomOptions, Similarity, DTYPES, MODELS,
};

const SEED: u64 = 2147483644;

fn seeded() -> Generator {
    Generator::with_seed(SEED)
}

fn profile(hv: &hypervec::Batch) -> Vec<f64> {
    let first = hv.row(0).unwrap();
    Similarity::against(&first, hv, Metric::Cosine).unwrap()
}

#[test]
fn every_supported_dtype_generates_or_rejects() {
    for model in MODELS {
        for dtype in DTYPES {
            let result = random(3, 26, model, &RandomOptions::default().dtype(dtype), None);
            if model.supports(dtype) {
                let hv = result.unwrap();
                assert_eq!(hv.dtype(), dtype);
                assert_eq!(hv.shape(), (3, 26));
            } else {
                assert!(matches!(result, Err(HdError::InvalidDtypeForModel { .. })));
            }
        }
    }
}

#[test]
fn circular_rejects_hrr_for_every_dtype() {
    for dtype in DTYPES {
        let result = circular(3, 26, Model::Hrr, &CircularOptions::default().dtype(dtype), None);
        assert!(matches!(
            result,
            Err(HdError::UnsupportedModelForGenerator { .. })
        ));
    }
}

#[test]
fn literal_rejection_scenarios() {
    assert!(matches!(
        level(3, 26, Model::Hrr, &LevelOptions::default(), None),
        Err(HdError::UnsupportedModelForGenerator { .. })
    ));
    assert!(matches!(
        random(3, 26, Model::Bsc, &RandomOptions::default().dtype(DType::Complex64), None),
        Err(HdError::InvalidDtypeForModel { .. })
    ));
    assert!(matches!(
        random(5, 100, Model::Bsc, &RandomOptions::default().sparsity(1.5), None),
        Err(HdError::InvalidParameter(_))
    ));
    assert!(matches!(
        random(0, 10, Model::Map, &RandomOptions::default(), None),
        Err(HdError::InvalidParameter(_))
    ));
    assert!(matches!(
        random(usize::MAX / 2 + 1, 2, Model::Map, &RandomOptions::default(), None),
        Err(HdError::InvalidParameter(_))
    ));
    assert!(matches!(
        circular(usize::MAX, usize::MAX, Model::Bsc, &CircularOptions::default(), None),
        Err(HdError::InvalidParameter(_))
    ));
}

#[test]
fn bsc_families_keep_requested_sparsity() {
    let false_fraction = |hv: &hypervec::Batch| {
        let bits = hv.as_bool().unwrap();
        bits.iter().filter(|&&b| !b).count() as f64 / bits.len() as f64
    };
    for sparsity in [0.1, 0.756] {
        let hv = circular(
            20,
            100000,
            Model::Bsc,
            &CircularOptions::default().sparsity(sparsity).randomness(0.1),
            Some(&mut seeded()),
        )
        .unwrap();
        assert!((false_fraction(&hv) - sparsity).abs() < 0.005);

        let hv = level(
            20,
            100000,
            Model::Bsc,
            &LevelOptions::default().sparsity(sparsity).randomness(0.1),
            Some(&mut seeded()),
        )
        .unwrap();
        assert!((false_fraction(&hv) - sparsity).abs() < 0.005);
    }
}

#[test]
fn seeded_generators_replay_bit_identically() {
    for model in [Model::Bsc, Model::Map, Model::Fhrr] {
        let a = circular(20, 10000, model, &CircularOptions::default(), Some(&mut seeded())).unwrap();
        let b = circular(20, 10000, model, &CircularOptions::default(), Some(&mut seeded())).unwrap();
        assert_eq!(a, b);

        let a = level(20, 10000, model, &LevelOptions::default(), Some(&mut seeded())).unwrap();
        let b = level(20, 10000, model, &LevelOptions::default(), Some(&mut seeded())).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn default_generator_replays_after_manual_seed() {
    manual_seed(SEED);
    let a = random(4, 500, Model::Hrr, &RandomOptions::default(), None).unwrap();
    manual_seed(SEED);
    let b = random(4, 500, Model::Hrr, &RandomOptions::default(), None).unwrap();
    assert_eq!(a, b);
}

#[test]
fn circular_similarity_is_triangular() {
    for model in [Model::Bsc, Model::Map, Model::Fhrr] {
        for dtype in model.allowed_dtypes() {
            let opts = CircularOptions::default().dtype(*dtype);
            let hv = circular(8, 40000, model, &opts, Some(&mut seeded())).unwrap();
            let sims = profile(&hv);
            let diffs: Vec<f64> = sims.windows(2).map(|w| w[0] - w[1]).collect();

            let signs: Vec<f64> = diffs.iter().map(|x| x.signum()).collect();
            assert_eq!(
                signs,
                vec![1.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0],
                "second half must get more similar ({} {})",
                model,
                dtype
            );
            for diff in diffs {
                assert!(
                    (diff.abs() - 0.25).abs() < 0.005,
                    "similarity decreases linearly ({} {}: {})",
                    model,
                    dtype,
                    diff
                );
            }
        }
    }
}

#[test]
fn level_similarity_is_monotone_and_linear() {
    for model in [Model::Bsc, Model::Map, Model::Fhrr] {
        let hv = level(9, 16000, model, &LevelOptions::default(), Some(&mut seeded())).unwrap();
        let sims = profile(&hv);
        for pair in sims.windows(2) {
            let drop = pair[0] - pair[1];
            assert!(drop >= 0.0);
            assert!((drop - 0.125).abs() < 1e-3, "{} drop {}", model, drop);
        }
    }
}

#[test]
fn level_encodes_a_value_range() {
    let opts = LevelOptions::default().range(0.0, 255.0);
    let hv = level(256, 2048, Model::Map, &opts, Some(&mut seeded())).unwrap();

    let dark = hv.row(opts.index_of(10.0, 256)).unwrap();
    let dim = hv.row(opts.index_of(20.0, 256)).unwrap();
    let bright = hv.row(opts.index_of(250.0, 256)).unwrap();
    assert!(Similarity::cosine(&dark, &dim).unwrap() > Similarity::cosine(&dark, &bright).unwrap());
}

#[test]
fn gradient_flag_follows_request() {
    let opts = RandomOptions::default().requires_grad(true);
    assert!(random(3, 52, Model::Map, &opts, None).unwrap().requires_grad());
    assert!(random(3, 52, Model::Hrr, &opts, None).unwrap().requires_grad());
    assert!(matches!(
        random(3, 52, Model::Bsc, &opts, None),
        Err(HdError::InvalidParameter(_))
    ));
    assert!(matches!(
        random(3, 52, Model::Map, &opts.clone().dtype(DType::Int32), None),
        Err(HdError::InvalidParameter(_))
    ));
}

#[test]
fn device_placement() {
    let hv = random(3, 52, Model::Map, &RandomOptions::default().device(Device::Cpu), None).unwrap();
    assert_eq!(hv.device(), Device::Cpu);
    assert!(matches!(
        level(3, 52, Model::Map, &LevelOptions::default().device(Device::Cuda(0)), None),
        Err(HdError::UnavailableDevice(Device::Cuda(0)))
    ));
}

#[test]
fn default_float_comes_from_config() {
    Config::from_json(r#"{"default_float": "Float64"}"#)
        .unwrap()
        .install()
        .unwrap();
    let hv = circular(3, 52, Model::Map, &CircularOptions::default(), None).unwrap();
    assert_eq!(hv.dtype(), DType::Float64);

    Config::default().install().unwrap();
    let hv = circular(3, 52, Model::Map, &CircularOptions::default(), None).unwrap();
    assert_eq!(hv.dtype(), DType::Float32);
}

#[test]
fn position_value_encoding_pipeline() {
    // Bind positions to intensity levels, bundle, and quantize.
    let mut g = seeded();
    let positions = random(16, 4096, Model::Map, &RandomOptions::default(), Some(&mut g)).unwrap();
    let levels = level(8, 4096, Model::Map, &LevelOptions::default(), Some(&mut g)).unwrap();

    let encode = |pixels: &[usize]| {
        let mut rows = Vec::new();
        for (p, &v) in pixels.iter().enumerate() {
            let bound = Primitives::bind(&positions.row(p).unwrap(), &levels.row(v).unwrap()).unwrap();
            rows.extend(bound.row_f64(0).unwrap());
        }
        let batch = hypervec::Batch::new(
            Model::Map,
            pixels.len(),
            4096,
            hypervec::Storage::Float64(rows),
        )
        .unwrap();
        Primitives::quantize(&Primitives::multibundle(&batch, None))
    };

    let a = encode(&[0, 1, 2, 3, 4, 5, 6, 7, 7, 6, 5, 4, 3, 2, 1, 0]);
    let b = encode(&[0, 1, 2, 3, 4, 5, 6, 7, 7, 6, 5, 4, 3, 2, 1, 1]);
    let c = encode(&[7, 6, 5, 4, 3, 2, 1, 0, 0, 1, 2, 3, 4, 5, 6, 7]);

    let near = Similarity::cosine(&a, &b).unwrap();
    let far = Similarity::cosine(&a, &c).unwrap();
    assert!(near > far, "near {} far {}", near, far);
}
