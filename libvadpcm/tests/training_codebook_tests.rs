//! Codebook trainer tests for libvadpcm

use libvadpcm::training::{training_vectors, vq};
use libvadpcm::{
    calculate_codebook, encode_adpcm, materialize_predictor, CompressionSettings, Error,
    PcmEncodedData, MAX_SCALE,
};

fn sine_mix(len: usize) -> Vec<i16> {
    (0..len)
        .map(|i| {
            let t = i as f64;
            (8000.0 * (t * 0.05).sin() + 3000.0 * (t * 0.31).sin()) as i16
        })
        .collect()
}

// ============================================================================
// Training Tests
// ============================================================================

#[test]
fn test_train_sine_mix() {
    let trained = calculate_codebook(&sine_mix(1024), &CompressionSettings::default()).unwrap();

    assert_eq!(trained.codebook.order(), 2);
    assert_eq!(trained.codebook.len(), 4);
    assert_eq!(trained.overflows, 0);
    assert_eq!(trained.training_vectors, 61);

    let first = trained.codebook.predictors()[0].base();
    assert_eq!(&first[..4], &[-1779, 3676, -3192, 4819]);
}

#[test]
fn test_predictor_count_follows_bits() {
    let samples = sine_mix(2048);
    for bits in 1..=4 {
        let settings = CompressionSettings::default().with_bits(bits);
        let trained = calculate_codebook(&samples, &settings).unwrap();
        assert_eq!(trained.codebook.len(), 1 << bits);
    }
}

#[test]
fn test_train_every_order() {
    let samples = sine_mix(2048);
    for order in 1..=8 {
        let settings = CompressionSettings::default().with_order(order);
        let trained = calculate_codebook(&samples, &settings).unwrap();
        assert_eq!(trained.codebook.order(), order);
        for predictor in trained.codebook.predictors() {
            assert!(predictor
                .base()
                .iter()
                .all(|&c| (i16::MIN as i32..=i16::MAX as i32).contains(&c)));
        }
    }
}

#[test]
fn test_training_is_deterministic() {
    let samples = sine_mix(1500);
    let settings = CompressionSettings::default().with_bits(3);
    assert_eq!(
        calculate_codebook(&samples, &settings).unwrap(),
        calculate_codebook(&samples, &settings).unwrap()
    );
}

#[test]
fn test_silence_trains_without_vectors() {
    let trained = calculate_codebook(&[0; 256], &CompressionSettings::default()).unwrap();

    assert_eq!(trained.training_vectors, 0);
    assert_eq!(trained.codebook.len(), 4);
    // the seed is the zero predictor; splits only move one coefficient
    assert!(trained.codebook.predictors()[0].base().iter().all(|&c| c == 0));
    assert_eq!(trained.codebook.predictors()[1].base()[1], 20);
}

#[test]
fn test_empty_input() {
    let trained = calculate_codebook(&[], &CompressionSettings::default()).unwrap();
    assert_eq!(trained.training_vectors, 0);
    assert_eq!(trained.codebook.len(), 4);
}

#[test]
fn test_threshold_skips_quiet_windows() {
    let quiet: Vec<i16> = sine_mix(512).iter().map(|&s| s / 4000).collect();
    let loud = CompressionSettings::default().with_threshold(1.0e12);
    assert_eq!(training_vectors(&quiet, &loud).len(), 0);

    let low = CompressionSettings::default().with_threshold(0.0);
    assert!(!training_vectors(&sine_mix(512), &low).is_empty());
}

#[test]
fn test_invalid_settings() {
    let settings = CompressionSettings::default().with_order(0);
    assert!(matches!(
        calculate_codebook(&sine_mix(64), &settings),
        Err(Error::InvalidSettings(_))
    ));
}

#[test]
fn test_trained_codebook_encodes_within_scale_bound() {
    let samples = sine_mix(4096);
    let trained = calculate_codebook(&samples, &CompressionSettings::default()).unwrap();
    let encoded = encode_adpcm(&PcmEncodedData::new(samples, 32000.0), &trained.codebook, None);

    assert!(encoded.frames.iter().all(|f| f.scale() <= MAX_SCALE));
    assert!(encoded.frames.iter().all(|f| f.predictor() < 4));
}

#[test]
fn test_steep_high_order_model_overflows() {
    let samples: Vec<i16> = (0..4096)
        .map(|i| (20000.0 * (i as f64 * 0.01).sin()) as i16)
        .collect();
    let settings = CompressionSettings::default().with_order(8);
    let trained = calculate_codebook(&samples, &settings).unwrap();

    assert_eq!(trained.training_vectors, 110);
    assert_eq!(trained.overflows, 6);
    for predictor in trained.codebook.predictors() {
        assert!(predictor
            .base()
            .iter()
            .all(|&c| (i16::MIN as i32..=i16::MAX as i32).contains(&c)));
    }

    // same input at a low order fits without clamping
    let low = calculate_codebook(&samples, &CompressionSettings::default()).unwrap();
    assert_eq!(low.overflows, 0);
}

// ============================================================================
// Vector Quantization Tests
// ============================================================================

#[test]
fn test_split_doubles_models() {
    let mut models = vec![vec![1.0, -1.5, 0.6], vec![1.0, 0.2, 0.1]];
    vq::split(&mut models, 2);

    assert_eq!(models.len(), 4);
    assert_eq!(models[2], vec![1.0, -1.51, 0.6]);
    assert_eq!(models[3], vec![1.0, 0.19, 0.1]);
}

#[test]
fn test_nearest_model_first_wins() {
    let data = vec![1.0, -1.2, 0.5];
    let models = vec![vec![1.0, 0.0, 0.0], data.clone(), data.clone()];
    assert_eq!(vq::nearest_model(&models, &data, 2), 1);
}

#[test]
fn test_refine_keeps_empty_clusters() {
    let data = vec![vec![1.0, -1.2, 0.5], vec![1.0, -1.1, 0.4]];
    let untouched = vec![1.0, 0.9, 0.3];
    let mut models = vec![vec![1.0, -1.2, 0.45], untouched.clone()];
    vq::refine(&mut models, &data, 2, 3);

    assert_eq!(models[1], untouched);
    assert!((models[0][1] + 1.15).abs() < 0.1);
}

#[test]
fn test_seed_model_of_nothing_is_zero() {
    assert_eq!(vq::seed_model(&[], 3), vec![1.0, 0.0, 0.0, 0.0]);
}

// ============================================================================
// Materialization Tests
// ============================================================================

#[test]
fn test_materialize_overflow_is_counted() {
    // (1 - z^-1)^4 needs coefficients far beyond 16.0
    let (base, overflows) = materialize_predictor(&[1.0, -4.0, 6.0, -4.0, 1.0], 4);

    assert_eq!(overflows, 24);
    assert_eq!(&base[..4], &[-2048, 8192, -12288, 8192]);
    assert!(base
        .iter()
        .all(|&c| (i16::MIN as i32..=i16::MAX as i32).contains(&c)));
}

#[test]
fn test_materialize_rows() {
    let (base, overflows) = materialize_predictor(&[1.0, -1.6, 0.8], 2);
    assert_eq!(overflows, 0);
    assert_eq!(
        base,
        vec![
            -1638, 3277, -2621, 3604, -2884, 3146, -2517, 2150, -1720, 923, -738, -243, 195,
            -1127, 902, -1609
        ]
    );
}
