//! Internal codec tests

use super::encoder::{quantize, round_residual};
use super::*;

#[test]
fn test_quantize_bias_stays_under_half() {
    assert_eq!(quantize(1.5, 1), 1);
    assert_eq!(quantize(-1.5, 1), -1);
    assert_eq!(quantize(24.0, 16), 1);
    assert_eq!(quantize(25.0, 16), 2);
    assert_eq!(quantize(-25.0, 16), -2);
}

#[test]
fn test_quantize_saturates_to_16_bits() {
    assert_eq!(quantize(1.0e9, 1), i16::MAX as i32);
    assert_eq!(quantize(-1.0e9, 1), i16::MIN as i32);
}

#[test]
fn test_round_residual_half_away_from_zero() {
    assert_eq!(round_residual(2.5), 3);
    assert_eq!(round_residual(-2.5), -3);
    assert_eq!(round_residual(2.4), 2);
    assert_eq!(round_residual(0.0), 0);
}

#[test]
fn test_round_residual_clamps() {
    assert_eq!(round_residual(40000.0), 32767);
    assert_eq!(round_residual(-40000.0), -32768);
}

#[test]
fn test_rng_sequence() {
    let mut rng = ReconstructRng::new();
    assert_eq!(rng.next_draw(), 897297884);
    assert_eq!(rng.next_draw(), 624359590);
    assert_eq!(rng.next_draw(), 56819335);
}

#[test]
fn test_rng_draws_fit_31_bits() {
    let mut rng = ReconstructRng::with_seed(u64::MAX);
    for _ in 0..1000 {
        assert!(rng.next_draw() < (1 << 31));
    }
}
