//! Predictor model tests for libvadpcm

use libvadpcm::core::predictor::{expand_table, TABLE_WIDTH, UNITY};
use libvadpcm::core::PREDICTOR_ROWS;
use libvadpcm::{inner_product, Codebook, Error, Predictor, SAMPLES_PER_FRAME};

fn vector(values: &[i32]) -> [i32; SAMPLES_PER_FRAME] {
    let mut v = [0i32; SAMPLES_PER_FRAME];
    v[..values.len()].copy_from_slice(values);
    v
}

// ============================================================================
// Inner Product Tests
// ============================================================================

#[test]
fn test_inner_product_rounds_down() {
    // dot = -1 must give -1, not 0
    assert_eq!(inner_product(1, &[1], &vector(&[-1])), -1);
    assert_eq!(inner_product(2, &[1, 1], &vector(&[-2047, 0])), -1);
    assert_eq!(inner_product(1, &[1], &vector(&[-4097])), -3);
}

#[test]
fn test_inner_product_positive() {
    assert_eq!(inner_product(1, &[1], &vector(&[2047])), 0);
    assert_eq!(inner_product(1, &[1], &vector(&[2048])), 1);
    assert_eq!(inner_product(2, &[2048, 1024], &vector(&[3, 4])), 5);
}

#[test]
fn test_inner_product_exact_multiple() {
    assert_eq!(inner_product(1, &[-2048], &vector(&[5])), -5);
}

#[test]
fn test_inner_product_wraps() {
    // i32::MAX * 2 overflows; the sum wraps instead of panicking
    let result = inner_product(2, &[i32::MAX, i32::MAX], &vector(&[1, 1]));
    assert_eq!(result, (i32::MAX.wrapping_add(i32::MAX)) >> 11);
}

// ============================================================================
// Expansion Tests
// ============================================================================

#[test]
fn test_expansion_shape_order_2() {
    let base: Vec<i32> = (1..=16).collect();
    let predictor = Predictor::from_base(2, &base).unwrap();

    for i in 0..PREDICTOR_ROWS {
        assert_eq!(predictor.row(i).len(), 10);
    }

    assert_eq!(predictor.row(0)[2], 2048);
    for k in 1..PREDICTOR_ROWS {
        assert_eq!(predictor.row(k)[2], predictor.row(k - 1)[1]);
    }
}

#[test]
fn test_expansion_shifted_columns() {
    let base: Vec<i32> = (1..=16).collect();
    let predictor = Predictor::from_base(2, &base).unwrap();

    for k in 1..PREDICTOR_ROWS {
        for j in 0..PREDICTOR_ROWS {
            let expected = if j < k {
                0
            } else {
                predictor.row(j - k)[2]
            };
            assert_eq!(predictor.row(j)[k + 2], expected, "row {} column {}", j, k + 2);
        }
    }
}

#[test]
fn test_expansion_keeps_base() {
    let base: Vec<i32> = (0..24).map(|i| i * 7 - 80).collect();
    let predictor = Predictor::from_base(3, &base).unwrap();
    assert_eq!(predictor.base(), base);
    assert_eq!(predictor.coefficient(2, 1), base[2 * 3 + 1]);
}

#[test]
fn test_expand_table_directly() {
    let mut table = [[0i32; TABLE_WIDTH]; PREDICTOR_ROWS];
    table[0][0] = -100;
    expand_table(&mut table, 1);

    assert_eq!(table[0][1], UNITY);
    assert_eq!(table[1][1], -100);
    // the unity weight walks down the diagonal
    for i in 0..PREDICTOR_ROWS {
        assert_eq!(table[i][1 + i], UNITY);
    }
}

#[test]
fn test_row_width_every_order() {
    for order in 1..=8 {
        let predictor = Predictor::from_base(order, &vec![0; 8 * order]).unwrap();
        assert_eq!(predictor.order(), order);
        assert_eq!(predictor.row(7).len(), order + 8);
    }
}

#[test]
fn test_predictor_rejects_bad_shape() {
    assert!(matches!(
        Predictor::from_base(2, &[0; 15]),
        Err(Error::WrongValueCount {
            expected: 16,
            actual: 15
        })
    ));
    assert!(matches!(
        Predictor::from_base(0, &[]),
        Err(Error::InvalidOrder(0))
    ));
    assert!(matches!(
        Predictor::from_base(9, &[0; 72]),
        Err(Error::InvalidOrder(9))
    ));
}

// ============================================================================
// Codebook Tests
// ============================================================================

#[test]
fn test_codebook_from_base() {
    let base: Vec<i32> = (0..64).collect();
    let codebook = Codebook::from_base(2, 4, &base).unwrap();

    assert_eq!(codebook.order(), 2);
    assert_eq!(codebook.len(), 4);
    assert_eq!(codebook.predictors()[1].base(), (16..32).collect::<Vec<_>>());
}

#[test]
fn test_codebook_rejects_mixed_orders() {
    let a = Predictor::from_base(2, &[0; 16]).unwrap();
    let b = Predictor::from_base(3, &[0; 24]).unwrap();
    assert!(matches!(
        Codebook::new(2, vec![a, b]),
        Err(Error::InvalidOrder(3))
    ));
}

#[test]
fn test_codebook_predictor_count_limits() {
    assert!(matches!(
        Codebook::new(2, vec![]),
        Err(Error::InvalidPredictorCount(0))
    ));

    let many = vec![Predictor::from_base(2, &[0; 16]).unwrap(); 17];
    assert!(matches!(
        Codebook::new(2, many),
        Err(Error::InvalidPredictorCount(17))
    ));

    let sixteen = vec![Predictor::from_base(2, &[0; 16]).unwrap(); 16];
    assert!(Codebook::new(2, sixteen).is_ok());
}
