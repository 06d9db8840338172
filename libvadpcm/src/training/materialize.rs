//! float model to fixed-point predictor rows

use crate::core::{PREDICTOR_ROWS, UNITY};

/// fold an LPC polynomial into the 8 codec rows, scaled by 2^11
///
/// Row i holds the weights the codec applies to the `order` history samples
/// when predicting sample i of a sub-block with zero residuals in between.
/// Returns the base coefficients row-major `[row][order]` and how many had to
/// be clamped to 16 bits.
pub fn materialize_predictor(model: &[f64], order: usize) -> (Vec<i32>, usize) {
    let mut table = vec![vec![0.0f64; order]; PREDICTOR_ROWS];

    for i in 0..order {
        for j in i..order {
            table[i][j] = -model[order - j + i];
        }
    }

    for i in 1..PREDICTOR_ROWS {
        for j in 1..=order.min(i) {
            for k in 0..order {
                table[i][k] -= model[j] * table[i - j][k];
            }
        }
    }

    let mut overflows = 0;
    let mut base = vec![0i32; PREDICTOR_ROWS * order];
    for (i, row) in table.iter().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            let scaled = value * UNITY as f64;
            let rounded = if scaled < 0.0 {
                (scaled - 0.5) as i64
            } else {
                (scaled + 0.5) as i64
            };
            if rounded < i16::MIN as i64 || rounded > i16::MAX as i64 {
                overflows += 1;
            }
            base[i * order + j] = rounded.clamp(i16::MIN as i64, i16::MAX as i64) as i32;
        }
    }

    (base, overflows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_model_is_zero() {
        let (base, overflows) = materialize_predictor(&[1.0, 0.0, 0.0], 2);
        assert!(base.iter().all(|&v| v == 0));
        assert_eq!(overflows, 0);
    }

    #[test]
    fn test_first_row_is_negated_reversed_model() {
        let (base, overflows) = materialize_predictor(&[1.0, -1.6, 0.8], 2);
        assert_eq!(&base[..2], &[-1638, 3277]);
        assert_eq!(overflows, 0);
    }
}
