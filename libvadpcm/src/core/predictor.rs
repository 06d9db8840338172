//! fixed-point predictor tables and codebooks

use super::error::{Error, VadpcmResult};
use super::types::{MAX_ORDER, MAX_PREDICTORS, PREDICTOR_ROWS, SAMPLES_PER_FRAME};

/// widest expanded row (order + 8 with the largest order)
pub const TABLE_WIDTH: usize = MAX_ORDER + PREDICTOR_ROWS;

/// weight of the current residual in an expanded row (2^11)
pub const UNITY: i32 = 1 << 11;

/// dot product of the first `length` terms, divided by 2^11 rounding down
///
/// Products and the running sum wrap at 32 bits. The divide is a floor, not
/// a truncation, so a sum of -1 gives -1.
pub fn inner_product(length: usize, row: &[i32], vector: &[i32; SAMPLES_PER_FRAME]) -> i32 {
    let mut out: i32 = 0;
    for (&a, &b) in row.iter().zip(vector.iter()).take(length) {
        out = out.wrapping_add(a.wrapping_mul(b));
    }

    // arithmetic shift is a floor divide by 2^11
    out >> 11
}

/// fill the expanded columns of an 8-row table whose first `order` columns are set
///
/// Column `order` of row k repeats column `order - 1` of row k-1 (row 0 gets
/// 2^11); column `k + order` is column `order` shifted down k rows.
pub fn expand_table(table: &mut [[i32; TABLE_WIDTH]; PREDICTOR_ROWS], order: usize) {
    for k in 1..PREDICTOR_ROWS {
        table[k][order] = table[k - 1][order - 1];
    }

    table[0][order] = UNITY;

    for k in 1..PREDICTOR_ROWS {
        for j in 0..k {
            table[j][k + order] = 0;
        }
        for j in k..PREDICTOR_ROWS {
            table[j][k + order] = table[j - k][order];
        }
    }
}

/// one expanded predictor: 8 rows of `order + 8` coefficients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predictor {
    order: usize,
    table: [[i32; TABLE_WIDTH]; PREDICTOR_ROWS],
}

impl Predictor {
    /// build from the base coefficients, row-major `[row][order]` (8 * order values)
    pub fn from_base(order: usize, base: &[i32]) -> VadpcmResult<Self> {
        check_order(order)?;
        let expected = PREDICTOR_ROWS * order;
        if base.len() != expected {
            return Err(Error::WrongValueCount {
                expected,
                actual: base.len(),
            });
        }

        let mut table = [[0i32; TABLE_WIDTH]; PREDICTOR_ROWS];
        for (row, chunk) in table.iter_mut().zip(base.chunks_exact(order)) {
            row[..order].copy_from_slice(chunk);
        }
        expand_table(&mut table, order);

        Ok(Predictor { order, table })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// expanded row `i`, `order + 8` entries wide
    pub fn row(&self, i: usize) -> &[i32] {
        &self.table[i][..self.order + PREDICTOR_ROWS]
    }

    /// base coefficients back out, row-major `[row][order]`
    pub fn base(&self) -> Vec<i32> {
        self.table
            .iter()
            .flat_map(|row| row[..self.order].iter().copied())
            .collect()
    }

    /// coefficient `column` of base row `row`
    pub fn coefficient(&self, row: usize, column: usize) -> i32 {
        self.table[row][column]
    }
}

/// the predictors a stream may reference, all sharing one order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codebook {
    order: usize,
    predictors: Vec<Predictor>,
}

impl Codebook {
    pub fn new(order: usize, predictors: Vec<Predictor>) -> VadpcmResult<Self> {
        check_order(order)?;
        if predictors.is_empty() || predictors.len() > MAX_PREDICTORS {
            return Err(Error::InvalidPredictorCount(predictors.len() as i64));
        }
        if let Some(p) = predictors.iter().find(|p| p.order != order) {
            return Err(Error::InvalidOrder(p.order as i64));
        }

        Ok(Codebook { order, predictors })
    }

    /// build from base coefficients, `[predictor][row][order]` flattened
    pub fn from_base(order: usize, npredictors: usize, base: &[i32]) -> VadpcmResult<Self> {
        check_order(order)?;
        if npredictors == 0 || npredictors > MAX_PREDICTORS {
            return Err(Error::InvalidPredictorCount(npredictors as i64));
        }
        let per_predictor = PREDICTOR_ROWS * order;
        if base.len() != per_predictor * npredictors {
            return Err(Error::WrongValueCount {
                expected: per_predictor * npredictors,
                actual: base.len(),
            });
        }

        let predictors = base
            .chunks_exact(per_predictor)
            .map(|chunk| Predictor::from_base(order, chunk))
            .collect::<VadpcmResult<Vec<_>>>()?;

        Codebook::new(order, predictors)
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn predictors(&self) -> &[Predictor] {
        &self.predictors
    }

    pub fn len(&self) -> usize {
        self.predictors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictors.is_empty()
    }
}

pub(crate) fn check_order(order: usize) -> VadpcmResult<()> {
    if order == 0 || order > MAX_ORDER {
        return Err(Error::InvalidOrder(order as i64));
    }
    Ok(())
}
