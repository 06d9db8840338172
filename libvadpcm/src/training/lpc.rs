//! LPC analysis for codebook training
//!
//! Vectors here are 1-based: index 0 holds the leading 1 of a polynomial (or
//! lag 0 of an autocorrelation) and `1..=order` the coefficients.

/// reflection coefficients are clamped to just inside the unit circle
pub const REFLECTION_LIMIT: f64 = 0.9999999999;

/// negated autocorrelation of the window at `buf[m..2m]`, lags 0..=order
///
/// `buf` holds one window of look-back before the current one.
pub fn autocorrelation_vector(buf: &[i32], order: usize, m: usize) -> Vec<f64> {
    let mut out = vec![0.0; order + 1];
    for (lag, value) in out.iter_mut().enumerate() {
        for j in 0..m {
            *value -= buf[m + j - lag] as f64 * buf[m + j] as f64;
        }
    }
    out
}

/// autocorrelation matrix of the window at `buf[m..2m]`, entries `[1..=order][1..=order]`
pub fn autocorrelation_matrix(buf: &[i32], order: usize, m: usize) -> Vec<Vec<f64>> {
    let mut out = vec![vec![0.0; order + 1]; order + 1];
    for i in 1..=order {
        for j in 1..=order {
            for k in 0..m {
                out[i][j] += buf[m + k - i] as f64 * buf[m + k - j] as f64;
            }
        }
    }
    out
}

/// LU decomposition with partial pivoting, in place
///
/// Returns the row permutation, or `None` when the matrix is singular or so
/// badly conditioned that its smallest pivot is under 1e-10 of the largest.
pub fn lu_decompose(a: &mut [Vec<f64>], n: usize) -> Option<Vec<usize>> {
    let mut indx = vec![0usize; n + 1];
    let mut vv = vec![0.0; n + 1];
    let mut imax = 0;

    for i in 1..=n {
        let big = (1..=n).map(|j| a[i][j].abs()).fold(0.0, f64::max);
        if big == 0.0 {
            return None;
        }
        vv[i] = 1.0 / big;
    }

    for j in 1..=n {
        for i in 1..j {
            let mut sum = a[i][j];
            for k in 1..i {
                sum -= a[i][k] * a[k][j];
            }
            a[i][j] = sum;
        }

        let mut big = 0.0;
        for i in j..=n {
            let mut sum = a[i][j];
            for k in 1..j {
                sum -= a[i][k] * a[k][j];
            }
            a[i][j] = sum;
            let dum = vv[i] * sum.abs();
            if dum >= big {
                big = dum;
                imax = i;
            }
        }

        if j != imax {
            a.swap(imax, j);
            vv[imax] = vv[j];
        }
        indx[j] = imax;

        if a[j][j] == 0.0 {
            return None;
        }
        if j != n {
            let dum = 1.0 / a[j][j];
            for row in a.iter_mut().take(n + 1).skip(j + 1) {
                row[j] *= dum;
            }
        }
    }

    let mut min = 1e10f64;
    let mut max = 0.0f64;
    for i in 1..=n {
        let pivot = a[i][i].abs();
        min = min.min(pivot);
        max = max.max(pivot);
    }
    if min / max < 1e-10 {
        return None;
    }

    Some(indx)
}

/// solve `a x = b` in place using the output of [`lu_decompose`]
pub fn lu_back_substitute(a: &[Vec<f64>], n: usize, indx: &[usize], b: &mut [f64]) {
    let mut ii = 0;
    for i in 1..=n {
        let ip = indx[i];
        let mut sum = b[ip];
        b[ip] = b[i];
        if ii != 0 {
            for j in ii..i {
                sum -= a[i][j] * b[j];
            }
        } else if sum != 0.0 {
            ii = i;
        }
        b[i] = sum;
    }

    for i in (1..=n).rev() {
        let mut sum = b[i];
        for j in i + 1..=n {
            sum -= a[i][j] * b[j];
        }
        b[i] = sum / a[i][i];
    }
}

/// step-down recursion from a polynomial to reflection coefficients
///
/// `a` is consumed as scratch. The count is the number of coefficients
/// outside the unit circle; `None` means the recursion hit a zero divisor.
pub fn reflection_from_lpc(a: &mut [f64], n: usize) -> Option<(Vec<f64>, usize)> {
    let mut k = vec![0.0; n + 1];
    let mut next = vec![0.0; n + 1];
    let mut unstable = 0;

    k[n] = a[n];
    for i in (1..n).rev() {
        let t = k[i + 1];
        let div = 1.0 - t * t;
        if div == 0.0 {
            return None;
        }
        for j in 0..=i {
            next[j] = (a[j] - a[i + 1 - j] * t) / div;
        }
        a[..=i].copy_from_slice(&next[..=i]);

        k[i] = next[i];
        if k[i].abs() > 1.0 {
            unstable += 1;
        }
    }

    Some((k, unstable))
}

/// step-up recursion from reflection coefficients to a polynomial
pub fn lpc_from_reflection(k: &[f64], n: usize) -> Vec<f64> {
    let mut a = vec![0.0; n + 1];
    a[0] = 1.0;
    for i in 1..=n {
        a[i] = k[i];
        for j in 1..i {
            a[j] += a[i - j] * a[i];
        }
    }
    a
}

/// normalized autocorrelation implied by a polynomial (lag 0 is 1)
pub fn autocorrelation_from_lpc(a: &[f64], n: usize) -> Vec<f64> {
    let mut mat: Vec<Vec<f64>> = vec![Vec::new(); n + 1];
    mat[n] = vec![0.0; n + 1];
    mat[n][0] = 1.0;
    for i in 1..=n {
        mat[n][i] = -a[i];
    }

    for i in (1..=n).rev() {
        let mut lower = vec![0.0; i];
        let div = 1.0 - mat[i][i] * mat[i][i];
        for j in 1..i {
            lower[j] = (mat[i][i - j] * mat[i][i] + mat[i][j]) / div;
        }
        mat[i - 1] = lower;
    }

    let mut r = vec![0.0; n + 1];
    r[0] = 1.0;
    for i in 1..=n {
        for j in 1..=i {
            r[i] += mat[i][j] * r[i - j];
        }
    }
    r
}

/// Levinson-Durbin on an autocorrelation vector
///
/// Returns reflection coefficients, the polynomial, and how many reflection
/// coefficients fell outside the unit circle.
pub fn levinson_durbin(r: &[f64], n: usize) -> (Vec<f64>, Vec<f64>, usize) {
    let mut k = vec![0.0; n + 1];
    let mut a = vec![0.0; n + 1];
    let mut error = r[0];
    let mut unstable = 0;
    a[0] = 1.0;

    for i in 1..=n {
        let mut sum = 0.0;
        for j in 1..i {
            sum += a[j] * r[i - j];
        }

        a[i] = if error > 0.0 { -(r[i] + sum) / error } else { 0.0 };
        k[i] = a[i];
        if k[i].abs() > 1.0 {
            unstable += 1;
        }

        for j in 1..i {
            a[j] += a[i - j] * a[i];
        }
        error *= 1.0 - a[i] * a[i];
    }

    (k, a, unstable)
}

/// pull every reflection coefficient strictly inside (-1, 1)
pub fn clamp_reflection(k: &mut [f64]) {
    for value in k.iter_mut().skip(1) {
        if *value >= 1.0 {
            *value = REFLECTION_LIMIT;
        }
        if *value <= -1.0 {
            *value = -REFLECTION_LIMIT;
        }
    }
}

/// stable polynomial from reflection coefficients, after clamping them
pub fn stabilize(mut k: Vec<f64>, n: usize) -> Vec<f64> {
    clamp_reflection(&mut k);
    lpc_from_reflection(&k, n)
}

/// prediction error energy of `model` on a signal whose polynomial is `data`
pub fn model_distance(model: &[f64], data: &[f64], n: usize) -> f64 {
    let r = autocorrelation_from_lpc(data, n);

    let mut c = vec![0.0; n + 1];
    for (i, value) in c.iter_mut().enumerate() {
        for j in 0..=n - i {
            *value += model[j] * model[i + j];
        }
    }

    let mut distance = c[0] * r[0];
    for i in 1..=n {
        distance += 2.0 * r[i] * c[i];
    }
    distance
}
