//! binary split vector quantization over LPC models

use super::lpc::{autocorrelation_from_lpc, levinson_durbin, model_distance, stabilize};

/// step used when splitting each model in two
pub const SPLIT_SCALE: f64 = 0.01;

/// double the model count: every model gets a copy nudged along coefficient `order - 1`
pub fn split(models: &mut Vec<Vec<f64>>, order: usize) {
    let mut delta = vec![0.0; order + 1];
    delta[order - 1] = -1.0;

    let copies: Vec<Vec<f64>> = models
        .iter()
        .map(|model| {
            model
                .iter()
                .zip(&delta)
                .map(|(&m, &d)| m + d * SPLIT_SCALE)
                .collect()
        })
        .collect();
    models.extend(copies);
}

/// index of the model closest to `data`, first one wins ties
pub fn nearest_model(models: &[Vec<f64>], data: &[f64], order: usize) -> usize {
    let mut best = 0;
    let mut best_distance = 1e30;
    for (i, model) in models.iter().enumerate() {
        let distance = model_distance(model, data, order);
        if distance < best_distance {
            best_distance = distance;
            best = i;
        }
    }
    best
}

/// hard-assignment refinement; models with no members are left as they are
pub fn refine(models: &mut [Vec<f64>], data: &[Vec<f64>], order: usize, iterations: usize) {
    for _ in 0..iterations {
        let mut sums = vec![vec![0.0; order + 1]; models.len()];
        let mut counts = vec![0usize; models.len()];

        for vector in data {
            let best = nearest_model(models, vector, order);
            counts[best] += 1;
            let r = autocorrelation_from_lpc(vector, order);
            for (sum, value) in sums[best].iter_mut().zip(&r) {
                *sum += value;
            }
        }

        for ((model, sum), &count) in models.iter_mut().zip(&sums).zip(&counts) {
            if count == 0 {
                continue;
            }
            let mean: Vec<f64> = sum.iter().map(|s| s / count as f64).collect();
            let (k, _, _) = levinson_durbin(&mean, order);
            *model = stabilize(k, order);
        }
    }
}

/// seed model: Durbin over the mean implied autocorrelation of every vector
///
/// With no vectors this is the all-zero predictor.
pub fn seed_model(data: &[Vec<f64>], order: usize) -> Vec<f64> {
    let mut mean = vec![0.0; order + 1];
    mean[0] = 1.0;

    for vector in data {
        let r = autocorrelation_from_lpc(vector, order);
        for j in 1..=order {
            mean[j] += r[j];
        }
    }
    if !data.is_empty() {
        for value in mean.iter_mut().skip(1) {
            *value /= data.len() as f64;
        }
    }

    let (k, _, _) = levinson_durbin(&mean, order);
    stabilize(k, order)
}
