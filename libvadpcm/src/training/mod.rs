//! Codebook training
//!
//! Windows of the input are analysed into stable LPC models, a single seed
//! model is fitted to all of them, and binary splitting with refinement grows
//! that seed into `2^bits` predictors. The float models are then folded into
//! fixed-point predictor tables.

pub mod lpc;
pub mod materialize;
pub mod vq;

use log::{debug, warn};

use crate::core::{Codebook, CompressionSettings, Predictor, VadpcmResult};

pub use materialize::materialize_predictor;

use lpc::{
    autocorrelation_matrix, autocorrelation_vector, lu_back_substitute, lu_decompose,
    reflection_from_lpc, stabilize,
};

/// a trained codebook plus the diagnostics the trainer gathered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainedCodebook {
    pub codebook: Codebook,
    /// coefficients clamped to 16 bits while materializing
    pub overflows: usize,
    /// analysis windows that produced a training vector
    pub training_vectors: usize,
}

/// train a codebook of `2^bits` predictors on mono 16-bit pcm
pub fn calculate_codebook(
    pcm: &[i16],
    settings: &CompressionSettings,
) -> VadpcmResult<TrainedCodebook> {
    settings.validate()?;
    let order = settings.order;

    let data = training_vectors(pcm, settings);
    debug!(
        "{} of {} windows kept for training",
        data.len(),
        pcm.len().div_ceil(settings.frame_size)
    );
    if data.is_empty() {
        warn!("no analysis window above the energy threshold, codebook will be silent");
    }

    let mut models = vec![vq::seed_model(&data, order)];
    while models.len() < settings.predictor_count() {
        vq::split(&mut models, order);
        vq::refine(&mut models, &data, order, settings.refine_iters);
        debug!("split to {} models", models.len());
    }

    let mut overflows = 0;
    let mut predictors = Vec::with_capacity(models.len());
    for model in &models {
        let (base, clamped) = materialize_predictor(model, order);
        overflows += clamped;
        predictors.push(Predictor::from_base(order, &base)?);
    }

    if overflows > 0 {
        warn!(
            "{} predictor coefficients overflowed 16 bits and were clamped",
            overflows
        );
    }

    Ok(TrainedCodebook {
        codebook: Codebook::new(order, predictors)?,
        overflows,
        training_vectors: data.len(),
    })
}

/// one stable LPC polynomial per analysis window with enough energy
///
/// Each window is analysed with the previous window as look-back; the final
/// partial window is zero padded.
pub fn training_vectors(pcm: &[i16], settings: &CompressionSettings) -> Vec<Vec<f64>> {
    let order = settings.order;
    let m = settings.frame_size;
    let mut buf = vec![0i32; 2 * m];
    let mut data = Vec::new();

    for window in pcm.chunks(m) {
        buf[m..].fill(0);
        for (dst, &sample) in buf[m..].iter_mut().zip(window) {
            *dst = sample as i32;
        }

        if let Some(vector) = analyse_window(&buf, order, m, settings.threshold) {
            data.push(vector);
        }

        buf.copy_within(m.., 0);
    }

    data
}

fn analyse_window(buf: &[i32], order: usize, m: usize, threshold: f64) -> Option<Vec<f64>> {
    let mut vec = autocorrelation_vector(buf, order, m);
    if vec[0].abs() <= threshold {
        return None;
    }

    let mut mat = autocorrelation_matrix(buf, order, m);
    let indx = lu_decompose(&mut mat, order)?;
    lu_back_substitute(&mat, order, &indx, &mut vec);
    vec[0] = 1.0;

    let (k, unstable) = reflection_from_lpc(&mut vec, order)?;
    if unstable > 0 {
        return None;
    }

    Some(stabilize(k, order))
}
