//! VADPCM codec and codebook trainer
//!
//! Compresses 16-bit mono pcm into 9-byte frames of 16 samples, each a
//! 4-bit residual against one of up to 16 fixed-point linear predictors.
//!
//! ```no_run
//! use libvadpcm::{calculate_codebook, decode_adpcm_exact, encode_adpcm};
//! use libvadpcm::{CompressionSettings, PcmEncodedData, ReconstructOptions};
//!
//! let samples: Vec<i16> = (0..1024).map(|i| ((i as f32 * 0.05).sin() * 8000.0) as i16).collect();
//! let trained = calculate_codebook(&samples, &CompressionSettings::default()).unwrap();
//!
//! let pcm = PcmEncodedData::new(samples, 22050.0);
//! let encoded = encode_adpcm(&pcm, &trained.codebook, None);
//!
//! // pcm that encodes back to exactly the same frames
//! let exact = decode_adpcm_exact(&encoded, &ReconstructOptions::default()).unwrap();
//! assert!(exact.is_exact());
//! ```

#![allow(clippy::needless_range_loop)]

pub mod codec;
pub mod core;
pub mod training;

mod reader;
mod writer;

pub use codec::{
    decode_adpcm, decode_adpcm_exact, decode_frame, encode_adpcm, encode_frame, reconstruct_frame,
    Decoder, Encoder, FrameReconstruction, ReconstructOptions, ReconstructRng, Reconstruction,
    State,
};
pub use core::{
    clamp_16, inner_product, number_samples, AdpcmBook, AdpcmEncodedData, Codebook,
    CompressionSettings, Error, Frame, Loop, PcmEncodedData, Predictor, VadpcmResult,
    BYTES_PER_FRAME, LOOP_FOREVER, MAX_ORDER, MAX_PREDICTORS, MAX_SCALE, SAMPLES_PER_FRAME,
};
pub use reader::Reader;
pub use training::{calculate_codebook, materialize_predictor, TrainedCodebook};
pub use writer::Writer;

/// library version
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
