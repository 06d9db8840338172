//! The vadpcm frame codec
//!
//! Each frame carries 16 samples as 4-bit residuals against one of the
//! codebook's predictors. The encoder picks the predictor with the smallest
//! squared error and the smallest power-of-two scale that fits; the decoder
//! replays the same fixed-point prediction.

pub mod decoder;
pub mod encoder;
pub mod reconstruct;

pub use decoder::{decode_adpcm, decode_frame, Decoder};
pub use encoder::{encode_adpcm, encode_frame, Encoder, State};
pub use reconstruct::{
    decode_adpcm_exact, reconstruct_frame, FrameReconstruction, ReconstructOptions,
    ReconstructRng, Reconstruction, RECONSTRUCT_SEED,
};

#[cfg(test)]
mod tests;
