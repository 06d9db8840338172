//! error type for vadpcm stuff

use thiserror::Error;

/// everything that can go wrong at the library boundary
///
/// The frame codec itself never fails; these cover parsing external
/// representations and validating shapes before they reach it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("codebook is missing the order/predictor count header")]
    MissingHeader,

    #[error("invalid number in codebook: {0:?}")]
    InvalidNumber(String),

    #[error("wrong number of values for codebook: expected {expected}, got {actual}")]
    WrongValueCount { expected: usize, actual: usize },

    #[error("unsupported predictor order {0} (must be 1..=8)")]
    InvalidOrder(i64),

    #[error("unsupported predictor count {0} (must be 1..=16)")]
    InvalidPredictorCount(i64),

    #[error("frame uses predictor {index} but the codebook only has {count}")]
    PredictorOutOfRange { index: usize, count: usize },

    #[error("invalid compression settings: {0}")]
    InvalidSettings(String),

    #[error("book record truncated: expected {expected} coefficients, found {actual}")]
    TruncatedBook { expected: usize, actual: usize },

    #[error("frame {frame} could not be reconstructed within the search limit")]
    Unreconstructible { frame: usize },

    #[error("settings json: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// result type for vadpcm stuff
pub type VadpcmResult<T> = Result<T, Error>;
