//! common types for the vadpcm codec

use serde::{Deserialize, Serialize};

use super::error::{Error, VadpcmResult};
use super::predictor::Codebook;

// constants

/// samples in one codec frame
pub const SAMPLES_PER_FRAME: usize = 16;

/// encoded size of one frame (header + 8 data bytes)
pub const BYTES_PER_FRAME: usize = 9;

/// rows in a predictor table, one per position in an 8-sample sub-block
pub const PREDICTOR_ROWS: usize = 8;

/// largest scale exponent a frame header may carry
pub const MAX_SCALE: u8 = 12;

/// largest supported predictor order (history + 8 residuals must fit in 16 slots)
pub const MAX_ORDER: usize = 8;

/// largest predictor count (index is stored in 4 bits)
pub const MAX_PREDICTORS: usize = 16;

/// loop count meaning "repeat forever"
pub const LOOP_FOREVER: u32 = u32::MAX;

/// signed 4-bit window used for residual nibbles
pub(crate) const NIBBLE_MIN: i32 = -8;
pub(crate) const NIBBLE_MAX: i32 = 7;

const SIGNED_NIBBLES: [i32; 16] = [0, 1, 2, 3, 4, 5, 6, 7, -8, -7, -6, -5, -4, -3, -2, -1];

/// clamp to the signed 16-bit range
pub fn clamp_16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// number of samples held by an encoded stream of `byte_len` bytes
pub fn number_samples(byte_len: usize) -> usize {
    (byte_len / BYTES_PER_FRAME) * SAMPLES_PER_FRAME
}

// frame

/// one encoded 16-sample frame
///
/// | Byte | Bits | Meaning                                   |
/// |------|------|-------------------------------------------|
/// | 0    | 7-4  | scale exponent (step = 2^scale, 0-12)     |
/// | 0    | 3-0  | predictor index into the codebook         |
/// | 1-8  | 7-4  | residual nibble for the even sample       |
/// | 1-8  | 3-0  | residual nibble for the odd sample        |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Frame {
    pub header: u8,
    pub data: [u8; 8],
}

impl Frame {
    /// pack a header and 16 nibbles (each already in -8..=7)
    pub fn pack(scale: u8, predictor: u8, nibbles: &[i32; SAMPLES_PER_FRAME]) -> Self {
        let mut data = [0u8; 8];
        for (byte, pair) in data.iter_mut().zip(nibbles.chunks_exact(2)) {
            *byte = ((pair[0] << 4) | (pair[1] & 0xF)) as u8;
        }

        Frame {
            header: (scale << 4) | (predictor & 0xF),
            data,
        }
    }

    pub fn from_bytes(bytes: &[u8; BYTES_PER_FRAME]) -> Self {
        let mut data = [0u8; 8];
        data.copy_from_slice(&bytes[1..]);
        Frame {
            header: bytes[0],
            data,
        }
    }

    pub fn to_bytes(&self) -> [u8; BYTES_PER_FRAME] {
        let mut out = [0u8; BYTES_PER_FRAME];
        out[0] = self.header;
        out[1..].copy_from_slice(&self.data);
        out
    }

    /// scale exponent from the high nibble of the header
    pub fn scale(&self) -> u8 {
        self.header >> 4
    }

    /// predictor index from the low nibble of the header
    pub fn predictor(&self) -> usize {
        (self.header & 0xF) as usize
    }

    /// the 16 residual nibbles as signed values, high nibble first
    pub fn nibbles(&self) -> [i32; SAMPLES_PER_FRAME] {
        let mut out = [0i32; SAMPLES_PER_FRAME];
        for (i, &byte) in self.data.iter().enumerate() {
            out[i * 2] = SIGNED_NIBBLES[(byte >> 4) as usize];
            out[i * 2 + 1] = SIGNED_NIBBLES[(byte & 0xF) as usize];
        }
        out
    }
}

// loop

/// loop region of a sound, with the rolling state needed to resume prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loop {
    pub start: u32,
    pub end: u32,
    pub count: u32,
    pub state: [i16; SAMPLES_PER_FRAME],
}

impl Loop {
    /// loop without a captured state yet (the encoder fills it in)
    pub fn new(start: u32, end: u32, count: u32) -> Self {
        Loop {
            start,
            end,
            count,
            state: [0; SAMPLES_PER_FRAME],
        }
    }

    /// saved state widened to the codec's 32-bit rolling state
    pub fn rolling_state(&self) -> [i32; SAMPLES_PER_FRAME] {
        self.state.map(i32::from)
    }
}

// settings

/// codebook training settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionSettings {
    /// number of LPC coefficients per predictor
    pub order: usize,
    /// analysis window length in samples
    pub frame_size: usize,
    /// windows with less energy than this are skipped
    pub threshold: f64,
    /// log2 of the number of predictors to produce
    pub bits: u32,
    /// refinement rounds after each split
    pub refine_iters: usize,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        CompressionSettings {
            order: 2,
            frame_size: 16,
            threshold: 10.0,
            bits: 2,
            refine_iters: 2,
        }
    }
}

impl CompressionSettings {
    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    pub fn with_frame_size(mut self, frame_size: usize) -> Self {
        self.frame_size = frame_size;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_bits(mut self, bits: u32) -> Self {
        self.bits = bits;
        self
    }

    pub fn with_refine_iters(mut self, refine_iters: usize) -> Self {
        self.refine_iters = refine_iters;
        self
    }

    /// number of predictors the trainer will produce
    pub fn predictor_count(&self) -> usize {
        1 << self.bits
    }

    pub fn validate(&self) -> VadpcmResult<()> {
        if self.order == 0 || self.order > MAX_ORDER {
            return Err(Error::InvalidSettings(format!(
                "order must be 1..={}, got {}",
                MAX_ORDER, self.order
            )));
        }
        if self.bits == 0 || self.bits > 4 {
            return Err(Error::InvalidSettings(format!(
                "bits must be 1..=4, got {}",
                self.bits
            )));
        }
        if self.frame_size < self.order {
            return Err(Error::InvalidSettings(format!(
                "frame size {} is shorter than the order {}",
                self.frame_size, self.order
            )));
        }
        if !self.threshold.is_finite() {
            return Err(Error::InvalidSettings("threshold must be finite".to_string()));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> VadpcmResult<Self> {
        let settings: CompressionSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> VadpcmResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// data structures

/// raw 16-bit mono pcm with its playback metadata
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PcmEncodedData {
    pub samples: Vec<i16>,
    pub sample_rate: f64,
    pub loop_point: Option<Loop>,
}

impl PcmEncodedData {
    pub fn new(samples: Vec<i16>, sample_rate: f64) -> Self {
        PcmEncodedData {
            samples,
            sample_rate,
            loop_point: None,
        }
    }

    pub fn with_loop(mut self, loop_point: Loop) -> Self {
        self.loop_point = Some(loop_point);
        self
    }
}

/// a compressed stream together with everything needed to decode it
#[derive(Debug, Clone, PartialEq)]
pub struct AdpcmEncodedData {
    pub sample_count: usize,
    pub sample_rate: f64,
    pub codebook: Codebook,
    pub loop_point: Option<Loop>,
    pub frames: Vec<Frame>,
}

impl AdpcmEncodedData {
    /// reject streams the codec would index out of bounds on
    pub fn validate(&self) -> VadpcmResult<()> {
        let count = self.codebook.predictors().len();
        for frame in &self.frames {
            if frame.predictor() >= count {
                return Err(Error::PredictorOutOfRange {
                    index: frame.predictor(),
                    count,
                });
            }
        }
        Ok(())
    }
}
