//! revadpcm - VADPCM converter library
//!
//! Converts common audio formats to raw VADPCM frame streams plus `.table`
//! codebooks and back. It works on native targets and can be compiled to
//! WebAssembly.

pub mod audio;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod wasm;

use anyhow::{bail, Context, Result};
use log::debug;

/// Re-export libvadpcm types
pub use libvadpcm::{Codebook, CompressionSettings, Loop, ReconstructOptions};

use libvadpcm::{
    calculate_codebook, decode_adpcm, decode_adpcm_exact, encode_adpcm, PcmEncodedData, Reader,
    Writer, MAX_SCALE,
};

/// Information about a frame stream and its codebook
#[derive(Debug, Clone, serde::Serialize)]
pub struct VadpcmInfo {
    pub frames: usize,
    pub sample_count: usize,
    pub order: usize,
    pub predictors: usize,
    pub file_size: usize,
    pub compression_ratio: f64,
    /// frames per scale, index 0..=12
    pub scale_histogram: Vec<usize>,
    /// frames per predictor index
    pub predictor_histogram: Vec<usize>,
}

/// Get information about a frame stream decoded with `table`
pub fn get_vadpcm_info(frame_bytes: &[u8], table: &str) -> Result<VadpcmInfo> {
    let codebook = parse_table(table)?;
    let data = Reader::new()
        .read(frame_bytes, codebook, 0.0)
        .context("Frame stream does not match codebook")?;

    let mut scale_histogram = vec![0; MAX_SCALE as usize + 1];
    let mut predictor_histogram = vec![0; data.codebook.len()];
    for frame in &data.frames {
        // scales above 12 never come out of the encoder but are legal on the wire
        if let Some(count) = scale_histogram.get_mut(frame.scale() as usize) {
            *count += 1;
        }
        predictor_histogram[frame.predictor()] += 1;
    }

    let compression_ratio = if !frame_bytes.is_empty() {
        (data.sample_count * 2) as f64 / frame_bytes.len() as f64
    } else {
        0.0
    };

    Ok(VadpcmInfo {
        frames: data.frames.len(),
        sample_count: data.sample_count,
        order: data.codebook.order(),
        predictors: data.codebook.len(),
        file_size: frame_bytes.len(),
        compression_ratio,
        scale_histogram,
        predictor_histogram,
    })
}

/// Parse `.table` text into a codebook
pub fn parse_table(table: &str) -> Result<Codebook> {
    Codebook::parse(table).context("Invalid codebook table")
}

/// Encoding options for converting audio to VADPCM
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Trainer settings, used when no codebook is supplied
    pub settings: CompressionSettings,
    /// Existing codebook to encode with instead of training one
    pub codebook: Option<Codebook>,
    /// Loop region whose start state should be captured
    pub loop_point: Option<Loop>,
}

impl EncodeOptions {
    /// Train a codebook with these settings
    pub fn with_settings(mut self, settings: CompressionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Encode with an existing codebook
    pub fn with_codebook(mut self, codebook: Codebook) -> Self {
        self.codebook = Some(codebook);
        self
    }

    /// Capture the rolling state at a loop start
    pub fn with_loop(mut self, loop_point: Loop) -> Self {
        self.loop_point = Some(loop_point);
        self
    }
}

/// Result of an encode: the frame stream and the codebook it needs
#[derive(Debug, Clone)]
pub struct EncodedAudio {
    /// raw 9-byte frames
    pub frames: Vec<u8>,
    /// `.table` text of the codebook
    pub table: String,
    pub codebook: Codebook,
    pub sample_rate: u32,
    pub sample_count: usize,
    /// loop with its captured state, when one was requested
    pub loop_point: Option<Loop>,
    /// coefficients clamped while training (`None` for a supplied codebook)
    pub overflows: Option<usize>,
}

/// Information about a decoded audio file
#[derive(Debug, Clone)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub channels: usize,
    pub duration_secs: f32,
}

/// Encode audio file bytes to VADPCM
///
/// # Arguments
/// * `audio_bytes` - Raw bytes of an audio file (WAV, AIFF, FLAC, MP3, etc.)
/// * `options` - Encoding options
pub fn encode_from_audio(audio_bytes: &[u8], options: EncodeOptions) -> Result<EncodedAudio> {
    let (samples, sample_rate, _) =
        audio::read_audio_from_bytes(audio_bytes).context("Failed to read audio file")?;

    encode_from_samples(&samples, sample_rate, options)
}

/// Encode mono 16-bit samples to VADPCM, training a codebook unless one is given
pub fn encode_from_samples(
    samples: &[i16],
    sample_rate: u32,
    options: EncodeOptions,
) -> Result<EncodedAudio> {
    let (codebook, overflows) = match options.codebook {
        Some(codebook) => (codebook, None),
        None => {
            let trained = calculate_codebook(samples, &options.settings)
                .context("Failed to train codebook")?;
            debug!(
                "trained {} predictors from {} windows",
                trained.codebook.len(),
                trained.training_vectors
            );
            (trained.codebook, Some(trained.overflows))
        }
    };

    if let Some(l) = &options.loop_point {
        if l.start > l.end || l.end as usize > samples.len() {
            bail!(
                "Loop {}..{} does not fit in {} samples",
                l.start,
                l.end,
                samples.len()
            );
        }
    }

    let pcm = PcmEncodedData::new(samples.to_vec(), sample_rate as f64);
    let encoded = encode_adpcm(&pcm, &codebook, options.loop_point.as_ref());

    Ok(EncodedAudio {
        frames: Writer::new().write(&encoded),
        table: codebook.serialize(),
        codebook,
        sample_rate,
        sample_count: samples.len(),
        loop_point: encoded.loop_point,
        overflows,
    })
}

/// Decoding options for converting VADPCM back to pcm
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Real sample count; defaults to 16 per frame
    pub sample_count: Option<usize>,
    /// Reconstruct pcm that re-encodes to the very same frames
    pub exact: bool,
    pub reconstruct: ReconstructOptions,
}

impl DecodeOptions {
    pub fn with_sample_count(mut self, sample_count: usize) -> Self {
        self.sample_count = Some(sample_count);
        self
    }

    pub fn exact(mut self, reconstruct: ReconstructOptions) -> Self {
        self.exact = true;
        self.reconstruct = reconstruct;
        self
    }
}

/// Decoded samples plus the frames the exact search gave up on
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub samples: Vec<i16>,
    pub unmatched_frames: Vec<usize>,
}

/// Decode a frame stream to mono 16-bit samples
///
/// # Arguments
/// * `frame_bytes` - Raw 9-byte VADPCM frames
/// * `table` - `.table` text of the codebook
/// * `options` - Decoding options
pub fn decode_to_samples(
    frame_bytes: &[u8],
    table: &str,
    options: &DecodeOptions,
) -> Result<DecodedAudio> {
    let codebook = parse_table(table)?;
    let mut data = Reader::new()
        .read(frame_bytes, codebook, 0.0)
        .context("Frame stream does not match codebook")?;

    if let Some(count) = options.sample_count {
        if count > data.sample_count {
            bail!(
                "Stream holds {} samples, {} requested",
                data.sample_count,
                count
            );
        }
        data.sample_count = count;
    }

    if options.exact {
        let result = decode_adpcm_exact(&data, &options.reconstruct)
            .context("Exact reconstruction failed")?;
        Ok(DecodedAudio {
            samples: result.pcm.samples,
            unmatched_frames: result.unmatched_frames,
        })
    } else {
        let pcm = decode_adpcm(&data).context("Decoding failed")?;
        Ok(DecodedAudio {
            samples: pcm.samples,
            unmatched_frames: Vec::new(),
        })
    }
}

/// Decode a frame stream to WAV format
///
/// # Returns
/// Raw bytes of a 16-bit mono WAV file
pub fn decode_to_wav(
    frame_bytes: &[u8],
    table: &str,
    sample_rate: u32,
    options: &DecodeOptions,
) -> Result<Vec<u8>> {
    let decoded = decode_to_samples(frame_bytes, table, options)?;

    audio::write_wav_to_bytes(&decoded.samples, sample_rate).context("Failed to write WAV data")
}

/// Get information about an audio file
///
/// # Arguments
/// * `audio_bytes` - Raw bytes of an audio file (WAV, AIFF, FLAC, MP3, etc.)
pub fn get_audio_info(audio_bytes: &[u8]) -> Result<AudioInfo> {
    let (samples, sample_rate, channels) =
        audio::read_audio_from_bytes(audio_bytes).context("Failed to read audio file")?;

    Ok(AudioInfo {
        sample_rate,
        channels,
        duration_secs: samples.len() as f32 / sample_rate as f32,
    })
}
