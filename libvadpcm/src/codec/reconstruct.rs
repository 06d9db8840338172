//! bit-exact reconstruction
//!
//! Decoding is many-to-one, so the clamped decode of a frame does not always
//! encode back to the same bytes. This searches, frame by frame, for pcm that
//! does, then nudges it back toward the plain decode.

use log::{debug, warn};

use crate::core::{
    clamp_16, AdpcmEncodedData, Codebook, Error, Frame, PcmEncodedData, VadpcmResult,
    SAMPLES_PER_FRAME,
};

use super::decoder::decode_frame;
use super::encoder::{encode_frame, State};

/// seed every reconstruction session starts from
pub const RECONSTRUCT_SEED: u64 = 1619236481962341;

const RNG_MULTIPLIER: u64 = 3123692312231;

/// consecutive rejected pull-back moves before a frame is settled
const PULL_BACK_FAILURES: u32 = 50;

/// the linear congruential generator driving the search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructRng {
    state: u64,
}

impl ReconstructRng {
    pub fn new() -> Self {
        Self::with_seed(RECONSTRUCT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        ReconstructRng { state: seed }
    }

    /// next draw, always in 0..2^31
    pub fn next_draw(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(RNG_MULTIPLIER).wrapping_add(1);
        (self.state >> 33) as u32
    }
}

impl Default for ReconstructRng {
    fn default() -> Self {
        Self::new()
    }
}

/// search limits for [`decode_adpcm_exact`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconstructOptions {
    /// random guesses per frame before giving up; `None` searches forever
    pub max_attempts: Option<u64>,
    /// fail instead of falling back to the plain decode
    pub strict: bool,
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        ReconstructOptions {
            max_attempts: Some(1_000_000),
            strict: false,
        }
    }
}

impl ReconstructOptions {
    pub fn with_max_attempts(mut self, max_attempts: Option<u64>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// output of an exact decode
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    pub pcm: PcmEncodedData,
    /// frames that hit the attempt limit and hold the plain decode instead
    pub unmatched_frames: Vec<usize>,
    /// random guesses made across the whole stream
    pub search_attempts: u64,
}

impl Reconstruction {
    pub fn is_exact(&self) -> bool {
        self.unmatched_frames.is_empty()
    }
}

/// decode a stream to pcm that re-encodes to the very same frames
pub fn decode_adpcm_exact(
    data: &AdpcmEncodedData,
    options: &ReconstructOptions,
) -> VadpcmResult<Reconstruction> {
    data.validate()?;

    let mut rng = ReconstructRng::new();
    let mut state: State = [0; SAMPLES_PER_FRAME];
    let mut samples = Vec::with_capacity(data.frames.len() * SAMPLES_PER_FRAME);
    let mut unmatched_frames = Vec::new();
    let mut search_attempts = 0u64;

    for (index, frame) in data.frames.iter().enumerate() {
        let outcome = reconstruct_frame(frame, &mut state, &data.codebook, &mut rng, options);
        search_attempts += outcome.attempts;

        if !outcome.matched {
            if options.strict {
                return Err(Error::Unreconstructible { frame: index });
            }
            warn!(
                "frame {} not reconstructed after {} attempts, using plain decode",
                index, outcome.attempts
            );
            unmatched_frames.push(index);
        }

        samples.extend_from_slice(&outcome.samples);
    }

    samples.truncate(data.sample_count);
    debug!(
        "exact decode: {} frames, {} search attempts",
        data.frames.len(),
        search_attempts
    );

    Ok(Reconstruction {
        pcm: PcmEncodedData {
            samples,
            sample_rate: data.sample_rate,
            loop_point: data.loop_point,
        },
        unmatched_frames,
        search_attempts,
    })
}

/// result of reconstructing one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReconstruction {
    pub samples: [i16; SAMPLES_PER_FRAME],
    pub matched: bool,
    pub attempts: u64,
}

/// reconstruct one frame; `state` advances exactly as a plain decode would
pub fn reconstruct_frame(
    frame: &Frame,
    state: &mut State,
    codebook: &Codebook,
    rng: &mut ReconstructRng,
    options: &ReconstructOptions,
) -> FrameReconstruction {
    let last_state = *state;
    decode_frame(frame, state, codebook);

    let naive = state.map(clamp_16);
    let matches = |guess: &[i16; SAMPLES_PER_FRAME]| {
        let mut scratch = last_state;
        encode_frame(guess, &mut scratch, codebook) == *frame
    };

    if matches(&naive) {
        return FrameReconstruction {
            samples: naive,
            matched: true,
            attempts: 0,
        };
    }

    // random guesses within half a quantization step of the plain decode
    let step = 1i32 << frame.scale();
    let spread = (step / 2).max(1);
    let span = (2 * spread + 1) as u32;
    let mut guess = naive;
    let mut attempts = 0u64;

    loop {
        if options.max_attempts.is_some_and(|max| attempts >= max) {
            return FrameReconstruction {
                samples: naive,
                matched: false,
                attempts,
            };
        }
        attempts += 1;

        for (g, &n) in guess.iter_mut().zip(naive.iter()) {
            let offset = (rng.next_draw() % span) as i32 - spread;
            *g = clamp_16(n as i32 + offset);
        }
        if matches(&guess) {
            break;
        }
    }

    // pull samples back toward the plain decode while the bytes still match
    let mut failures = 0;
    while failures < PULL_BACK_FAILURES {
        let i = (rng.next_draw() % SAMPLES_PER_FRAME as u32) as usize;
        if guess[i] == naive[i] {
            continue;
        }

        let candidate = if rng.next_draw() % 2 == 0 {
            naive[i]
        } else {
            ((guess[i] as i32 + naive[i] as i32) / 2) as i16
        };
        if candidate == guess[i] {
            failures += 1;
            continue;
        }

        let previous = guess[i];
        guess[i] = candidate;
        if matches(&guess) {
            failures = 0;
        } else {
            guess[i] = previous;
            failures += 1;
        }
    }

    FrameReconstruction {
        samples: guess,
        matched: true,
        attempts,
    }
}
