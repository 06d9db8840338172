use crate::core::{
    clamp_16, inner_product, AdpcmEncodedData, Codebook, Frame, PcmEncodedData, VadpcmResult,
    SAMPLES_PER_FRAME,
};

use super::encoder::State;

/// stateful frame decoder over one codebook
pub struct Decoder<'a> {
    codebook: &'a Codebook,
    state: State,
}

impl<'a> Decoder<'a> {
    pub fn new(codebook: &'a Codebook) -> Self {
        Decoder {
            codebook,
            state: [0; SAMPLES_PER_FRAME],
        }
    }

    /// resume from a saved state (e.g. a loop start)
    pub fn with_state(mut self, state: State) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// decode one frame; the returned values are the full 32-bit reference
    pub fn decode_frame(&mut self, frame: &Frame) -> State {
        decode_frame(frame, &mut self.state, self.codebook);
        self.state
    }

    /// decode frames to 16-bit pcm, keeping at most `sample_count` samples
    pub fn decode(&mut self, frames: &[Frame], sample_count: usize) -> Vec<i16> {
        let mut samples = Vec::with_capacity(frames.len() * SAMPLES_PER_FRAME);
        for frame in frames {
            let out = self.decode_frame(frame);
            samples.extend(out.iter().map(|&v| clamp_16(v)));
        }
        samples.truncate(sample_count);
        samples
    }
}

/// decode a whole stream from silence
pub fn decode_adpcm(data: &AdpcmEncodedData) -> VadpcmResult<PcmEncodedData> {
    data.validate()?;

    let samples = Decoder::new(&data.codebook).decode(&data.frames, data.sample_count);

    Ok(PcmEncodedData {
        samples,
        sample_rate: data.sample_rate,
        loop_point: data.loop_point,
    })
}

/// decode one frame in place: `state` ends up holding its 16 output values
///
/// The predictor index must exist in `codebook`.
pub fn decode_frame(frame: &Frame, state: &mut State, codebook: &Codebook) {
    let order = codebook.order();
    let predictor = &codebook.predictors()[frame.predictor()];
    let scale = 1i32 << frame.scale();
    let ix = frame.nibbles().map(|n| n * scale);

    for half in 0..2 {
        let mut in_vector = [0i32; SAMPLES_PER_FRAME];
        let history = if half == 0 { SAMPLES_PER_FRAME } else { 8 };
        in_vector[..order].copy_from_slice(&state[history - order..history]);

        for i in 0..8 {
            let n = half * 8 + i;
            in_vector[order + i] = ix[n];
            state[n] = inner_product(order + i, predictor.row(i), &in_vector).wrapping_add(ix[n]);
        }
    }
}
