use crate::core::{
    inner_product, AdpcmEncodedData, Codebook, Frame, Loop, PcmEncodedData, Predictor,
    MAX_SCALE, NIBBLE_MAX, NIBBLE_MIN, SAMPLES_PER_FRAME,
};

/// rolling state carried between frames
pub type State = [i32; SAMPLES_PER_FRAME];

/// stateful frame encoder over one codebook
pub struct Encoder<'a> {
    codebook: &'a Codebook,
    state: State,
}

impl<'a> Encoder<'a> {
    pub fn new(codebook: &'a Codebook) -> Self {
        Encoder {
            codebook,
            state: [0; SAMPLES_PER_FRAME],
        }
    }

    /// start from a saved state instead of silence
    pub fn with_state(mut self, state: State) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// encode up to 16 samples (zero padded) and advance the state
    pub fn encode_frame(&mut self, samples: &[i16]) -> Frame {
        encode_frame(samples, &mut self.state, self.codebook)
    }

    /// encode a whole buffer, the last frame zero padded
    pub fn encode(&mut self, samples: &[i16]) -> Vec<Frame> {
        samples
            .chunks(SAMPLES_PER_FRAME)
            .map(|chunk| self.encode_frame(chunk))
            .collect()
    }
}

/// encode a pcm buffer, capturing the loop start state when a loop is given
///
/// With no explicit loop the one attached to `pcm` is used.
pub fn encode_adpcm(
    pcm: &PcmEncodedData,
    codebook: &Codebook,
    loop_point: Option<&Loop>,
) -> AdpcmEncodedData {
    let mut loop_point = loop_point.or(pcm.loop_point.as_ref()).copied();
    let loop_frame = loop_point.map(|l| l.start as usize / SAMPLES_PER_FRAME);

    let mut encoder = Encoder::new(codebook);
    let mut frames = Vec::with_capacity(pcm.samples.len().div_ceil(SAMPLES_PER_FRAME));

    for (index, chunk) in pcm.samples.chunks(SAMPLES_PER_FRAME).enumerate() {
        if loop_frame == Some(index) {
            capture_loop_state(&mut loop_point, encoder.state());
        }
        frames.push(encoder.encode_frame(chunk));
    }

    // loop starting exactly at the end of the sound
    if loop_frame == Some(frames.len()) {
        capture_loop_state(&mut loop_point, encoder.state());
    }

    AdpcmEncodedData {
        sample_count: pcm.samples.len(),
        sample_rate: pcm.sample_rate,
        codebook: codebook.clone(),
        loop_point,
        frames,
    }
}

/// saved loop state is kept symmetric, -32767..=32767
fn capture_loop_state(loop_point: &mut Option<Loop>, state: &State) {
    if let Some(l) = loop_point.as_mut() {
        l.state = state.map(|v| v.clamp(-(i16::MAX as i32), i16::MAX as i32) as i16);
    }
}

/// encode one frame of up to 16 samples, updating `state` with the decoded output
///
/// Never fails: scale saturates at 12 and residuals are clipped to 4 bits.
pub fn encode_frame(input: &[i16], state: &mut State, codebook: &Codebook) -> Frame {
    let order = codebook.order();

    let mut in_buffer = [0i32; SAMPLES_PER_FRAME];
    for (dst, &sample) in in_buffer.iter_mut().zip(input) {
        *dst = sample as i32;
    }

    // best predictor by squared error, first one wins ties
    let mut min = 1e30f32;
    let mut optimal = 0usize;
    for (k, predictor) in codebook.predictors().iter().enumerate() {
        let errors = prediction_errors(predictor, order, state, &in_buffer);
        let se = errors.iter().fold(0.0f32, |acc, &e| acc + e * e);
        if se < min {
            min = se;
            optimal = k;
        }
    }

    let predictor = &codebook.predictors()[optimal];
    let errors = prediction_errors(predictor, order, state, &in_buffer);

    // largest residual; an equal magnitude later on does not replace it
    let mut max = 0i32;
    for &e in &errors {
        let ie = round_residual(e);
        if ie.abs() > max.abs() {
            max = ie;
        }
    }

    let mut scale: i32 = 0;
    while scale <= MAX_SCALE as i32 {
        if (NIBBLE_MIN..=NIBBLE_MAX).contains(&max) {
            break;
        }
        max /= 2;
        scale += 1;
    }

    let saved = *state;
    let mut ix = [0i32; SAMPLES_PER_FRAME];
    let mut iterations = 0;
    scale -= 1;

    loop {
        iterations += 1;
        scale = (scale + 1).min(MAX_SCALE as i32);
        let step = 1i32 << scale;
        let mut max_clip = 0i32;

        let mut in_vector = [0i32; SAMPLES_PER_FRAME];
        in_vector[..order].copy_from_slice(&saved[SAMPLES_PER_FRAME - order..]);

        for half in 0..2 {
            if half == 1 {
                in_vector[..order].copy_from_slice(&state[8 - order..8]);
            }

            for i in 0..8 {
                let n = half * 8 + i;
                let prediction = inner_product(order + i, predictor.row(i), &in_vector);
                let error = in_buffer[n] as f32 - prediction as f32;
                let q = quantize(error, step);
                let clipped = q.clamp(NIBBLE_MIN, NIBBLE_MAX);
                max_clip = max_clip.max((clipped - q).abs());

                ix[n] = clipped;
                in_vector[order + i] = clipped * step;
                state[n] = prediction.wrapping_add(in_vector[order + i]);
            }
        }

        if max_clip < 2 || iterations >= 2 {
            break;
        }
    }

    Frame::pack(scale as u8, optimal as u8, &ix)
}

/// unquantized residuals of `predictor` against the true input
fn prediction_errors(
    predictor: &Predictor,
    order: usize,
    state: &State,
    in_buffer: &[i32; SAMPLES_PER_FRAME],
) -> [f32; SAMPLES_PER_FRAME] {
    let mut in_vector = [0i32; SAMPLES_PER_FRAME];
    let mut prediction = [0i32; SAMPLES_PER_FRAME];
    let mut errors = [0f32; SAMPLES_PER_FRAME];

    in_vector[..order].copy_from_slice(&state[SAMPLES_PER_FRAME - order..]);

    for half in 0..2 {
        if half == 1 {
            // prediction + error of the tail of the first half is the input itself
            for i in 0..order {
                in_vector[i] = prediction[8 - order + i].wrapping_add(in_vector[8 + i]);
            }
        }

        for i in 0..8 {
            let n = half * 8 + i;
            prediction[n] = inner_product(order + i, predictor.row(i), &in_vector);
            in_vector[order + i] = in_buffer[n].wrapping_sub(prediction[n]);
            errors[n] = in_vector[order + i] as f32;
        }
    }

    errors
}

/// clamp to 16 bits and round half away from zero
pub(super) fn round_residual(e: f32) -> i32 {
    let e = e.clamp(i16::MIN as f32, i16::MAX as f32);
    if e > 0.0 {
        (e + 0.5) as i32
    } else {
        (e - 0.5) as i32
    }
}

/// divide by the step and round to nearest, biased just under one half
pub(super) fn quantize(x: f32, step: i32) -> i32 {
    let scaled = x / step as f32;
    let q = if x > 0.0 {
        scaled + 0.499_999_9
    } else {
        scaled - 0.499_999_9
    };
    q as i16 as i32
}
