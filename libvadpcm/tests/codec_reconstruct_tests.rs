//! Bit-exact reconstruction tests for libvadpcm

use libvadpcm::{
    calculate_codebook, clamp_16, decode_adpcm, decode_adpcm_exact, decode_frame, encode_adpcm,
    encode_frame, reconstruct_frame, AdpcmEncodedData, Codebook, CompressionSettings, Encoder,
    Error, PcmEncodedData, Predictor, ReconstructOptions, ReconstructRng,
};

fn sine_mix(len: usize) -> Vec<i16> {
    (0..len)
        .map(|i| {
            let t = i as f64;
            (8000.0 * (t * 0.05).sin() + 3000.0 * (t * 0.31).sin()) as i16
        })
        .collect()
}

fn noise(len: usize) -> Vec<i16> {
    let mut x: u32 = 12345;
    (0..len)
        .map(|_| {
            x = x.wrapping_mul(1103515245).wrapping_add(12345);
            ((x >> 16) as i16) / 4
        })
        .collect()
}

fn square(len: usize) -> Vec<i16> {
    (0..len)
        .map(|i| if (i / 37) % 2 == 0 { 12000 } else { -12000 })
        .collect()
}

fn encode(samples: Vec<i16>) -> AdpcmEncodedData {
    let trained = calculate_codebook(&samples, &CompressionSettings::default()).unwrap();
    encode_adpcm(&PcmEncodedData::new(samples, 22050.0), &trained.codebook, None)
}

fn reencode(samples: &[i16], codebook: &Codebook) -> Vec<libvadpcm::Frame> {
    Encoder::new(codebook).encode(samples)
}

/// frames whose plain decode does not encode back to themselves
fn frames_needing_search(data: &AdpcmEncodedData) -> Vec<usize> {
    let mut state = [0i32; 16];
    let mut out = Vec::new();
    for (i, frame) in data.frames.iter().enumerate() {
        let last = state;
        decode_frame(frame, &mut state, &data.codebook);
        let naive = state.map(clamp_16);
        let mut scratch = last;
        if encode_frame(&naive, &mut scratch, &data.codebook) != *frame {
            out.push(i);
        }
    }
    out
}

// ============================================================================
// Exactness Tests
// ============================================================================

#[test]
fn test_exact_decode_reencodes_identically() {
    for samples in [sine_mix(1024), noise(512), square(512)] {
        let encoded = encode(samples);
        let exact = decode_adpcm_exact(&encoded, &ReconstructOptions::default()).unwrap();

        assert!(exact.is_exact());
        assert_eq!(exact.pcm.samples.len(), encoded.sample_count);
        assert_eq!(reencode(&exact.pcm.samples, &encoded.codebook), encoded.frames);
    }
}

#[test]
fn test_exact_decode_is_deterministic() {
    let encoded = encode(noise(480));
    let options = ReconstructOptions::default();
    let a = decode_adpcm_exact(&encoded, &options).unwrap();
    let b = decode_adpcm_exact(&encoded, &options).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_exact_decode_is_idempotent() {
    let encoded = encode(sine_mix(512));
    let options = ReconstructOptions::default();
    let first = decode_adpcm_exact(&encoded, &options).unwrap();

    let again = encode_adpcm(&first.pcm, &encoded.codebook, None);
    let second = decode_adpcm_exact(&again, &options).unwrap();
    assert_eq!(again.frames, encoded.frames);
    assert_eq!(second.pcm.samples, first.pcm.samples);
}

#[test]
fn test_exact_equals_plain_when_no_search_needed() {
    let encoded = encode(sine_mix(1024));
    let exact = decode_adpcm_exact(&encoded, &ReconstructOptions::default()).unwrap();
    let plain = decode_adpcm(&encoded).unwrap();

    let searched = frames_needing_search(&encoded);
    for (i, (e, p)) in exact
        .pcm
        .samples
        .chunks(16)
        .zip(plain.samples.chunks(16))
        .enumerate()
    {
        if !searched.contains(&i) {
            assert_eq!(e, p, "frame {} should be the plain decode", i);
        }
    }
}

#[test]
fn test_exact_decode_truncates_short_streams() {
    let samples = sine_mix(1000);
    let encoded = encode(samples);
    let exact = decode_adpcm_exact(&encoded, &ReconstructOptions::default()).unwrap();
    assert_eq!(exact.pcm.samples.len(), 1000);
}

#[test]
fn test_exact_decode_restores_quiet_input() {
    // residuals fit at scale 0, so nothing is lost
    let samples: Vec<i16> = (0..64).map(|i| (i % 7) - 3).collect();
    let zero = Predictor::from_base(2, &[0; 16]).unwrap();
    let codebook = Codebook::new(2, vec![zero]).unwrap();
    let encoded = encode_adpcm(&PcmEncodedData::new(samples.clone(), 8000.0), &codebook, None);
    assert!(encoded.frames.iter().all(|f| f.scale() == 0));

    let exact = decode_adpcm_exact(&encoded, &ReconstructOptions::default()).unwrap();
    assert_eq!(exact.pcm.samples, samples);
}

#[test]
fn test_exact_decode_restores_quiet_trained_input() {
    let samples: Vec<i16> = (0..64).map(|i| (7.0 * (i as f64 * 0.2).sin()) as i16).collect();
    let encoded = encode(samples.clone());
    assert!(encoded.frames.iter().all(|f| f.scale() == 0));

    let exact = decode_adpcm_exact(&encoded, &ReconstructOptions::default()).unwrap();
    assert!(exact.is_exact());
    assert_eq!(exact.pcm.samples, samples);
}

// ============================================================================
// Search Limit Tests
// ============================================================================

#[test]
fn test_zero_attempts_falls_back() {
    let encoded = encode(noise(512));
    let needing = frames_needing_search(&encoded);
    let options = ReconstructOptions::default().with_max_attempts(Some(0));
    let result = decode_adpcm_exact(&encoded, &options).unwrap();

    assert_eq!(result.unmatched_frames, needing);
    assert_eq!(result.search_attempts, 0);
    assert_eq!(result.pcm.samples, decode_adpcm(&encoded).unwrap().samples);
}

#[test]
fn test_strict_reports_first_unreconstructible_frame() {
    let encoded = encode(noise(512));
    let needing = frames_needing_search(&encoded);
    let options = ReconstructOptions::default()
        .with_max_attempts(Some(0))
        .with_strict(true);

    match decode_adpcm_exact(&encoded, &options) {
        Err(Error::Unreconstructible { frame }) => assert_eq!(Some(&frame), needing.first()),
        Ok(result) => assert!(needing.is_empty() && result.is_exact()),
        Err(e) => panic!("unexpected error {}", e),
    }
}

#[test]
fn test_unbounded_search() {
    let encoded = encode(square(256));
    let options = ReconstructOptions::default().with_max_attempts(None);
    let result = decode_adpcm_exact(&encoded, &options).unwrap();
    assert!(result.is_exact());
}

// ============================================================================
// Single Frame Tests
// ============================================================================

#[test]
fn test_reconstruct_frame_advances_like_decode() {
    let encoded = encode(noise(256));
    let mut rng = ReconstructRng::new();
    let options = ReconstructOptions::default();
    let mut recon_state = [0i32; 16];
    let mut plain_state = [0i32; 16];

    for frame in &encoded.frames {
        let before = recon_state;
        let out = reconstruct_frame(frame, &mut recon_state, &encoded.codebook, &mut rng, &options);
        decode_frame(frame, &mut plain_state, &encoded.codebook);
        assert_eq!(recon_state, plain_state);

        let mut scratch = before;
        assert!(out.matched);
        assert_eq!(encode_frame(&out.samples, &mut scratch, &encoded.codebook), *frame);
    }
}
