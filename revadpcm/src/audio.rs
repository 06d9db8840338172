use anyhow::{Context, Result};
use std::io::{Cursor, Write};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Read an audio file and return (mono samples, sample_rate, source channels)
pub fn read_audio_file(path: &Path) -> Result<(Vec<i16>, u32, usize)> {
    let file = std::fs::File::open(path).context("Failed to open audio file")?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    read_from_source(mss, path.extension().and_then(|e| e.to_str()))
}

/// Read audio from bytes (for cross-platform/WASM support)
pub fn read_audio_from_bytes(bytes: &[u8]) -> Result<(Vec<i16>, u32, usize)> {
    let cursor = Cursor::new(bytes.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());
    read_from_source(mss, None)
}

fn read_from_source(
    mss: MediaSourceStream,
    extension: Option<&str>,
) -> Result<(Vec<i16>, u32, usize)> {
    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .context("Unsupported audio format")?;

    let mut format = probed.format;

    // Find the first audio track
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio track found")?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("Unknown sample rate")?;
    let channels = track
        .codec_params
        .channels
        .context("Unknown channel count")?
        .count();

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Failed to create decoder")?;

    let mut interleaved: Vec<i16> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<i16>> = None;

    // Decode all packets
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(e) => return Err(e).context("Error reading packet"),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(symphonia::core::errors::Error::DecodeError(err)) => {
                log::warn!("skipping undecodable packet: {}", err);
                continue;
            }
            Err(e) => return Err(e).context("Error decoding packet"),
        };

        // symphonia converts any sample format to 16-bit for us
        let buf = sample_buf.get_or_insert_with(|| {
            SampleBuffer::<i16>::new(decoded.capacity() as u64, *decoded.spec())
        });
        if buf.capacity() < decoded.capacity() * channels {
            *buf = SampleBuffer::<i16>::new(decoded.capacity() as u64, *decoded.spec());
        }
        buf.copy_interleaved_ref(decoded);
        interleaved.extend_from_slice(buf.samples());
    }

    Ok((mix_to_mono(&interleaved, channels), sample_rate, channels))
}

/// Average interleaved channels down to one
pub fn mix_to_mono(interleaved: &[i16], channels: usize) -> Vec<i16> {
    if channels <= 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks_exact(channels)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

/// Write mono samples to a 16-bit WAV file
pub fn write_wav(path: &Path, samples: &[i16], sample_rate: u32) -> Result<()> {
    let bytes = write_wav_to_bytes(samples, sample_rate)?;
    std::fs::write(path, bytes).context("Failed to write WAV file")
}

/// Write mono samples to 16-bit WAV format in memory (for cross-platform/WASM support)
pub fn write_wav_to_bytes(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>> {
    // WAV file format (RIFF)
    let mut buffer = Vec::with_capacity(44 + samples.len() * 2);

    let channels = 1u16;
    let bytes_per_sample = 2u16;
    let data_size = samples.len() * bytes_per_sample as usize;
    let file_size = 36 + data_size; // 44 byte header - 8 + data_size

    // RIFF header
    buffer.write_all(b"RIFF")?;
    buffer.write_all(&(file_size as u32).to_le_bytes())?;
    buffer.write_all(b"WAVE")?;

    // fmt chunk
    buffer.write_all(b"fmt ")?;
    buffer.write_all(&16u32.to_le_bytes())?; // chunk size
    buffer.write_all(&1u16.to_le_bytes())?; // format = PCM
    buffer.write_all(&channels.to_le_bytes())?;
    buffer.write_all(&sample_rate.to_le_bytes())?;
    let byte_rate = sample_rate * (channels * bytes_per_sample) as u32;
    buffer.write_all(&byte_rate.to_le_bytes())?;
    buffer.write_all(&(channels * bytes_per_sample).to_le_bytes())?;
    buffer.write_all(&16u16.to_le_bytes())?; // bits per sample

    // data chunk
    buffer.write_all(b"data")?;
    buffer.write_all(&(data_size as u32).to_le_bytes())?;

    for &sample in samples {
        buffer.write_all(&sample.to_le_bytes())?;
    }

    Ok(buffer)
}
