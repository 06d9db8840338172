//! Example: Convert an audio file to VADPCM and back
//!
//! Run with: cargo run --example convert_audio input.wav output.vadpcm

use revadpcm::{decode_to_wav, encode_from_audio, get_vadpcm_info, DecodeOptions, EncodeOptions};
use std::env;
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <input-audio> <output-vadpcm>", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = &args[2];

    println!("Reading {}...", input_path);
    let audio_bytes = fs::read(input_path)?;

    let info = revadpcm::get_audio_info(&audio_bytes)?;
    println!("  Sample rate: {} Hz", info.sample_rate);
    println!("  Channels: {}", info.channels);
    println!("  Duration: {:.2}s", info.duration_secs);

    // Train a 4-predictor, order-2 codebook (the defaults)
    println!("\nEncoding to VADPCM...");
    let encoded = encode_from_audio(&audio_bytes, EncodeOptions::default())?;

    let original_size = encoded.sample_count * 2;
    let compressed_size = encoded.frames.len();
    println!("  Original: {} bytes", original_size);
    println!("  Compressed: {} bytes", compressed_size);
    println!(
        "  Ratio: {:.1}x",
        original_size as f32 / compressed_size.max(1) as f32
    );

    fs::write(output_path, &encoded.frames)?;
    let table_path = format!("{}.table", output_path);
    fs::write(&table_path, &encoded.table)?;
    println!("\nWrote frames to {} and codebook to {}", output_path, table_path);

    let stream_info = get_vadpcm_info(&encoded.frames, &encoded.table)?;
    println!("\nStream Info:");
    println!("  Frames: {}", stream_info.frames);
    println!("  Predictors: {}", stream_info.predictors);
    println!("  Scales: {:?}", stream_info.scale_histogram);

    // Decode back to WAV for verification, bit-exact
    println!("\nDecoding back to WAV for verification...");
    let options = DecodeOptions::default()
        .with_sample_count(encoded.sample_count)
        .exact(Default::default());
    let wav_bytes = decode_to_wav(&encoded.frames, &encoded.table, info.sample_rate, &options)?;
    let wav_path = format!("{}_decoded.wav", output_path);
    fs::write(&wav_path, wav_bytes)?;
    println!("Wrote decoded WAV to {}", wav_path);

    Ok(())
}
