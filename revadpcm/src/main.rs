use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use revadpcm::{CompressionSettings, DecodeOptions, EncodeOptions, Loop, ReconstructOptions};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "vadpcm")]
#[command(version)]
#[command(about = "N64 VADPCM audio converter", long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode an audio file to a raw VADPCM frame stream
    Encode {
        /// Input audio file (wav, aiff, flac, mp3, etc.)
        input: PathBuf,
        /// Output frame stream; the codebook is written beside it as .table
        output: PathBuf,
        /// Encode with this codebook instead of training one
        #[arg(long)]
        table: Option<PathBuf>,
        #[command(flatten)]
        settings: SettingsArgs,
        /// First sample of the loop
        #[arg(long, requires = "loop_end")]
        loop_start: Option<u32>,
        /// Sample after the last one of the loop
        #[arg(long, requires = "loop_start")]
        loop_end: Option<u32>,
        /// Times to play the loop (default forever)
        #[arg(long, requires = "loop_start")]
        loop_count: Option<u32>,
    },
    /// Train a codebook and write it as a .table file
    Table {
        /// Input audio file
        input: PathBuf,
        /// Output .table file
        output: PathBuf,
        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// Decode a raw VADPCM frame stream to WAV
    Decode {
        /// Input frame stream
        input: PathBuf,
        /// Codebook .table the stream was encoded with
        table: PathBuf,
        /// Output WAV file
        output: PathBuf,
        /// Number of samples to keep (default: 16 per frame)
        #[arg(long)]
        samples: Option<usize>,
        /// Sample rate to write into the WAV header
        #[arg(long, default_value = "32000")]
        sample_rate: u32,
        /// Reconstruct pcm that re-encodes to the very same frames
        #[arg(long)]
        exact: bool,
        /// Search attempts per frame before falling back (0 = unlimited)
        #[arg(long, default_value = "1000000")]
        max_attempts: u64,
        /// Fail instead of falling back when a frame cannot be reconstructed
        #[arg(long, requires = "exact")]
        strict: bool,
    },
    /// Show information about a frame stream
    Info {
        /// Input frame stream
        input: PathBuf,
        /// Codebook .table the stream was encoded with
        table: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Trainer settings; flags override the JSON file
#[derive(Args)]
struct SettingsArgs {
    /// JSON file with trainer settings
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Predictor order (1-8)
    #[arg(long)]
    order: Option<usize>,
    /// Analysis window length in samples
    #[arg(long)]
    frame_size: Option<usize>,
    /// Minimum window energy used for training
    #[arg(long)]
    threshold: Option<f64>,
    /// log2 of the predictor count (1-4)
    #[arg(long)]
    bits: Option<u32>,
    /// Refinement rounds after each split
    #[arg(long)]
    refine_iterations: Option<usize>,
}

impl SettingsArgs {
    fn resolve(&self) -> Result<CompressionSettings> {
        let mut settings = match &self.settings {
            Some(path) => {
                let json = fs::read_to_string(path).context("Failed to read settings file")?;
                CompressionSettings::from_json(&json).context("Invalid settings file")?
            }
            None => CompressionSettings::default(),
        };

        if let Some(order) = self.order {
            settings = settings.with_order(order);
        }
        if let Some(frame_size) = self.frame_size {
            settings = settings.with_frame_size(frame_size);
        }
        if let Some(threshold) = self.threshold {
            settings = settings.with_threshold(threshold);
        }
        if let Some(bits) = self.bits {
            settings = settings.with_bits(bits);
        }
        if let Some(iters) = self.refine_iterations {
            settings = settings.with_refine_iters(iters);
        }

        settings.validate().context("Invalid trainer settings")?;
        Ok(settings)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Encode {
            input,
            output,
            table,
            settings,
            loop_start,
            loop_end,
            loop_count,
        } => {
            let loop_point = match (loop_start, loop_end) {
                (Some(start), Some(end)) => Some(Loop::new(
                    start,
                    end,
                    loop_count.unwrap_or(libvadpcm::LOOP_FOREVER),
                )),
                _ => None,
            };
            encode(&input, &output, table.as_deref(), &settings, loop_point)?;
        }
        Commands::Table {
            input,
            output,
            settings,
        } => {
            train_table(&input, &output, &settings)?;
        }
        Commands::Decode {
            input,
            table,
            output,
            samples,
            sample_rate,
            exact,
            max_attempts,
            strict,
        } => {
            let mut options = DecodeOptions::default();
            if let Some(count) = samples {
                options = options.with_sample_count(count);
            }
            if exact {
                let max_attempts = if max_attempts == 0 {
                    None
                } else {
                    Some(max_attempts)
                };
                options = options.exact(
                    ReconstructOptions::default()
                        .with_max_attempts(max_attempts)
                        .with_strict(strict),
                );
            }
            decode(&input, &table, &output, sample_rate, &options)?;
        }
        Commands::Info { input, table, json } => {
            info(&input, &table, json)?;
        }
    }

    Ok(())
}

fn read_audio(input: &Path) -> Result<(Vec<i16>, u32)> {
    println!("Reading {}...", input.display());

    let (samples, sample_rate, channels) =
        revadpcm::audio::read_audio_file(input).context("Failed to read audio file")?;

    println!("  Sample rate: {} Hz", sample_rate);
    if channels > 1 {
        println!("  Channels: {} (mixed to mono)", channels);
    } else {
        println!("  Channels: 1");
    }
    println!(
        "  Duration: {:.2}s",
        samples.len() as f32 / sample_rate as f32
    );

    Ok((samples, sample_rate))
}

fn encode(
    input: &Path,
    output: &Path,
    table: Option<&Path>,
    settings: &SettingsArgs,
    loop_point: Option<Loop>,
) -> Result<()> {
    let (samples, sample_rate) = read_audio(input)?;

    // an explicit table wins over one sitting next to the input
    let sibling = input.with_extension("table");
    let table_path = table.or_else(|| sibling.exists().then_some(sibling.as_path()));

    let mut options = EncodeOptions::default();
    match table_path {
        Some(path) => {
            println!("Using codebook {}", path.display());
            let text = fs::read_to_string(path).context("Failed to read codebook")?;
            options = options.with_codebook(revadpcm::parse_table(&text)?);
        }
        None => {
            let settings = settings.resolve()?;
            println!(
                "Training codebook (order {}, {} predictors)...",
                settings.order,
                settings.predictor_count()
            );
            options = options.with_settings(settings);
        }
    }
    if let Some(l) = loop_point {
        options = options.with_loop(l);
    }

    println!("Encoding to VADPCM...");
    let encoded = revadpcm::encode_from_samples(&samples, sample_rate, options)
        .context("Failed to encode audio")?;

    if let Some(overflows) = encoded.overflows.filter(|&n| n > 0) {
        eprintln!(
            "Warning: {} predictor coefficients overflowed and were clamped",
            overflows
        );
    }

    fs::write(output, &encoded.frames).context("Failed to write output file")?;
    let table_out = output.with_extension("table");
    fs::write(&table_out, &encoded.table).context("Failed to write codebook")?;

    if let Some(l) = &encoded.loop_point {
        let loop_out = output.with_extension("loop.json");
        let json = serde_json::to_string_pretty(l).context("Failed to serialize loop")?;
        fs::write(&loop_out, json).context("Failed to write loop")?;
        println!("  Loop: {}..{} -> {}", l.start, l.end, loop_out.display());
    }

    let ratio = (encoded.sample_count * 2) as f32 / encoded.frames.len().max(1) as f32;

    println!("Done!");
    println!("  Output: {}", output.display());
    println!("  Codebook: {}", table_out.display());
    println!(
        "  Size: {} bytes ({:.1}x compression)",
        encoded.frames.len(),
        ratio
    );

    Ok(())
}

fn train_table(input: &Path, output: &Path, settings: &SettingsArgs) -> Result<()> {
    let (samples, _) = read_audio(input)?;
    let settings = settings.resolve()?;

    println!(
        "Training codebook (order {}, {} predictors)...",
        settings.order,
        settings.predictor_count()
    );
    let trained =
        libvadpcm::calculate_codebook(&samples, &settings).context("Failed to train codebook")?;

    if trained.overflows > 0 {
        eprintln!(
            "Warning: {} predictor coefficients overflowed and were clamped",
            trained.overflows
        );
    }

    fs::write(output, trained.codebook.serialize()).context("Failed to write codebook")?;

    println!("Done!");
    println!("  Output: {}", output.display());
    println!("  Training windows: {}", trained.training_vectors);

    Ok(())
}

fn decode(
    input: &Path,
    table: &Path,
    output: &Path,
    sample_rate: u32,
    options: &DecodeOptions,
) -> Result<()> {
    println!("Reading {}...", input.display());

    let frames = fs::read(input).context("Failed to read frame stream")?;
    let table_text = fs::read_to_string(table).context("Failed to read codebook")?;

    if options.exact {
        println!("Decoding (bit-exact)...");
    } else {
        println!("Decoding...");
    }
    let decoded = revadpcm::decode_to_samples(&frames, &table_text, options)
        .context("Failed to decode frame stream")?;

    if !decoded.unmatched_frames.is_empty() {
        eprintln!(
            "Warning: {} frames fell back to the plain decode",
            decoded.unmatched_frames.len()
        );
    }

    println!("Writing WAV...");
    revadpcm::audio::write_wav(output, &decoded.samples, sample_rate)?;

    println!("Done!");
    println!("  Output: {}", output.display());
    println!("  Samples: {}", decoded.samples.len());

    Ok(())
}

fn info(input: &Path, table: &Path, json: bool) -> Result<()> {
    let frames = fs::read(input).context("Failed to read frame stream")?;
    let table_text = fs::read_to_string(table).context("Failed to read codebook")?;

    if frames.len() % libvadpcm::BYTES_PER_FRAME != 0 {
        bail!(
            "{} is {} bytes, not a whole number of 9-byte frames",
            input.display(),
            frames.len()
        );
    }
    let info = revadpcm::get_vadpcm_info(&frames, &table_text)?;

    if json {
        let json_str =
            serde_json::to_string_pretty(&info).context("Failed to serialize info")?;
        println!("{}", json_str);
        return Ok(());
    }

    println!("VADPCM Stream");
    println!("───────────────────────────────");
    println!("  Frames:      {}", info.frames);
    println!("  Samples:     {}", info.sample_count);
    println!("  Order:       {}", info.order);
    println!("  Predictors:  {}", info.predictors);
    println!("  File size:   {} bytes", info.file_size);
    println!("  Compression: {:.1}x", info.compression_ratio);

    println!();
    println!("Scales");
    println!("───────────────────────────────");
    for (scale, &count) in info.scale_histogram.iter().enumerate() {
        if count > 0 {
            println!("  {:>2}: {}", scale, count);
        }
    }

    println!();
    println!("Predictors");
    println!("───────────────────────────────");
    for (index, &count) in info.predictor_histogram.iter().enumerate() {
        println!("  {:>2}: {}", index, count);
    }

    Ok(())
}
