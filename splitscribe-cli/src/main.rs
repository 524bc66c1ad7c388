//! splitscribe: transcribe an audio file by splitting it on silence.
//!
//! The transcript goes to stdout; everything else (progress, warnings,
//! errors) goes to stderr.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use tracing::{info, Level};

use splitscribe_cli::paths;
use splitscribe_cli::transcriber;
use splitscribe_silence::SilenceConfig;
use splitscribe_stt::CtcEngine;

#[derive(Parser, Debug)]
#[command(
    name = "splitscribe",
    version,
    about = "Transcribe an audio file by splitting it on silence"
)]
struct Cli {
    /// Audio file to transcribe (wav, mp3, flac or ogg)
    audio_file: PathBuf,

    /// Directory holding model.onnx (or model.int8.onnx) and tokens.txt
    #[arg(long, value_name = "DIR")]
    model_dir: Option<PathBuf>,

    /// Minimum quiet run that counts as a split point, in milliseconds
    #[arg(long, default_value_t = 500)]
    min_silence_ms: u64,

    /// How far below the clip's overall loudness a window must fall to
    /// count as silence, in dB
    #[arg(long, default_value_t = 14.0)]
    silence_offset_db: f32,

    /// Silence kept at both ends of every chunk, in milliseconds
    #[arg(long, default_value_t = 500)]
    keep_silence_ms: u64,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not usage errors
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            process::exit(code);
        }
    };

    let max_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(transcript) => println!("{}", transcript),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<String> {
    if !cli.audio_file.exists() {
        anyhow::bail!("audio file '{}' not found", cli.audio_file.display());
    }

    let model_dir = match &cli.model_dir {
        Some(dir) => dir.clone(),
        None => paths::default_model_dir()?,
    };
    info!("Model directory: {}", model_dir.display());

    let config = SilenceConfig::default()
        .with_min_silence(cli.min_silence_ms)
        .with_threshold_offset(cli.silence_offset_db)
        .with_keep_silence(cli.keep_silence_ms);

    let mut engine = CtcEngine::from_directory(&model_dir)
        .context("failed to load speech recognition model")?;

    transcriber::transcribe_file(&cli.audio_file, &config, &mut engine)
}
