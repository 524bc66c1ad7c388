//! Silence-split transcription pipeline.
//!
//! Load the input, split it on silence, write each chunk to a scratch
//! WAV file, recognize the chunks strictly in order, and assemble the
//! sentence-cased texts into one transcript.

use std::path::Path;

use anyhow::{Context, Result};
use tempfile::TempDir;
use tracing::{debug, info, warn};

use splitscribe_audio::{load_audio, write_wav};
use splitscribe_silence::{split_on_silence, SilenceConfig};

use crate::format::sentence_case;

/// Speech recognition backend for one chunk file.
pub trait Recognizer {
    fn recognize_file(&mut self, path: &Path) -> Result<String>;
}

impl Recognizer for splitscribe_stt::CtcEngine {
    fn recognize_file(&mut self, path: &Path) -> Result<String> {
        Ok(self.transcribe_file(path)?)
    }
}

/// Transcribe one audio file.
///
/// Chunks are processed sequentially; a chunk that fails to recognize
/// is logged and skipped, and the rest of the file still goes through.
/// The scratch directory holding chunk WAVs is removed before this
/// returns, on every path. The transcript carries no leading or
/// trailing whitespace.
pub fn transcribe_file(
    input: &Path,
    config: &SilenceConfig,
    recognizer: &mut dyn Recognizer,
) -> Result<String> {
    let clip = load_audio(input).with_context(|| format!("failed to load '{}'", input.display()))?;
    info!(
        "Loaded {} ms of audio at {} Hz",
        clip.duration_ms(),
        clip.sample_rate
    );

    let chunks = split_on_silence(&clip, config)?;
    info!("Split into {} chunk(s)", chunks.len());

    let chunk_dir = TempDir::new().context("failed to create chunk directory")?;
    let mut transcript = String::new();

    for (index, chunk) in chunks.iter().enumerate() {
        let chunk_name = format!("chunk{}.wav", index + 1);
        let chunk_path = chunk_dir.path().join(&chunk_name);
        write_wav(&chunk_path, chunk)
            .with_context(|| format!("failed to write '{}'", chunk_path.display()))?;
        debug!("Wrote {} ({} ms)", chunk_name, chunk.duration_ms());

        match recognizer.recognize_file(&chunk_path) {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    debug!("{} recognized as empty, skipping", chunk_name);
                    continue;
                }
                transcript.push_str(&sentence_case(text));
                transcript.push_str(". ");
            }
            Err(e) => {
                warn!("Recognition failed for {}: {:#}", chunk_name, e);
            }
        }
    }

    Ok(transcript.trim().to_string())
}
