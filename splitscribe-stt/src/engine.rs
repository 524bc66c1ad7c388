//! CTC recognition engine on ONNX Runtime.
//!
//! One session per model: log-mel features go in as
//! `(batch, features, time)`, per-frame log-probabilities come out, and
//! a greedy argmax over the vocabulary axis feeds the token decoder.

use std::path::Path;

use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::Tensor,
};
use tracing::{debug, info};

use splitscribe_audio::{load_audio, resample};

use crate::error::{Result, SttError};
use crate::features::{FeatureConfig, FeatureExtractor, MODEL_SAMPLE_RATE};
use crate::model::ModelConfig;
use crate::tokens::TokenDecoder;

pub struct CtcEngine {
    session: Session,
    tokens: TokenDecoder,
    extractor: FeatureExtractor,
    config: ModelConfig,
}

impl CtcEngine {
    pub fn from_directory<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::from_config(ModelConfig::from_directory(dir)?)
    }

    pub fn from_config(config: ModelConfig) -> Result<Self> {
        info!("Loading CTC model: {}", config.model_path.display());

        let session = Session::builder()
            .map_err(|e| SttError::model_load(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| SttError::model_load(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(config.num_threads)
            .map_err(|e| SttError::model_load(format!("Failed to set thread count: {}", e)))?
            .commit_from_file(&config.model_path)
            .map_err(|e| SttError::model_load(format!("Failed to load model: {}", e)))?;

        let tokens = TokenDecoder::from_file(&config.tokens_path)?;
        info!(
            "Loaded {} tokens (blank_id={})",
            tokens.vocab_size(),
            tokens.blank_id()
        );

        let extractor = FeatureExtractor::new(FeatureConfig::default());

        Ok(Self {
            session,
            tokens,
            extractor,
            config,
        })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Transcribe an audio file. Any format splitscribe-audio decodes;
    /// resampled to 16 kHz before recognition.
    pub fn transcribe_file<P: AsRef<Path>>(&mut self, path: P) -> Result<String> {
        let clip = load_audio(path.as_ref())?;
        let clip = resample(&clip, MODEL_SAMPLE_RATE);
        self.transcribe_samples(&clip.samples)
    }

    /// Transcribe mono 16 kHz samples.
    ///
    /// Audio shorter than one analysis window transcribes to the empty
    /// string without touching the model.
    pub fn transcribe_samples(&mut self, samples: &[f32]) -> Result<String> {
        let features = self.extractor.extract(samples);
        let num_frames = features.nrows();
        if num_frames == 0 {
            debug!("Audio shorter than one analysis window, nothing to recognize");
            return Ok(String::new());
        }
        let n_mels = features.ncols();

        // (batch, features, time) layout
        let mut audio_data = Vec::with_capacity(n_mels * num_frames);
        for col in 0..n_mels {
            for row in features.outer_iter() {
                audio_data.push(row[col]);
            }
        }

        let audio_signal = Tensor::from_array((
            vec![1usize, n_mels, num_frames],
            audio_data.into_boxed_slice(),
        ))
        .map_err(|e| SttError::inference(format!("Failed to create audio tensor: {}", e)))?;

        let length = Tensor::from_array((vec![1usize], vec![num_frames as i64].into_boxed_slice()))
            .map_err(|e| SttError::inference(format!("Failed to create length tensor: {}", e)))?;

        let outputs = self
            .session
            .run(ort::inputs!["audio_signal" => audio_signal, "length" => length])
            .map_err(|e| SttError::inference(format!("Inference failed: {}", e)))?;

        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| SttError::inference(format!("Failed to extract log-probs: {}", e)))?;
        if shape.len() != 3 {
            return Err(SttError::inference(format!(
                "Unexpected log-probs shape: {:?}",
                shape
            )));
        }
        let out_frames = shape[1] as usize;
        let vocab_size = shape[2] as usize;
        debug!("Log-probs: {} frames x {} vocab", out_frames, vocab_size);
        if vocab_size == 0 {
            return Err(SttError::inference("Empty vocabulary axis"));
        }

        let mut ids = Vec::with_capacity(out_frames);
        for frame in 0..out_frames {
            let row = &data[frame * vocab_size..(frame + 1) * vocab_size];
            ids.push(argmax(row, self.tokens.blank_id()));
        }

        Ok(self.tokens.decode(&ids))
    }
}

/// Index of the largest value; `fallback` for an empty slice. NaNs
/// compare equal, so a frame of them resolves to its last index.
fn argmax(values: &[f32], fallback: usize) -> usize {
    values
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(index, _)| index)
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_picks_largest() {
        assert_eq!(argmax(&[0.1, 0.9, 0.3], 0), 1);
        assert_eq!(argmax(&[-5.0, -2.0, -9.0], 0), 1);
        assert_eq!(argmax(&[7.0], 0), 0);
    }

    #[test]
    fn test_argmax_handles_nan() {
        let index = argmax(&[f32::NAN, 1.0, 0.5], 0);
        assert_eq!(index, 1);
    }

    // Needs a real model directory; run with
    //   cargo test -p splitscribe-stt -- --ignored
    #[test]
    #[ignore]
    fn test_transcribe_with_real_model() {
        let model_dir = Path::new("models");
        if !model_dir.exists() {
            return;
        }

        let mut engine = CtcEngine::from_directory(model_dir).unwrap();
        let text = engine.transcribe_samples(&vec![0.0f32; 16000]).unwrap();
        assert!(text.is_empty(), "silence should transcribe to nothing");
    }
}
