//! Model directory layout.
//!
//! A model directory holds an ONNX CTC model plus its token table:
//!
//! ```text
//! models/
//!   model.int8.onnx   (or model.onnx)
//!   tokens.txt
//! ```

use std::path::{Path, PathBuf};

use crate::error::{Result, SttError};

/// Resolved paths for one recognition model.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_path: PathBuf,
    pub tokens_path: PathBuf,
    /// Intra-op thread count for the ONNX session.
    pub num_threads: usize,
}

impl ModelConfig {
    /// Locate the model files in a directory.
    ///
    /// The quantized `model.int8.onnx` is preferred when both variants
    /// are present. `tokens.txt` is required.
    pub fn from_directory<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(SttError::config(format!(
                "Model directory does not exist: {}",
                dir.display()
            )));
        }

        let model_path = ["model.int8.onnx", "model.onnx"]
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
            .ok_or_else(|| {
                SttError::config(format!(
                    "No model.int8.onnx or model.onnx in {}",
                    dir.display()
                ))
            })?;

        let tokens_path = dir.join("tokens.txt");
        if !tokens_path.exists() {
            return Err(SttError::config(format!(
                "Tokens file not found: {}",
                tokens_path.display()
            )));
        }

        Ok(Self {
            model_path,
            tokens_path,
            num_threads: 4,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_directory_is_config_error() {
        let result = ModelConfig::from_directory("/nonexistent/models");
        assert!(matches!(result, Err(SttError::Config(_))));
    }

    #[test]
    fn test_missing_model_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tokens.txt"), "<blk> 0\n").unwrap();
        let result = ModelConfig::from_directory(dir.path());
        assert!(matches!(result, Err(SttError::Config(_))));
    }

    #[test]
    fn test_missing_tokens_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("model.onnx"), b"").unwrap();
        let result = ModelConfig::from_directory(dir.path());
        assert!(matches!(result, Err(SttError::Config(_))));
    }

    #[test]
    fn test_finds_fp32_model() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("model.onnx"), b"").unwrap();
        fs::write(dir.path().join("tokens.txt"), "<blk> 0\n").unwrap();

        let config = ModelConfig::from_directory(dir.path()).unwrap();
        assert_eq!(config.model_path.file_name().unwrap(), "model.onnx");
        assert!(config.tokens_path.ends_with("tokens.txt"));
    }

    #[test]
    fn test_prefers_quantized_model() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("model.onnx"), b"").unwrap();
        fs::write(dir.path().join("model.int8.onnx"), b"").unwrap();
        fs::write(dir.path().join("tokens.txt"), "<blk> 0\n").unwrap();

        let config = ModelConfig::from_directory(dir.path()).unwrap();
        assert_eq!(config.model_path.file_name().unwrap(), "model.int8.onnx");
    }
}
