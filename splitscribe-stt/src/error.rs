//! Error types for speech recognition

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SttError>;

#[derive(Error, Debug)]
pub enum SttError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model loading error: {0}")]
    ModelLoad(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Audio error: {0}")]
    Audio(#[from] splitscribe_audio::AudioError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SttError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        SttError::Config(msg.into())
    }

    pub fn model_load<S: Into<String>>(msg: S) -> Self {
        SttError::ModelLoad(msg.into())
    }

    pub fn inference<S: Into<String>>(msg: S) -> Self {
        SttError::Inference(msg.into())
    }
}
