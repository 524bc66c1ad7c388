//! Error types for audio decoding and export

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AudioError>;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio decoding error: {0}")]
    Decode(String),

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Audio encoding error: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AudioError {
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        AudioError::Decode(msg.into())
    }

    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        AudioError::UnsupportedFormat(msg.into())
    }

    pub fn encode<S: Into<String>>(msg: S) -> Self {
        AudioError::Encode(msg.into())
    }
}
