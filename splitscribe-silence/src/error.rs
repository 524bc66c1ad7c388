//! Error types for silence detection

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SilenceError>;

#[derive(Error, Debug)]
pub enum SilenceError {
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SilenceError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        SilenceError::Config(msg.into())
    }
}
