//! Default filesystem locations.

use std::path::PathBuf;

use anyhow::Result;
use thiserror::Error;

const APP_NAME: &str = "splitscribe";

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not determine a data directory for this platform")]
    NoDataDirectory,
}

/// Default directory searched for the recognition model:
/// `<data dir>/splitscribe/models`, e.g.
/// `~/.local/share/splitscribe/models` on Linux.
pub fn default_model_dir() -> Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
        .ok_or(PathError::NoDataDirectory)?;
    Ok(base.join(APP_NAME).join("models"))
}
