//! Speech recognition for splitscribe.
//!
//! Runs CTC models exported from NVIDIA NeMo (Parakeet, Citrinet and
//! friends) through ONNX Runtime. A model directory holds the ONNX
//! graph and its `tokens.txt`; [`CtcEngine`] owns the session, the
//! feature extractor and the token table.
//!
//! ```no_run
//! use splitscribe_stt::CtcEngine;
//!
//! let mut engine = CtcEngine::from_directory("models")?;
//! let text = engine.transcribe_file("clip.wav")?;
//! # Ok::<(), splitscribe_stt::SttError>(())
//! ```

pub mod engine;
pub mod error;
pub mod features;
pub mod model;
pub mod tokens;

pub use engine::CtcEngine;
pub use error::{Result, SttError};
pub use features::{FeatureConfig, FeatureExtractor, MODEL_SAMPLE_RATE};
pub use model::ModelConfig;
pub use tokens::TokenDecoder;
