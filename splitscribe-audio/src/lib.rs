//! Audio primitives for splitscribe.
//!
//! Decodes audio files into mono float clips and writes chunk files back
//! out as WAV:
//!
//! ```text
//! file.{wav,mp3,flac,ogg} --> decode --> AudioClip (mono f32)
//!                                           |
//!                                 resample / slice_ms
//!                                           |
//!                                       write_wav
//! ```
//!
//! Everything downstream (silence detection, recognition) works on
//! [`AudioClip`] values and never touches the codecs directly.

pub mod clip;
pub mod decode;
pub mod error;
pub mod resample;
pub mod wav;

pub use clip::AudioClip;
pub use decode::load_audio;
pub use error::{AudioError, Result};
pub use resample::resample;
pub use wav::write_wav;
