//! WAV export.

use std::path::Path;

use crate::clip::AudioClip;
use crate::error::{AudioError, Result};

/// Write a clip as a mono 16-bit PCM WAV file.
///
/// Samples are clamped to [-1.0, 1.0] before quantization.
pub fn write_wav<P: AsRef<Path>>(path: P, clip: &AudioClip) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: clip.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path.as_ref(), spec)
        .map_err(|e| AudioError::encode(format!("Failed to create WAV file: {}", e)))?;

    for &sample in &clip.samples {
        let quantized = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
        writer
            .write_sample(quantized)
            .map_err(|e| AudioError::encode(format!("Failed to write sample: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| AudioError::encode(format!("Failed to finalize WAV file: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_wav_spec() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        write_wav(&path, &AudioClip::new(vec![0.0; 800], 8000)).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 8000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 800);
    }

    #[test]
    fn test_write_wav_clamps_out_of_range_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hot.wav");
        write_wav(&path, &AudioClip::new(vec![2.0, -2.0], 16000)).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![32767, -32767]);
    }

    #[test]
    fn test_write_wav_to_missing_directory_is_error() {
        let result = write_wav(
            "/nonexistent/dir/out.wav",
            &AudioClip::new(vec![0.0], 16000),
        );
        assert!(matches!(result, Err(AudioError::Encode(_))));
    }
}
