//! Sample rate conversion.

use tracing::debug;

use crate::clip::AudioClip;

/// Resample a clip to `target_rate` with linear interpolation.
///
/// Returns a copy of the clip unchanged when the rates already match.
/// Good enough for speech; offline conversion quality is not a concern
/// here.
pub fn resample(clip: &AudioClip, target_rate: u32) -> AudioClip {
    if clip.sample_rate == target_rate || clip.is_empty() {
        return AudioClip::new(clip.samples.clone(), target_rate);
    }

    debug!(
        "Resampling {} Hz -> {} Hz ({} samples)",
        clip.sample_rate,
        target_rate,
        clip.len_samples()
    );

    let ratio = clip.sample_rate as f64 / target_rate as f64;
    let new_len = (clip.samples.len() as f64 / ratio).ceil() as usize;
    let mut resampled = Vec::with_capacity(new_len);

    for i in 0..new_len {
        let src_pos = i as f64 * ratio;
        let src_idx = src_pos as usize;
        let frac = (src_pos - src_idx as f64) as f32;

        let current = clip.samples[src_idx.min(clip.samples.len() - 1)];
        let next = clip.samples[(src_idx + 1).min(clip.samples.len() - 1)];
        resampled.push(current + (next - current) * frac);
    }

    AudioClip::new(resampled, target_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_resample_identity_when_rates_match() {
        let clip = AudioClip::new(vec![0.1, 0.2, 0.3], 16000);
        let out = resample(&clip, 16000);
        assert_eq!(out, clip);
    }

    #[test]
    fn test_resample_halves_length() {
        let clip = AudioClip::new(vec![0.5; 32000], 32000);
        let out = resample(&clip, 16000);
        assert_eq!(out.sample_rate, 16000);
        assert_eq!(out.len_samples(), 16000);
    }

    #[test]
    fn test_resample_preserves_constant_signal() {
        let clip = AudioClip::new(vec![0.25; 44100], 44100);
        let out = resample(&clip, 16000);
        for &s in &out.samples {
            assert_abs_diff_eq!(s, 0.25, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_resample_upsamples() {
        let clip = AudioClip::new(vec![0.0, 1.0], 8000);
        let out = resample(&clip, 16000);
        assert_eq!(out.sample_rate, 16000);
        assert_eq!(out.len_samples(), 4);
        // Interpolated midpoint between the two source samples
        assert_abs_diff_eq!(out.samples[1], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_resample_empty_clip() {
        let clip = AudioClip::empty(44100);
        let out = resample(&clip, 16000);
        assert!(out.is_empty());
    }
}
