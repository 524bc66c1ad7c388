//! RMS silence detection and chunking for splitscribe.
//!
//! Slides a window over a clip, marks windows whose RMS falls a
//! configured number of dB below the clip's overall loudness, merges the
//! hits into silent ranges, and slices the clip into speech chunks at
//! those ranges.
//!
//! # Example
//!
//! ```
//! use splitscribe_audio::AudioClip;
//! use splitscribe_silence::{split_on_silence, SilenceConfig};
//!
//! let clip = AudioClip::new(vec![0.0; 16000], 16000);
//! let chunks = split_on_silence(&clip, &SilenceConfig::default()).unwrap();
//! assert!(chunks.is_empty()); // digital silence yields no chunks
//! ```

pub mod error;

pub use error::{Result, SilenceError};

use splitscribe_audio::AudioClip;
use tracing::debug;

/// Tuning for silence detection. All durations are milliseconds.
#[derive(Debug, Clone)]
pub struct SilenceConfig {
    /// Minimum run of quiet audio that counts as a silence.
    pub min_silence_ms: u64,
    /// How far below the clip's overall RMS (in dB) a window must fall
    /// to be quiet.
    pub threshold_offset_db: f32,
    /// Silence retained at both ends of every chunk.
    pub keep_silence_ms: u64,
    /// Window scan stride.
    pub seek_step_ms: u64,
}

impl Default for SilenceConfig {
    fn default() -> Self {
        Self {
            min_silence_ms: 500,
            threshold_offset_db: 14.0,
            keep_silence_ms: 500,
            seek_step_ms: 1,
        }
    }
}

impl SilenceConfig {
    pub fn with_min_silence(mut self, ms: u64) -> Self {
        self.min_silence_ms = ms;
        self
    }

    pub fn with_threshold_offset(mut self, db: f32) -> Self {
        self.threshold_offset_db = db;
        self
    }

    pub fn with_keep_silence(mut self, ms: u64) -> Self {
        self.keep_silence_ms = ms;
        self
    }

    pub fn with_seek_step(mut self, ms: u64) -> Self {
        self.seek_step_ms = ms;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_silence_ms == 0 {
            return Err(SilenceError::config("min_silence_ms must be at least 1"));
        }
        if self.seek_step_ms == 0 {
            return Err(SilenceError::config("seek_step_ms must be at least 1"));
        }
        if !self.threshold_offset_db.is_finite() {
            return Err(SilenceError::config("threshold_offset_db must be finite"));
        }
        if self.threshold_offset_db < 0.0 {
            return Err(SilenceError::config(
                "threshold_offset_db must not be negative",
            ));
        }
        Ok(())
    }
}

/// Prefix sums of squared samples, for O(1) window RMS queries.
struct EnergyProfile<'a> {
    clip: &'a AudioClip,
    prefix_sq: Vec<f64>,
}

impl<'a> EnergyProfile<'a> {
    fn new(clip: &'a AudioClip) -> Self {
        let mut prefix_sq = Vec::with_capacity(clip.len_samples() + 1);
        let mut sum = 0.0f64;
        prefix_sq.push(sum);
        for &s in &clip.samples {
            sum += s as f64 * s as f64;
            prefix_sq.push(sum);
        }
        Self { clip, prefix_sq }
    }

    /// RMS of the samples between two millisecond offsets. 0.0 for an
    /// empty window.
    fn window_rms(&self, start_ms: u64, end_ms: u64) -> f32 {
        let start = self.clip.ms_to_sample(start_ms);
        let end = self.clip.ms_to_sample(end_ms);
        if end <= start {
            return 0.0;
        }
        let sum_sq = self.prefix_sq[end] - self.prefix_sq[start];
        (sum_sq / (end - start) as f64).sqrt() as f32
    }
}

/// Linear amplitude threshold: the clip's overall RMS attenuated by the
/// configured dB offset. A digitally silent clip gets a threshold of
/// zero, so every window in it still counts as silent.
fn silence_threshold(clip: &AudioClip, config: &SilenceConfig) -> f32 {
    clip.rms() * 10f32.powf(-config.threshold_offset_db / 20.0)
}

/// Find silent ranges as `(start_ms, end_ms)` pairs, in order.
///
/// A clip shorter than `min_silence_ms` has no silent ranges. Ranges
/// never overlap and never extend past the clip.
pub fn detect_silence(clip: &AudioClip, config: &SilenceConfig) -> Result<Vec<(u64, u64)>> {
    config.validate()?;

    let len_ms = clip.duration_ms();
    if len_ms < config.min_silence_ms {
        return Ok(Vec::new());
    }

    let profile = EnergyProfile::new(clip);
    let threshold = silence_threshold(clip, config);
    debug!(
        "Scanning {} ms, window {} ms, threshold {:.6}",
        len_ms, config.min_silence_ms, threshold
    );

    let last_start = len_ms - config.min_silence_ms;
    let mut window_starts: Vec<u64> = (0..=last_start)
        .step_by(config.seek_step_ms as usize)
        .collect();
    // The stride may overshoot the final window; scan it anyway
    if window_starts.last() != Some(&last_start) {
        window_starts.push(last_start);
    }

    let mut silent_starts = Vec::new();
    for &start in &window_starts {
        if profile.window_rms(start, start + config.min_silence_ms) <= threshold {
            silent_starts.push(start);
        }
    }

    let mut iter = silent_starts.into_iter();
    let first = match iter.next() {
        Some(first) => first,
        None => return Ok(Vec::new()),
    };

    // Merge window starts into ranges. A new range begins only at a
    // non-contiguous start whose gap exceeds the window length.
    let mut ranges = Vec::new();
    let mut range_start = first;
    let mut prev = first;
    for start in iter {
        let continuous = start == prev + config.seek_step_ms;
        let has_gap = start > prev + config.min_silence_ms;
        if !continuous && has_gap {
            ranges.push((range_start, prev + config.min_silence_ms));
            range_start = start;
        }
        prev = start;
    }
    ranges.push((range_start, prev + config.min_silence_ms));

    Ok(ranges)
}

/// Complement of [`detect_silence`]: the non-silent ranges, in order.
///
/// A clip with no silence is one range covering everything; a clip that
/// is one big silence has none.
pub fn detect_nonsilent(clip: &AudioClip, config: &SilenceConfig) -> Result<Vec<(u64, u64)>> {
    let silent = detect_silence(clip, config)?;
    let len_ms = clip.duration_ms();

    if silent.is_empty() {
        return Ok(vec![(0, len_ms)]);
    }
    if silent[0] == (0, len_ms) {
        return Ok(Vec::new());
    }

    let mut ranges = Vec::new();
    let mut prev_end = 0;
    for &(start, end) in &silent {
        ranges.push((prev_end, start));
        prev_end = end;
    }
    if prev_end != len_ms {
        ranges.push((prev_end, len_ms));
    }
    if ranges.first() == Some(&(0, 0)) {
        ranges.remove(0);
    }

    Ok(ranges)
}

/// Split a clip into speech chunks at its silent ranges.
///
/// Each chunk is padded with up to `keep_silence_ms` of the surrounding
/// silence. Neighboring chunks whose padding would overlap meet at the
/// midpoint instead, so chunks never share samples and concatenating
/// them preserves playback order.
pub fn split_on_silence(clip: &AudioClip, config: &SilenceConfig) -> Result<Vec<AudioClip>> {
    let nonsilent = detect_nonsilent(clip, config)?;
    let len_ms = clip.duration_ms() as i64;
    let keep = config.keep_silence_ms as i64;

    let mut padded: Vec<(i64, i64)> = nonsilent
        .iter()
        .map(|&(start, end)| (start as i64 - keep, end as i64 + keep))
        .collect();

    for i in 1..padded.len() {
        let last_end = padded[i - 1].1;
        let next_start = padded[i].0;
        if next_start < last_end {
            let midpoint = (last_end + next_start).div_euclid(2);
            padded[i - 1].1 = midpoint;
            padded[i].0 = midpoint;
        }
    }

    let chunks: Vec<AudioClip> = padded
        .iter()
        .map(|&(start, end)| {
            let start = start.max(0) as u64;
            let end = end.clamp(0, len_ms) as u64;
            clip.slice_ms(start, end)
        })
        .collect();

    debug!("Split into {} chunk(s)", chunks.len());
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const RATE: u32 = 1000; // one sample per millisecond

    /// Alternating +amp/-amp samples, RMS exactly `amp`.
    fn tone_ms(ms: u64, amp: f32) -> Vec<f32> {
        (0..ms)
            .map(|i| if i % 2 == 0 { amp } else { -amp })
            .collect()
    }

    fn silence_ms(ms: u64) -> Vec<f32> {
        vec![0.0; ms as usize]
    }

    fn clip_of(parts: &[Vec<f32>]) -> AudioClip {
        let samples: Vec<f32> = parts.iter().flatten().copied().collect();
        AudioClip::new(samples, RATE)
    }

    fn config_100ms() -> SilenceConfig {
        SilenceConfig::default()
            .with_min_silence(100)
            .with_keep_silence(0)
    }

    #[test]
    fn test_config_validation() {
        assert!(SilenceConfig::default().validate().is_ok());
        assert!(SilenceConfig::default()
            .with_min_silence(0)
            .validate()
            .is_err());
        assert!(SilenceConfig::default()
            .with_seek_step(0)
            .validate()
            .is_err());
        assert!(SilenceConfig::default()
            .with_threshold_offset(-3.0)
            .validate()
            .is_err());
        assert!(SilenceConfig::default()
            .with_threshold_offset(f32::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = SilenceConfig::default()
            .with_min_silence(250)
            .with_threshold_offset(20.0)
            .with_keep_silence(100)
            .with_seek_step(5);
        assert_eq!(config.min_silence_ms, 250);
        assert_eq!(config.threshold_offset_db, 20.0);
        assert_eq!(config.keep_silence_ms, 100);
        assert_eq!(config.seek_step_ms, 5);
    }

    #[test]
    fn test_invalid_config_rejected_by_detect() {
        let clip = clip_of(&[tone_ms(500, 1.0)]);
        let config = SilenceConfig::default().with_min_silence(0);
        assert!(detect_silence(&clip, &config).is_err());
        assert!(split_on_silence(&clip, &config).is_err());
    }

    #[test]
    fn test_silence_threshold_attenuates_clip_rms() {
        // Alternating +/-0.5 has RMS exactly 0.5.
        let clip = clip_of(&[tone_ms(1000, 0.5)]);

        // 20 dB down is a factor of 10, 6.0206 dB a factor of 2
        let t20 = silence_threshold(&clip, &SilenceConfig::default().with_threshold_offset(20.0));
        assert_abs_diff_eq!(t20, 0.05, epsilon = 1e-6);
        let t6 = silence_threshold(&clip, &SilenceConfig::default().with_threshold_offset(6.0206));
        assert_abs_diff_eq!(t6, 0.25, epsilon = 1e-5);

        // Zero offset leaves the threshold at the clip RMS itself
        let t0 = silence_threshold(&clip, &SilenceConfig::default().with_threshold_offset(0.0));
        assert_abs_diff_eq!(t0, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_silence_threshold_zero_for_digital_silence() {
        let clip = clip_of(&[silence_ms(500)]);
        assert_eq!(silence_threshold(&clip, &SilenceConfig::default()), 0.0);
    }

    #[test]
    fn test_window_rms_matches_closed_form() {
        // 100 ms of +/-0.6 tone followed by 100 ms of digital silence.
        let clip = clip_of(&[tone_ms(100, 0.6), silence_ms(100)]);
        let profile = EnergyProfile::new(&clip);

        assert_abs_diff_eq!(profile.window_rms(0, 100), 0.6, epsilon = 1e-6);
        assert_abs_diff_eq!(profile.window_rms(100, 200), 0.0, epsilon = 1e-6);
        // Half tone, half silence: RMS drops by sqrt(2)
        assert_abs_diff_eq!(
            profile.window_rms(50, 150),
            0.6 / 2f32.sqrt(),
            epsilon = 1e-6
        );
        // Inverted window has no samples
        assert_eq!(profile.window_rms(150, 150), 0.0);
    }

    #[test]
    fn test_detect_silence_exact_range() {
        // 100 ms tone, 900 ms silence, 100 ms tone. Threshold is low
        // enough that a window touching even one tone sample is loud.
        let clip = clip_of(&[tone_ms(100, 1.0), silence_ms(900), tone_ms(100, 1.0)]);
        let silent = detect_silence(&clip, &config_100ms()).unwrap();
        assert_eq!(silent, vec![(100, 1000)]);
    }

    #[test]
    fn test_detect_silence_shorter_than_window() {
        let clip = clip_of(&[tone_ms(300, 1.0)]);
        let config = SilenceConfig::default().with_min_silence(500);
        let silent = detect_silence(&clip, &config).unwrap();
        assert!(silent.is_empty());
    }

    #[test]
    fn test_detect_silence_none_in_uniform_tone() {
        let clip = clip_of(&[tone_ms(2000, 0.5)]);
        let silent = detect_silence(&clip, &config_100ms()).unwrap();
        assert!(silent.is_empty());
    }

    #[test]
    fn test_detect_silence_whole_clip_when_digitally_silent() {
        let clip = clip_of(&[silence_ms(2000)]);
        let config = SilenceConfig::default().with_min_silence(500);
        let silent = detect_silence(&clip, &config).unwrap();
        assert_eq!(silent, vec![(0, 2000)]);
    }

    #[test]
    fn test_detect_silence_separate_ranges() {
        // Tolerance here allows one stray tone sample per window, so
        // ranges reach 1 ms into the tones on each side.
        let clip = clip_of(&[
            tone_ms(100, 1.0),
            silence_ms(300),
            tone_ms(100, 1.0),
            silence_ms(300),
            tone_ms(100, 1.0),
        ]);
        let silent = detect_silence(&clip, &config_100ms()).unwrap();
        assert_eq!(silent, vec![(99, 401), (499, 801)]);
    }

    #[test]
    fn test_detect_silence_with_stride_scans_final_window() {
        let clip = clip_of(&[tone_ms(100, 1.0), silence_ms(900), tone_ms(100, 1.0)]);
        let config = config_100ms().with_seek_step(7);
        let silent = detect_silence(&clip, &config).unwrap();
        // Window starts are multiples of 7 plus the forced final start
        // at 1000; silent ones run from 105 through 896.
        assert_eq!(silent, vec![(105, 996)]);
    }

    #[test]
    fn test_detect_nonsilent_complement() {
        let clip = clip_of(&[tone_ms(100, 1.0), silence_ms(900), tone_ms(100, 1.0)]);
        let ranges = detect_nonsilent(&clip, &config_100ms()).unwrap();
        assert_eq!(ranges, vec![(0, 100), (1000, 1100)]);
    }

    #[test]
    fn test_detect_nonsilent_covers_clip_without_silence() {
        let clip = clip_of(&[tone_ms(800, 0.5)]);
        let ranges = detect_nonsilent(&clip, &config_100ms()).unwrap();
        assert_eq!(ranges, vec![(0, 800)]);
    }

    #[test]
    fn test_detect_nonsilent_empty_for_all_silent_clip() {
        let clip = clip_of(&[silence_ms(1500)]);
        let ranges = detect_nonsilent(&clip, &config_100ms()).unwrap();
        assert!(ranges.is_empty());
    }

    #[test]
    fn test_detect_nonsilent_drops_leading_empty_range() {
        // Clip starts silent, so the first candidate range is (0, 0).
        let clip = clip_of(&[silence_ms(300), tone_ms(100, 1.0)]);
        let ranges = detect_nonsilent(&clip, &config_100ms()).unwrap();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].1, 400);
        assert!(ranges[0].0 > 0);
    }

    #[test]
    fn test_split_all_silent_yields_no_chunks() {
        let clip = clip_of(&[silence_ms(2000)]);
        let config = SilenceConfig::default().with_min_silence(500);
        let chunks = split_on_silence(&clip, &config).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_split_uniform_tone_is_single_chunk() {
        let clip = clip_of(&[tone_ms(2000, 0.5)]);
        let config = SilenceConfig::default().with_min_silence(500);
        let chunks = split_on_silence(&clip, &config).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len_samples(), clip.len_samples());
    }

    #[test]
    fn test_split_short_clip_is_single_chunk() {
        let clip = clip_of(&[tone_ms(300, 1.0)]);
        let config = SilenceConfig::default().with_min_silence(500);
        let chunks = split_on_silence(&clip, &config).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len_samples(), 300);
    }

    #[test]
    fn test_split_empty_clip_is_single_empty_chunk() {
        let clip = AudioClip::empty(RATE);
        let chunks = split_on_silence(&clip, &SilenceConfig::default()).unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_empty());
    }

    #[test]
    fn test_split_keeps_silence_padding() {
        let clip = clip_of(&[tone_ms(100, 1.0), silence_ms(900), tone_ms(100, 1.0)]);
        let config = config_100ms().with_keep_silence(50);
        let chunks = split_on_silence(&clip, &config).unwrap();
        assert_eq!(chunks.len(), 2);
        // (0, 100) and (1000, 1100), each padded by 50 ms and clamped
        assert_eq!(chunks[0].len_samples(), 150);
        assert_eq!(chunks[1].len_samples(), 150);
    }

    #[test]
    fn test_split_overlapping_padding_meets_at_midpoint() {
        let clip = clip_of(&[tone_ms(100, 1.0), silence_ms(900), tone_ms(100, 1.0)]);
        let config = config_100ms().with_keep_silence(500);
        let chunks = split_on_silence(&clip, &config).unwrap();
        assert_eq!(chunks.len(), 2);
        // Padded ranges (-500, 600) and (500, 1600) meet at 550
        assert_eq!(chunks[0].len_samples(), 550);
        assert_eq!(chunks[1].len_samples(), 550);
    }

    #[test]
    fn test_split_chunks_preserve_order_and_content() {
        let clip = clip_of(&[
            tone_ms(100, 1.0),
            silence_ms(300),
            tone_ms(100, 0.8),
            silence_ms(300),
            tone_ms(100, 0.6),
        ]);
        let chunks = split_on_silence(&clip, &config_100ms()).unwrap();
        assert_eq!(chunks.len(), 3);
        // Each chunk starts inside its own tone
        assert_eq!(chunks[0].samples[0], 1.0);
        assert!(chunks[1].samples.iter().any(|&s| s == 0.8));
        assert!(chunks[2].samples.iter().any(|&s| s == 0.6));
    }

    #[test]
    fn test_split_chunks_never_overlap() {
        let clip = clip_of(&[
            tone_ms(200, 1.0),
            silence_ms(400),
            tone_ms(200, 1.0),
            silence_ms(400),
            tone_ms(200, 1.0),
        ]);
        let config = config_100ms().with_keep_silence(500);
        let chunks = split_on_silence(&clip, &config).unwrap();
        let total: usize = chunks.iter().map(|c| c.len_samples()).sum();
        assert!(
            total <= clip.len_samples(),
            "chunks must not share samples: {} > {}",
            total,
            clip.len_samples()
        );
    }
}
