//! Mono audio clip primitive shared across the pipeline.

/// A mono audio clip: f32 samples in [-1.0, 1.0] at a known sample rate.
///
/// All millisecond arithmetic uses `ms * sample_rate / 1000`, truncating.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Clip with no samples at the given rate.
    pub fn empty(sample_rate: u32) -> Self {
        Self::new(Vec::new(), sample_rate)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len_samples(&self) -> usize {
        self.samples.len()
    }

    /// Duration in whole milliseconds (truncated).
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / self.sample_rate as u64
    }

    /// Sample index for a millisecond offset, clamped to the clip length.
    pub fn ms_to_sample(&self, ms: u64) -> usize {
        let index = (ms * self.sample_rate as u64 / 1000) as usize;
        index.min(self.samples.len())
    }

    /// Root mean square amplitude over the whole clip. 0.0 for an empty clip.
    pub fn rms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = self.samples.iter().map(|&s| s as f64 * s as f64).sum();
        (sum_sq / self.samples.len() as f64).sqrt() as f32
    }

    /// Loudness relative to full scale in dB. Negative infinity for silence.
    pub fn dbfs(&self) -> f32 {
        let rms = self.rms();
        if rms <= 0.0 {
            f32::NEG_INFINITY
        } else {
            20.0 * rms.log10()
        }
    }

    /// Copy of the samples between two millisecond offsets.
    ///
    /// Bounds are clamped to the clip. An inverted range yields an empty
    /// clip. An `end_ms` at or past the clip duration includes the final
    /// partial millisecond of samples.
    pub fn slice_ms(&self, start_ms: u64, end_ms: u64) -> AudioClip {
        let start = self.ms_to_sample(start_ms);
        let end = if end_ms >= self.duration_ms() {
            self.samples.len()
        } else {
            self.ms_to_sample(end_ms)
        };
        if end <= start {
            return AudioClip::empty(self.sample_rate);
        }
        AudioClip::new(self.samples[start..end].to_vec(), self.sample_rate)
    }
}
