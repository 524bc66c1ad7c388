//! Log-mel feature extraction for NeMo-style CTC models.
//!
//! 25 ms Povey windows at a 10 ms hop, 512-point FFT, mel filterbank,
//! natural log, then per-feature mean/variance normalization over the
//! utterance. Matches the preprocessor the models were exported with.

use ndarray::Array2;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Sample rate the acoustic models expect.
pub const MODEL_SAMPLE_RATE: u32 = 16000;

const PREEMPHASIS: f32 = 0.97;
const LOG_OFFSET: f32 = 1e-10;

#[derive(Debug, Clone)]
pub struct FeatureConfig {
    pub sample_rate: usize,
    pub n_mels: usize,
    /// Analysis window length in samples (25 ms).
    pub win_length: usize,
    /// Frame step in samples (10 ms).
    pub hop_length: usize,
    pub n_fft: usize,
    pub f_min: f32,
    pub f_max: f32,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            sample_rate: MODEL_SAMPLE_RATE as usize,
            n_mels: 128,
            win_length: 400,
            hop_length: 160,
            n_fft: 512,
            f_min: 0.0,
            f_max: 8000.0,
        }
    }
}

pub struct FeatureExtractor {
    config: FeatureConfig,
    mel_filters: Array2<f32>,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        let mel_filters = create_mel_filterbank(&config);
        let window = povey_window(config.win_length);
        let fft = FftPlanner::new().plan_fft_forward(config.n_fft);
        Self {
            config,
            mel_filters,
            window,
            fft,
        }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Extract normalized log-mel features, one row per frame.
    ///
    /// Input shorter than one analysis window yields zero frames.
    pub fn extract(&self, samples: &[f32]) -> Array2<f32> {
        if samples.len() < self.config.win_length {
            return Array2::zeros((0, self.config.n_mels));
        }

        let preemphasized = apply_preemphasis(samples, PREEMPHASIS);
        let stft = self.compute_stft(&preemphasized);
        let power = stft.mapv(|c| c.re * c.re + c.im * c.im);
        let mel = power.dot(&self.mel_filters.t());
        let log_mel = mel.mapv(|x| (x + LOG_OFFSET).ln());
        normalize_per_feature(log_mel)
    }

    fn compute_stft(&self, samples: &[f32]) -> Array2<Complex<f32>> {
        let win_length = self.config.win_length;
        let hop_length = self.config.hop_length;
        let n_fft = self.config.n_fft;
        let n_bins = n_fft / 2 + 1;
        let num_frames = (samples.len() - win_length) / hop_length + 1;

        let mut stft = Array2::zeros((num_frames, n_bins));
        let mut buffer = vec![Complex::default(); n_fft];

        for frame_idx in 0..num_frames {
            let frame_start = frame_idx * hop_length;
            buffer.fill(Complex::default());
            for i in 0..win_length {
                buffer[i] = Complex::new(samples[frame_start + i] * self.window[i], 0.0);
            }
            self.fft.process(&mut buffer);
            for (bin_idx, value) in buffer.iter().take(n_bins).enumerate() {
                stft[[frame_idx, bin_idx]] = *value;
            }
        }

        stft
    }
}

fn apply_preemphasis(samples: &[f32], coeff: f32) -> Vec<f32> {
    let mut out = Vec::with_capacity(samples.len());
    out.push(samples[0]);
    for i in 1..samples.len() {
        out.push(samples[i] - coeff * samples[i - 1]);
    }
    out
}

/// Kaldi-style Povey window, the Hann window raised to 0.85.
fn povey_window(length: usize) -> Vec<f32> {
    (0..length)
        .map(|n| {
            let hann = 0.5 - 0.5 * (2.0 * PI * n as f32 / (length - 1) as f32).cos();
            hann.powf(0.85)
        })
        .collect()
}

pub fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

pub fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10f32.powf(mel / 2595.0) - 1.0)
}

/// Triangular mel filters, (n_mels, n_fft/2 + 1).
fn create_mel_filterbank(config: &FeatureConfig) -> Array2<f32> {
    let n_bins = config.n_fft / 2 + 1;
    let mel_min = hz_to_mel(config.f_min);
    let mel_max = hz_to_mel(config.f_max);

    let n_points = config.n_mels + 2;
    let hz_points: Vec<f32> = (0..n_points)
        .map(|i| {
            let mel = mel_min + (mel_max - mel_min) * i as f32 / (n_points - 1) as f32;
            mel_to_hz(mel)
        })
        .collect();

    let mut filterbank = Array2::zeros((config.n_mels, n_bins));
    for m in 0..config.n_mels {
        let left = hz_points[m];
        let center = hz_points[m + 1];
        let right = hz_points[m + 2];

        for k in 0..n_bins {
            let freq = k as f32 * config.sample_rate as f32 / config.n_fft as f32;
            let weight = if freq >= left && freq <= center && center > left {
                (freq - left) / (center - left)
            } else if freq > center && freq <= right && right > center {
                (right - freq) / (right - center)
            } else {
                0.0
            };
            filterbank[[m, k]] = weight;
        }
    }

    filterbank
}

/// Normalize each mel bin to zero mean and unit variance across the
/// utterance. Bins with no variance are only mean-shifted.
fn normalize_per_feature(mut features: Array2<f32>) -> Array2<f32> {
    let num_frames = features.nrows();
    if num_frames == 0 {
        return features;
    }

    for col in 0..features.ncols() {
        let mut sum = 0.0f32;
        for row in 0..num_frames {
            sum += features[[row, col]];
        }
        let mean = sum / num_frames as f32;

        let mut var_sum = 0.0f32;
        for row in 0..num_frames {
            let diff = features[[row, col]] - mean;
            var_sum += diff * diff;
        }
        let std = (var_sum / num_frames as f32).sqrt();

        if std > 1e-8 {
            for row in 0..num_frames {
                features[[row, col]] = (features[[row, col]] - mean) / std;
            }
        } else {
            for row in 0..num_frames {
                features[[row, col]] -= mean;
            }
        }
    }

    features
}
