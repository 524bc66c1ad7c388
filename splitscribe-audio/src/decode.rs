//! Audio file decoding.
//!
//! WAV files go through hound. MP3, FLAC and OGG go through symphonia.
//! Every decoded file comes back as a mono [`AudioClip`] at its native
//! sample rate; multi-channel audio is downmixed by averaging channels.

use std::path::Path;

use tracing::debug;

use crate::clip::AudioClip;
use crate::error::{AudioError, Result};

/// Decode an audio file into a mono clip.
///
/// The container is chosen by file extension. Unknown extensions are
/// rejected rather than sniffed.
pub fn load_audio<P: AsRef<Path>>(path: P) -> Result<AudioClip> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| AudioError::decode("Could not determine file extension"))?;

    match extension.to_lowercase().as_str() {
        "wav" => load_wav(path),
        "mp3" | "flac" | "ogg" => load_with_symphonia(path),
        _ => Err(AudioError::unsupported(extension)),
    }
}

fn load_wav(path: &Path) -> Result<AudioClip> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| AudioError::decode(format!("Failed to open WAV file: {}", e)))?;
    let spec = reader.spec();
    debug!(
        "WAV: {} Hz, {} channel(s), {}-bit {:?}",
        spec.sample_rate, spec.channels, spec.bits_per_sample, spec.sample_format
    );

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| AudioError::decode(format!("Failed to read samples: {}", e)))?,
        (hound::SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 2147483648.0))
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| AudioError::decode(format!("Failed to read samples: {}", e)))?,
        (hound::SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| AudioError::decode(format!("Failed to read samples: {}", e)))?,
        (format, bits) => {
            return Err(AudioError::decode(format!(
                "Unsupported bit depth: {}-bit {:?}",
                bits, format
            )))
        }
    };

    let samples = downmix_to_mono(samples, spec.channels as usize);
    Ok(AudioClip::new(samples, spec.sample_rate))
}

fn load_with_symphonia(path: &Path) -> Result<AudioClip> {
    use symphonia::core::audio::SampleBuffer;
    use symphonia::core::codecs::DecoderOptions;
    use symphonia::core::formats::FormatOptions;
    use symphonia::core::io::MediaSourceStream;
    use symphonia::core::meta::MetadataOptions;
    use symphonia::core::probe::Hint;

    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::decode(format!("Failed to probe audio format: {}", e)))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| AudioError::decode("No audio track found"))?;
    let track_id = track.id;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioError::decode("Missing sample rate"))?;
    let channels = track
        .codec_params
        .channels
        .map(|c| c.count())
        .unwrap_or(1);
    debug!("Decoding via symphonia: {} Hz, {} channel(s)", sample_rate, channels);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::decode(format!("Failed to create decoder: {}", e)))?;

    let mut samples = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(AudioError::decode(format!("Failed to read packet: {}", e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                if sample_buf.is_none() {
                    let spec = *decoded.spec();
                    let capacity = decoded.capacity() as u64;
                    sample_buf = Some(SampleBuffer::<f32>::new(capacity, spec));
                }
                if let Some(buf) = &mut sample_buf {
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
            }
            // Skip corrupt packets, keep whatever decodes
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => {
                return Err(AudioError::decode(format!("Failed to decode packet: {}", e)));
            }
        }
    }

    let samples = downmix_to_mono(samples, channels);
    Ok(AudioClip::new(samples, sample_rate))
}

/// Average interleaved channels down to one.
fn downmix_to_mono(samples: Vec<f32>, channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples;
    }
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}
