use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

/// Audio file contents decoded to planar f32 channels in `-1.0..=1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    pub channels: Vec<Vec<f32>>,
}

impl DecodedAudio {
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.channels.first().map_or(0, |channel| channel.len() as u64)
    }
}

#[instrument(fields(path = %path.display()))]
pub fn decode_wav(path: &Path) -> Result<DecodedAudio> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open wav file: {}", path.display()))?;
    let spec = reader.spec();
    let channel_count = usize::from(spec.channels.max(1));
    let mut channels = vec![Vec::new(); channel_count];

    match spec.sample_format {
        hound::SampleFormat::Float => {
            for (index, sample) in reader.samples::<f32>().enumerate() {
                let sample = sample.context("failed to decode float sample")?;
                channels[index % channel_count].push(sample);
            }
        }
        hound::SampleFormat::Int => {
            let scale = (1_u64 << (spec.bits_per_sample - 1)) as f32;
            for (index, sample) in reader.samples::<i32>().enumerate() {
                let sample = sample.context("failed to decode integer sample")?;
                channels[index % channel_count].push(sample as f32 / scale);
            }
        }
    }

    // A truncated final frame leaves channels uneven; pad with silence.
    let frames = channels.iter().map(Vec::len).max().unwrap_or(0);
    for channel in &mut channels {
        channel.resize(frames, 0.0);
    }

    debug!(
        sample_rate = spec.sample_rate,
        channels = channel_count,
        frames,
        "wav decoded"
    );

    Ok(DecodedAudio {
        sample_rate: spec.sample_rate,
        channels,
    })
}

/// Linear-interpolation resample of one channel to a new length.
#[must_use]
pub(crate) fn resample_linear(samples: &[f32], new_len: usize) -> Vec<f32> {
    if samples.is_empty() || new_len == 0 {
        return Vec::new();
    }
    if samples.len() == 1 || new_len == 1 {
        return vec![samples[0]; new_len];
    }

    let step = (samples.len() - 1) as f64 / (new_len - 1) as f64;
    (0..new_len)
        .map(|index| {
            let position = index as f64 * step;
            let base = position.floor() as usize;
            let fraction = (position - base as f64) as f32;
            let next = (base + 1).min(samples.len() - 1);
            samples[base].mul_add(1.0 - fraction, samples[next] * fraction)
        })
        .collect()
}
