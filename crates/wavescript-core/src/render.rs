use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{model::Selection, presets::BitDepth};

/// Where a render writes its output. The `"*"` file-name wildcard asks the
/// host to derive one output per region instead of a single literal file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderTarget {
    File(PathBuf),
    PerRegion { dir: PathBuf, stem: String },
}

impl RenderTarget {
    /// `raw` is the script-supplied output name. A file name of `*` renders
    /// per region into the parent directory, named after `object_name`.
    #[must_use]
    pub fn parse(raw: &str, object_name: &str) -> Self {
        let path = Path::new(raw);
        if path.file_name().is_some_and(|name| name == "*") {
            let dir = path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            Self::PerRegion {
                dir,
                stem: sanitize_stem(object_name),
            }
        } else {
            Self::File(path.to_path_buf())
        }
    }
}

fn sanitize_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() { "untitled".to_string() } else { stem }
}

/// Effective settings for one render call: the active render preset plus the
/// master section output stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RenderSettings {
    pub bit_depth: BitDepth,
    pub normalize: bool,
    pub master_gain_db: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            bit_depth: BitDepth::Pcm16,
            normalize: false,
            master_gain_db: 0.0,
        }
    }
}

/// Writes planar channels as a WAV file, atomically (temp file + persist).
#[instrument(skip(channels), fields(path = %path.display(), sample_rate))]
pub(crate) fn write_wav(
    path: &Path,
    channels: &[Vec<f32>],
    sample_rate: u32,
    settings: &RenderSettings,
) -> Result<()> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    fs::create_dir_all(&parent)
        .with_context(|| format!("failed to create render directory: {}", parent.display()))?;

    let frames = channels.iter().map(Vec::len).max().unwrap_or(0);
    let master_gain = crate::units::db_to_gain(settings.master_gain_db);
    let normalize_gain = if settings.normalize {
        let peak = channels
            .iter()
            .flat_map(|channel| channel.iter())
            .fold(0.0_f32, |peak, sample| peak.max(sample.abs()));
        if peak > 0.0 { 1.0 / peak } else { 1.0 }
    } else {
        1.0
    };
    let gain = master_gain * normalize_gain;

    let (bits_per_sample, sample_format) = match settings.bit_depth {
        BitDepth::Pcm16 => (16, hound::SampleFormat::Int),
        BitDepth::Pcm24 => (24, hound::SampleFormat::Int),
        BitDepth::Float32 => (32, hound::SampleFormat::Float),
    };
    let spec = hound::WavSpec {
        channels: channels.len().max(1) as u16,
        sample_rate,
        bits_per_sample,
        sample_format,
    };

    let mut temp_file = tempfile::NamedTempFile::new_in(&parent)
        .context("failed to create temp render file")?;
    {
        let mut writer = hound::WavWriter::new(&mut temp_file, spec)
            .with_context(|| format!("failed to start wav file: {}", path.display()))?;

        for frame in 0..frames {
            for channel in channels {
                let sample = channel.get(frame).copied().unwrap_or(0.0) * gain;
                match settings.bit_depth {
                    BitDepth::Pcm16 => {
                        let quantized =
                            (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16;
                        writer
                            .write_sample(quantized)
                            .context("failed to write pcm16 sample")?;
                    }
                    BitDepth::Pcm24 => {
                        let quantized =
                            (sample.clamp(-1.0, 1.0) * 8_388_607.0).round() as i32;
                        writer
                            .write_sample(quantized)
                            .context("failed to write pcm24 sample")?;
                    }
                    BitDepth::Float32 => {
                        writer
                            .write_sample(sample)
                            .context("failed to write float sample")?;
                    }
                }
            }
        }

        writer.finalize().context("failed to finalize wav file")?;
    }

    temp_file
        .persist(path)
        .map_err(|error| anyhow::anyhow!(error.error))
        .with_context(|| format!("failed to persist render output: {}", path.display()))?;

    info!(frames, "render output written");
    Ok(())
}

/// Output path for region `index` (1-based) of a per-region render.
#[must_use]
pub(crate) fn region_output_path(dir: &Path, stem: &str, index: usize) -> PathBuf {
    dir.join(format!("{stem}-{index:02}.wav"))
}

/// Slices one region out of planar channel data.
#[must_use]
pub(crate) fn slice_channels(channels: &[Vec<f32>], region: Selection) -> Vec<Vec<f32>> {
    channels
        .iter()
        .map(|channel| {
            let start = usize::try_from(region.start).unwrap_or(usize::MAX);
            let end = usize::try_from(region.end()).unwrap_or(usize::MAX);
            let start = start.min(channel.len());
            let end = end.min(channel.len());
            channel[start..end].to_vec()
        })
        .collect()
}
