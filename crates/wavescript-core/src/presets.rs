use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::host::HostError;

/// Output sample encoding for rendered files.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BitDepth {
    Pcm16,
    Pcm24,
    Float32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EnvelopePoint {
    /// Normalized position within the audio range, `0.0..=1.0`.
    pub at: f32,
    pub gain_db: f32,
}

/// A named, typed parameter set. The host ships a builtin library; user
/// presets can be merged in from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Preset {
    NormalizeLevel { peak_db: f32 },
    NormalizeLoudness { rms_db: f32 },
    NormalizePan { balance: f32 },
    PitchBend { semitones: f32 },
    PitchCorrection { semitones: f32 },
    PitchQuantize { strength: f32 },
    TimeStretch { ratio: f32 },
    Morph { mix: f32 },
    SilenceReplace,
    SilenceInsert { duration_millis: u64 },
    LevelEnvelope { points: Vec<EnvelopePoint> },
    AudioRange { start: u64, length: u64 },
    MasterSection { gain_db: f32 },
    Render { bit_depth: BitDepth, normalize: bool },
}

impl Preset {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NormalizeLevel { .. } => "normalize level",
            Self::NormalizeLoudness { .. } => "normalize loudness",
            Self::NormalizePan { .. } => "normalize pan",
            Self::PitchBend { .. } => "pitch bend",
            Self::PitchCorrection { .. } => "pitch correction",
            Self::PitchQuantize { .. } => "pitch quantize",
            Self::TimeStretch { .. } => "time stretch",
            Self::Morph { .. } => "morph",
            Self::SilenceReplace | Self::SilenceInsert { .. } => "silence",
            Self::LevelEnvelope { .. } => "level envelope",
            Self::AudioRange { .. } => "audio range",
            Self::MasterSection { .. } => "master section",
            Self::Render { .. } => "render",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(transparent)]
struct PresetFile {
    presets: BTreeMap<String, Preset>,
}

#[derive(Debug, Clone)]
pub struct PresetLibrary {
    presets: BTreeMap<String, Preset>,
}

impl Default for PresetLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PresetLibrary {
    #[must_use]
    pub fn builtin() -> Self {
        let mut presets = BTreeMap::new();
        presets.insert(
            "Peak -1 dB".to_string(),
            Preset::NormalizeLevel { peak_db: -1.0 },
        );
        presets.insert(
            "Broadcast Loudness".to_string(),
            Preset::NormalizeLoudness { rms_db: -18.0 },
        );
        presets.insert(
            "Center Balance".to_string(),
            Preset::NormalizePan { balance: 0.0 },
        );
        presets.insert(
            "Up One Semitone".to_string(),
            Preset::PitchBend { semitones: 1.0 },
        );
        presets.insert(
            "Gentle Correction".to_string(),
            Preset::PitchCorrection { semitones: 0.5 },
        );
        presets.insert(
            "Snap To Pitch".to_string(),
            Preset::PitchQuantize { strength: 1.0 },
        );
        presets.insert(
            "Half Speed".to_string(),
            Preset::TimeStretch { ratio: 2.0 },
        );
        presets.insert("Soft Morph".to_string(), Preset::Morph { mix: 0.5 });
        presets.insert("Silence".to_string(), Preset::SilenceReplace);
        presets.insert(
            "Insert One Second".to_string(),
            Preset::SilenceInsert {
                duration_millis: 1_000,
            },
        );
        presets.insert(
            "Fade Through".to_string(),
            Preset::LevelEnvelope {
                points: vec![
                    EnvelopePoint {
                        at: 0.0,
                        gain_db: 0.0,
                    },
                    EnvelopePoint {
                        at: 0.5,
                        gain_db: -12.0,
                    },
                    EnvelopePoint {
                        at: 1.0,
                        gain_db: 0.0,
                    },
                ],
            },
        );
        presets.insert(
            "Master Unity".to_string(),
            Preset::MasterSection { gain_db: 0.0 },
        );
        presets.insert(
            "Default".to_string(),
            Preset::Render {
                bit_depth: BitDepth::Pcm16,
                normalize: false,
            },
        );
        presets.insert(
            "Archive 32-bit Float".to_string(),
            Preset::Render {
                bit_depth: BitDepth::Float32,
                normalize: false,
            },
        );
        Self { presets }
    }

    pub fn get(&self, name: &str) -> Result<&Preset, HostError> {
        self.presets
            .get(name)
            .ok_or_else(|| HostError::UnknownPreset(name.to_string()))
    }

    pub fn insert(&mut self, name: impl Into<String>, preset: Preset) {
        self.presets.insert(name.into(), preset);
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.presets.keys().map(String::as_str).collect()
    }

    /// Merges user presets from a TOML table of `name -> preset`.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn merge_from_file(&mut self, path: &Path) -> Result<usize> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read preset file: {}", path.display()))?;
        let file: PresetFile = toml::from_str(&content)
            .with_context(|| format!("failed to parse preset TOML from {}", path.display()))?;

        let merged = file.presets.len();
        self.presets.extend(file.presets);
        debug!(merged, "user presets merged");
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_library_resolves_known_names() {
        let library = PresetLibrary::builtin();
        assert!(matches!(
            library.get("Peak -1 dB"),
            Ok(Preset::NormalizeLevel { .. })
        ));
        assert!(matches!(
            library.get("Default"),
            Ok(Preset::Render { .. })
        ));
    }

    #[test]
    fn unknown_preset_is_an_error() {
        let library = PresetLibrary::builtin();
        assert!(matches!(
            library.get("No Such Preset"),
            Err(HostError::UnknownPreset(_))
        ));
    }

    #[test]
    fn user_presets_parse_from_toml() {
        let toml = r#"
            [ "Quiet Master" ]
            kind = "master_section"
            gain_db = -3.0

            [ "Mix Range" ]
            kind = "audio_range"
            start = 100
            length = 400
        "#;
        let file: PresetFile = toml::from_str(toml).expect("preset toml should parse");
        assert_eq!(file.presets.len(), 2);
        assert_eq!(
            file.presets["Quiet Master"],
            Preset::MasterSection { gain_db: -3.0 }
        );
    }
}
