use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::FadeShape;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub audio: AudioConfig,
    pub editing: EditingConfig,
    pub render: RenderConfig,
    pub diagnostics: DiagnosticsConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub default_sample_rate: u32,
    pub default_channels: u16,
    pub montage_output_channels: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditingConfig {
    /// Crossfade applied over the joined boundary by soft removal.
    pub soft_remove_crossfade_millis: u64,
    pub default_clip_fade_millis: u64,
    pub default_clip_fade_shape: FadeShape,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub default_preset: String,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    pub rust_log_filter: String,
    pub trace_file_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub logs_dir: PathBuf,
    pub preset_file: Option<PathBuf>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            audio: AudioConfig::default(),
            editing: EditingConfig::default(),
            render: RenderConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            default_sample_rate: 48_000,
            default_channels: 2,
            montage_output_channels: 2,
        }
    }
}

impl Default for EditingConfig {
    fn default() -> Self {
        Self {
            soft_remove_crossfade_millis: 10,
            default_clip_fade_millis: 20,
            default_clip_fade_shape: FadeShape::Linear,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_preset: "Default".to_string(),
            output_dir: PathBuf::from("data/renders"),
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            rust_log_filter: "info,wavescript_core=trace".to_string(),
            trace_file_prefix: "wavescript".to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            logs_dir: PathBuf::from("logs"),
            preset_file: None,
        }
    }
}

impl HostConfig {
    pub fn load() -> Result<Self> {
        let config_path = discover_config_path().with_context(|| {
            "failed to locate wavescript.config.toml; looked in cwd and parent directory"
                .to_string()
        })?;

        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read config file {}", config_path.display()))?;

        let config: Self = toml::from_str(&content).with_context(|| {
            format!("failed to parse config TOML from {}", config_path.display())
        })?;

        Ok(config)
    }
}

fn discover_config_path() -> Result<PathBuf> {
    if let Some(path) = env::var_os("WAVESCRIPT_CONFIG_PATH") {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Ok(path);
        }
    }

    let cwd = env::current_dir().context("failed to resolve current directory")?;
    let candidates = [
        cwd.join("wavescript.config.toml"),
        cwd.join("../wavescript.config.toml"),
    ];

    candidates
        .into_iter()
        .find(|path| Path::new(path).is_file())
        .ok_or_else(|| anyhow::anyhow!("wavescript.config.toml not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_from_empty_toml() {
        let config: HostConfig = toml::from_str("").expect("empty config should parse");
        assert_eq!(config.audio.default_sample_rate, 48_000);
        assert_eq!(config.editing.soft_remove_crossfade_millis, 10);
    }

    #[test]
    fn partial_toml_overrides_one_table() {
        let config: HostConfig = toml::from_str(
            "[editing]\nsoft_remove_crossfade_millis = 25\ndefault_clip_fade_shape = \"sinus\"\n",
        )
        .expect("partial config should parse");
        assert_eq!(config.editing.soft_remove_crossfade_millis, 25);
        assert_eq!(config.editing.default_clip_fade_shape, FadeShape::Sinus);
        assert_eq!(config.audio.default_channels, 2);
    }
}
