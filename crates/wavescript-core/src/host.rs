use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, instrument};

use crate::{
    application::Application,
    audio::AudioObject,
    config::HostConfig,
    logwin::LogWindow,
    model::{ClipId, FileId, UnknownToken},
    montage::ClipFade,
    presets::{Preset, PresetLibrary},
    render::{RenderSettings, RenderTarget},
    units::millis_to_samples,
    wave::Clipboard,
    workspace::Workspace,
};

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    UnknownToken(#[from] UnknownToken),
    #[error("unknown preset: {0:?}")]
    UnknownPreset(String),
    #[error("preset {name:?} is a {found} preset, expected {expected}")]
    PresetKindMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("no audio range is selected")]
    EmptySelection,
    #[error("range out of bounds: {from}+{count} exceeds {size} samples")]
    RangeOutOfBounds { from: u64, count: u64, size: u64 },
    #[error("channel {channel} does not exist ({channels} channels)")]
    BadChannel { channel: u16, channels: u16 },
    #[error("clipboard is empty")]
    EmptyClipboard,
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("file handle is stale or closed: {0}")]
    StaleFileId(FileId),
    #[error("file {id} is not a {expected}")]
    WrongFileKind { id: FileId, expected: &'static str },
    #[error("track not found: {0}")]
    TrackNotFound(usize),
    #[error("clip not found: {0}")]
    ClipNotFound(ClipId),
    #[error("unknown file group: {0}")]
    UnknownFileGroup(u64),
    #[error("object has no regions to render")]
    NoRegions,
    #[error("io error: {0}")]
    Io(String),
}

impl From<anyhow::Error> for HostError {
    fn from(value: anyhow::Error) -> Self {
        Self::Io(format!("{value:#}"))
    }
}

/// Master output stage applied to every render.
#[derive(Debug, Clone, Default)]
pub struct MasterSection {
    gain_db: f32,
    active_preset: Option<String>,
}

impl MasterSection {
    #[instrument(skip(self, presets), fields(preset = name))]
    pub fn load_preset(&mut self, name: &str, presets: &PresetLibrary) -> Result<(), HostError> {
        let Preset::MasterSection { gain_db } = *presets.get(name)? else {
            return Err(HostError::PresetKindMismatch {
                name: name.to_string(),
                expected: "master section",
                found: presets.get(name).map_or("missing", Preset::kind),
            });
        };
        self.gain_db = gain_db;
        self.active_preset = Some(name.to_string());
        info!(gain_db, "master section preset loaded");
        Ok(())
    }

    /// Back to the default state: unity gain, no preset.
    pub fn reset(&mut self) {
        self.gain_db = 0.0;
        self.active_preset = None;
    }

    #[must_use]
    pub fn gain_db(&self) -> f32 {
        self.gain_db
    }

    #[must_use]
    pub fn active_preset(&self) -> Option<&str> {
        self.active_preset.as_deref()
    }
}

/// Per-editor render preset slot; waves and montages each have their own.
#[derive(Debug, Clone)]
pub struct RenderPresetSlot {
    settings: RenderSettings,
    active_preset: Option<String>,
}

impl Default for RenderPresetSlot {
    fn default() -> Self {
        Self {
            settings: RenderSettings::default(),
            active_preset: None,
        }
    }
}

impl RenderPresetSlot {
    #[instrument(skip(self, presets), fields(preset = name))]
    pub fn load_render_preset(
        &mut self,
        name: &str,
        presets: &PresetLibrary,
    ) -> Result<(), HostError> {
        let Preset::Render {
            bit_depth,
            normalize,
        } = *presets.get(name)?
        else {
            return Err(HostError::PresetKindMismatch {
                name: name.to_string(),
                expected: "render",
                found: presets.get(name).map_or("missing", Preset::kind),
            });
        };
        self.settings.bit_depth = bit_depth;
        self.settings.normalize = normalize;
        self.active_preset = Some(name.to_string());
        info!("render preset loaded");
        Ok(())
    }

    #[must_use]
    pub fn settings(&self) -> RenderSettings {
        self.settings
    }

    #[must_use]
    pub fn active_preset(&self) -> Option<&str> {
        self.active_preset.as_deref()
    }
}

pub type WaveEditor = RenderPresetSlot;
pub type MontageEditor = RenderPresetSlot;

/// The host session a script is handed: every singleton of the scripting
/// surface behind one injectable context, so tests and embedders can stand
/// up a fresh host per run.
#[derive(Debug)]
pub struct Host {
    pub application: Application,
    pub workspace: Workspace,
    pub log_window: LogWindow,
    pub master_section: MasterSection,
    pub wave_editor: WaveEditor,
    pub montage_editor: MontageEditor,
    pub clipboard: Clipboard,
    pub presets: PresetLibrary,
    config: HostConfig,
}

impl Default for Host {
    fn default() -> Self {
        Self::new(HostConfig::default())
    }
}

impl Host {
    #[must_use]
    pub fn new(config: HostConfig) -> Self {
        let mut presets = PresetLibrary::builtin();
        if let Some(preset_file) = &config.paths.preset_file
            && let Err(error) = presets.merge_from_file(preset_file)
        {
            tracing::warn!(?error, "user preset file ignored");
        }

        Self {
            application: Application::new(),
            workspace: Workspace::new(
                config.audio.default_sample_rate,
                config.audio.montage_output_channels,
            ),
            log_window: LogWindow::closed(),
            master_section: MasterSection::default(),
            wave_editor: WaveEditor::default(),
            montage_editor: MontageEditor::default(),
            clipboard: Clipboard::default(),
            presets,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Renders a wave with the active wave-editor preset and the master
    /// section output stage. `output` follows the script convention: a
    /// literal file name, or `*` for one output per region.
    pub fn render_wave(&self, id: FileId, output: &str) -> Result<Vec<PathBuf>, HostError> {
        let wave = self.workspace.wave(id)?;
        let mut settings = self.wave_editor.settings();
        settings.master_gain_db += self.master_section.gain_db();
        let target = RenderTarget::parse(output, wave.name());
        wave.render(&target, &settings)
    }

    pub fn render_montage(&self, id: FileId, output: &str) -> Result<Vec<PathBuf>, HostError> {
        let montage = self.workspace.montage(id)?;
        let mut settings = self.montage_editor.settings();
        settings.master_gain_db += self.master_section.gain_db();
        let target = RenderTarget::parse(output, montage.name());
        montage.render(&target, &settings)
    }

    /// Soft removal with the configured boundary crossfade.
    pub fn remove_soft(&mut self, id: FileId) -> Result<(), HostError> {
        let crossfade_millis = self.config.editing.soft_remove_crossfade_millis;
        let wave = self.workspace.wave_mut(id)?;
        let crossfade = millis_to_samples(crossfade_millis, wave.sample_rate());
        wave.remove_soft(crossfade)
    }

    /// Applies the configured default fade-in to a clip.
    pub fn set_clip_default_fade_in(
        &mut self,
        id: FileId,
        clip: ClipId,
    ) -> Result<(), HostError> {
        let fade = self.default_clip_fade(id)?;
        self.workspace
            .montage_mut(id)?
            .set_clip_default_fade_in(clip, fade)
    }

    pub fn set_clip_default_fade_out(
        &mut self,
        id: FileId,
        clip: ClipId,
    ) -> Result<(), HostError> {
        let fade = self.default_clip_fade(id)?;
        self.workspace
            .montage_mut(id)?
            .set_clip_default_fade_out(clip, fade)
    }

    fn default_clip_fade(&self, id: FileId) -> Result<ClipFade, HostError> {
        let montage = self.workspace.montage(id)?;
        Ok(ClipFade {
            shape: self.config.editing.default_clip_fade_shape,
            length: millis_to_samples(
                self.config.editing.default_clip_fade_millis,
                montage.sample_rate(),
            ),
        })
    }
}
