use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::{
    audio::{AudioCore, AudioObject},
    host::HostError,
    model::{Channel, FadeShape, Selection},
    presets::{EnvelopePoint, Preset, PresetLibrary},
    render::{self, RenderSettings, RenderTarget},
    sound::{self, resample_linear},
    units::db_to_gain,
};

/// Host-global clipboard shared by all open waves.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl Clipboard {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.channels.first().map_or(0, |channel| channel.len() as u64)
    }
}

#[derive(Debug, Clone)]
struct WaveSnapshot {
    core: AudioCore,
    channels: Vec<Vec<f32>>,
    cursor_channel: Channel,
}

/// A single audio file open in the editor: planar f32 sample buffers plus
/// the shared cursor/selection/marker state. Range edits operate on the
/// current selection; gain-style edits respect the cursor channel, while
/// length-changing edits always touch every channel so the buffers stay
/// frame-aligned.
#[derive(Debug, Clone)]
pub struct Wave {
    core: AudioCore,
    channels: Vec<Vec<f32>>,
    cursor_channel: Channel,
    undo: Option<WaveSnapshot>,
}

impl Wave {
    #[must_use]
    pub fn from_samples(
        name: impl Into<String>,
        sample_rate: u32,
        mut channels: Vec<Vec<f32>>,
    ) -> Self {
        if channels.is_empty() {
            channels.push(Vec::new());
        }
        let frames = channels.iter().map(Vec::len).max().unwrap_or(0);
        for channel in &mut channels {
            channel.resize(frames, 0.0);
        }

        Self {
            core: AudioCore::new(name, sample_rate),
            channels,
            cursor_channel: Channel::All,
            undo: None,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, HostError> {
        let decoded = sound::decode_wav(path)?;
        let name = path
            .file_stem()
            .map_or_else(|| "untitled".to_string(), |stem| stem.to_string_lossy().into_owned());
        Ok(Self::from_samples(name, decoded.sample_rate, decoded.channels))
    }

    #[must_use]
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    #[must_use]
    pub fn cursor_channel(&self) -> Channel {
        self.cursor_channel
    }

    /// Moves the cursor to a channel; `rightCh` needs a second channel.
    pub fn set_cursor_channel(&mut self, channel: Channel) -> Result<(), HostError> {
        if channel == Channel::Right && self.channels.len() < 2 {
            return Err(HostError::BadChannel {
                channel: 1,
                channels: self.channels.len() as u16,
            });
        }
        self.cursor_channel = channel;
        Ok(())
    }

    /// Materialized block read of one channel. Out-of-range requests are
    /// rejected rather than truncated.
    pub fn read_samples(&self, channel: u16, from: u64, count: u64) -> Result<Vec<f32>, HostError> {
        let Some(samples) = self.channels.get(usize::from(channel)) else {
            return Err(HostError::BadChannel {
                channel,
                channels: self.channels.len() as u16,
            });
        };
        let size = samples.len() as u64;
        if from.saturating_add(count) > size {
            return Err(HostError::RangeOutOfBounds { from, count, size });
        }

        let from = from as usize;
        Ok(samples[from..from + count as usize].to_vec())
    }

    #[instrument(skip(self), fields(wave = %self.core.name(), shape = shape.token()))]
    pub fn fade_in(&mut self, shape: FadeShape) -> Result<(), HostError> {
        let selection = self.required_selection()?;
        let indices = self.scoped_indices()?;
        self.snapshot();
        let divisor = (selection.len.saturating_sub(1)).max(1) as f32;
        self.map_selection(selection, &indices, |offset, sample| {
            sample * shape.gain(offset as f32 / divisor)
        });
        info!("fade in applied");
        Ok(())
    }

    #[instrument(skip(self), fields(wave = %self.core.name(), shape = shape.token()))]
    pub fn fade_out(&mut self, shape: FadeShape) -> Result<(), HostError> {
        let selection = self.required_selection()?;
        let indices = self.scoped_indices()?;
        self.snapshot();
        let divisor = (selection.len.saturating_sub(1)).max(1) as f32;
        self.map_selection(selection, &indices, |offset, sample| {
            sample * shape.gain(1.0 - offset as f32 / divisor)
        });
        info!("fade out applied");
        Ok(())
    }

    #[instrument(skip(self), fields(wave = %self.core.name(), db))]
    pub fn change_level(&mut self, db: f32) -> Result<(), HostError> {
        let selection = self.required_selection()?;
        let indices = self.scoped_indices()?;
        self.snapshot();
        let gain = db_to_gain(db);
        self.map_selection(selection, &indices, |_, sample| sample * gain);
        info!("level changed");
        Ok(())
    }

    #[instrument(skip(self, presets), fields(wave = %self.core.name(), preset = preset_name))]
    pub fn normalize(
        &mut self,
        preset_name: &str,
        presets: &PresetLibrary,
    ) -> Result<(), HostError> {
        let Preset::NormalizeLevel { peak_db } = *presets.get(preset_name)? else {
            return Err(self.kind_mismatch(preset_name, "normalize level", presets));
        };
        let selection = self.required_selection()?;
        let indices = self.scoped_indices()?;

        let peak = self.fold_selection(selection, &indices, 0.0_f32, |acc, sample| {
            acc.max(sample.abs())
        });
        if peak <= 0.0 {
            info!("selection is silent, nothing to normalize");
            return Ok(());
        }

        self.snapshot();
        let gain = db_to_gain(peak_db) / peak;
        self.map_selection(selection, &indices, |_, sample| sample * gain);
        info!(peak, gain, "normalized to peak level");
        Ok(())
    }

    #[instrument(skip(self, presets), fields(wave = %self.core.name(), preset = preset_name))]
    pub fn normalize_loudness(
        &mut self,
        preset_name: &str,
        presets: &PresetLibrary,
    ) -> Result<(), HostError> {
        let Preset::NormalizeLoudness { rms_db } = *presets.get(preset_name)? else {
            return Err(self.kind_mismatch(preset_name, "normalize loudness", presets));
        };
        let selection = self.required_selection()?;
        let indices = self.scoped_indices()?;

        let sum_squares = self.fold_selection(selection, &indices, 0.0_f64, |acc, sample| {
            acc + f64::from(sample) * f64::from(sample)
        });
        let sample_count = selection.len as f64 * indices.len() as f64;
        let rms = (sum_squares / sample_count.max(1.0)).sqrt() as f32;
        if rms <= 0.0 {
            info!("selection is silent, nothing to normalize");
            return Ok(());
        }

        self.snapshot();
        let gain = db_to_gain(rms_db) / rms;
        self.map_selection(selection, &indices, |_, sample| sample * gain);
        info!(rms, gain, "normalized to loudness");
        Ok(())
    }

    #[instrument(skip(self, presets), fields(wave = %self.core.name(), preset = preset_name))]
    pub fn normalize_pan(
        &mut self,
        preset_name: &str,
        presets: &PresetLibrary,
    ) -> Result<(), HostError> {
        let Preset::NormalizePan { balance } = *presets.get(preset_name)? else {
            return Err(self.kind_mismatch(preset_name, "normalize pan", presets));
        };
        if self.channels.len() < 2 {
            return Err(HostError::BadChannel {
                channel: 1,
                channels: self.channels.len() as u16,
            });
        }
        let selection = self.required_selection()?;

        let peak_left = self.fold_selection(selection, &[0], 0.0_f32, |acc, s| acc.max(s.abs()));
        let peak_right = self.fold_selection(selection, &[1], 0.0_f32, |acc, s| acc.max(s.abs()));
        let target = peak_left.max(peak_right);
        if target <= 0.0 {
            info!("selection is silent, nothing to balance");
            return Ok(());
        }

        self.snapshot();
        let balance = balance.clamp(-1.0, 1.0);
        let weight_left = 1.0 - balance.max(0.0);
        let weight_right = 1.0 + balance.min(0.0);
        let gain_left = if peak_left > 0.0 { target * weight_left / peak_left } else { 1.0 };
        let gain_right = if peak_right > 0.0 { target * weight_right / peak_right } else { 1.0 };
        self.map_selection(selection, &[0], |_, sample| sample * gain_left);
        self.map_selection(selection, &[1], |_, sample| sample * gain_right);
        info!(gain_left, gain_right, "pan normalized");
        Ok(())
    }

    pub fn pitch_bend(
        &mut self,
        preset_name: &str,
        presets: &PresetLibrary,
    ) -> Result<(), HostError> {
        let Preset::PitchBend { semitones } = *presets.get(preset_name)? else {
            return Err(self.kind_mismatch(preset_name, "pitch bend", presets));
        };
        self.repitch_selection(semitones)
    }

    pub fn pitch_correction(
        &mut self,
        preset_name: &str,
        presets: &PresetLibrary,
    ) -> Result<(), HostError> {
        let Preset::PitchCorrection { semitones } = *presets.get(preset_name)? else {
            return Err(self.kind_mismatch(preset_name, "pitch correction", presets));
        };
        self.repitch_selection(semitones)
    }

    pub fn pitch_quantize(
        &mut self,
        preset_name: &str,
        presets: &PresetLibrary,
    ) -> Result<(), HostError> {
        let Preset::PitchQuantize { strength } = *presets.get(preset_name)? else {
            return Err(self.kind_mismatch(preset_name, "pitch quantize", presets));
        };
        self.repitch_selection(strength)
    }

    /// Length-preserving pitch transform over the selection.
    #[instrument(skip(self), fields(wave = %self.core.name(), semitones))]
    fn repitch_selection(&mut self, semitones: f32) -> Result<(), HostError> {
        let selection = self.required_selection()?;
        let indices = self.scoped_indices()?;
        self.snapshot();

        let ratio = 2.0_f64.powf(f64::from(semitones) / 12.0);
        let start = selection.start as usize;
        let end = selection.end() as usize;
        let len = end - start;
        let shifted_len = ((len as f64 / ratio).round() as usize).max(1);
        for &index in &indices {
            let slice = &self.channels[index][start..end];
            let shifted = resample_linear(slice, shifted_len);
            let restored = resample_linear(&shifted, len);
            self.channels[index][start..end].copy_from_slice(&restored);
        }
        info!(ratio, "pitch transform applied");
        Ok(())
    }

    #[instrument(skip(self, presets), fields(wave = %self.core.name(), preset = preset_name))]
    pub fn time_stretch(
        &mut self,
        preset_name: &str,
        presets: &PresetLibrary,
    ) -> Result<(), HostError> {
        let Preset::TimeStretch { ratio } = *presets.get(preset_name)? else {
            return Err(self.kind_mismatch(preset_name, "time stretch", presets));
        };
        let selection = self.required_selection()?;
        self.snapshot();

        let ratio = f64::from(ratio.max(0.01));
        let start = selection.start as usize;
        let end = selection.end() as usize;
        let new_len = ((selection.len as f64 * ratio).round() as usize).max(1);
        for channel in &mut self.channels {
            let stretched = resample_linear(&channel[start..end], new_len);
            channel.splice(start..end, stretched);
        }
        self.core
            .splice_markers(selection.start, selection.len, new_len as u64);
        let size = self.size();
        self.core.select(selection.start, new_len as u64, size);
        info!(ratio, new_len, "time stretch applied");
        Ok(())
    }

    #[instrument(skip(self, presets), fields(wave = %self.core.name(), preset = preset_name))]
    pub fn morph(&mut self, preset_name: &str, presets: &PresetLibrary) -> Result<(), HostError> {
        let Preset::Morph { mix } = *presets.get(preset_name)? else {
            return Err(self.kind_mismatch(preset_name, "morph", presets));
        };
        let selection = self.required_selection()?;
        let indices = self.scoped_indices()?;
        self.snapshot();

        let mix = mix.clamp(0.0, 1.0);
        let start = selection.start as usize;
        let end = selection.end() as usize;
        for &index in &indices {
            let mut state = 0.0_f32;
            for sample in &mut self.channels[index][start..end] {
                state += 0.2 * (*sample - state);
                *sample = *sample * (1.0 - mix) + state * mix;
            }
        }
        info!(mix, "morph applied");
        Ok(())
    }

    #[instrument(skip(self, presets), fields(wave = %self.core.name(), preset = preset_name))]
    pub fn silence(&mut self, preset_name: &str, presets: &PresetLibrary) -> Result<(), HostError> {
        match *presets.get(preset_name)? {
            Preset::SilenceReplace => {
                let selection = self.required_selection()?;
                let indices = self.scoped_indices()?;
                self.snapshot();
                self.map_selection(selection, &indices, |_, _| 0.0);
                info!("selection silenced");
                Ok(())
            }
            Preset::SilenceInsert { duration_millis } => {
                self.snapshot();
                let frames = crate::units::millis_to_samples(duration_millis, self.sample_rate());
                let at = self.core.cursor() as usize;
                for channel in &mut self.channels {
                    let at = at.min(channel.len());
                    channel.splice(at..at, std::iter::repeat_n(0.0, frames as usize));
                }
                self.core.splice_markers(at as u64, 0, frames);
                let size = self.size();
                self.core.select(at as u64, frames, size);
                info!(frames, "silence inserted");
                Ok(())
            }
            _ => Err(self.kind_mismatch(preset_name, "silence", presets)),
        }
    }

    #[instrument(skip(self, presets), fields(wave = %self.core.name(), preset = preset_name))]
    pub fn level_envelope(
        &mut self,
        preset_name: &str,
        presets: &PresetLibrary,
    ) -> Result<(), HostError> {
        let points = match presets.get(preset_name)? {
            Preset::LevelEnvelope { points } => points.clone(),
            _ => return Err(self.kind_mismatch(preset_name, "level envelope", presets)),
        };
        let selection = self.required_selection()?;
        let indices = self.scoped_indices()?;
        self.snapshot();

        let divisor = (selection.len.saturating_sub(1)).max(1) as f32;
        self.map_selection(selection, &indices, |offset, sample| {
            sample * envelope_gain(&points, offset as f32 / divisor)
        });
        info!(points = points.len(), "level envelope applied");
        Ok(())
    }

    /// Deletes the selected range, leaving a hard cut.
    #[instrument(skip(self), fields(wave = %self.core.name()))]
    pub fn remove(&mut self) -> Result<(), HostError> {
        let selection = self.required_selection()?;
        self.snapshot();
        self.splice_out(selection);
        info!(removed = selection.len, "selection removed");
        Ok(())
    }

    /// Deletes the selected range and equal-power crossfades the joined
    /// boundary over `crossfade` samples.
    #[instrument(skip(self), fields(wave = %self.core.name(), crossfade))]
    pub fn remove_soft(&mut self, crossfade: u64) -> Result<(), HostError> {
        let selection = self.required_selection()?;
        self.snapshot();

        let size = self.size();
        let fade = crossfade
            .min(selection.start)
            .min(size.saturating_sub(selection.end()));
        if fade == 0 {
            self.splice_out(selection);
            info!("no room to crossfade, removed hard");
            return Ok(());
        }

        let start = selection.start as usize;
        let end = selection.end() as usize;
        let fade_len = fade as usize;
        for channel in &mut self.channels {
            let mixed: Vec<f32> = (0..fade_len)
                .map(|offset| {
                    let t = (offset as f32 + 0.5) / fade_len as f32;
                    let angle = t * std::f32::consts::FRAC_PI_2;
                    let out_gain = angle.cos();
                    let in_gain = angle.sin();
                    channel[start - fade_len + offset]
                        .mul_add(out_gain, channel[end + offset] * in_gain)
                })
                .collect();
            channel.splice(start - fade_len..end + fade_len, mixed);
        }
        self.core
            .splice_markers(selection.start - fade, selection.len + 2 * fade, fade);
        let size = self.size();
        self.core.set_cursor(selection.start.saturating_sub(fade), size);
        self.core.clear_selection();
        info!(fade, "selection removed with crossfade");
        Ok(())
    }

    /// Keeps only the selected range.
    #[instrument(skip(self), fields(wave = %self.core.name()))]
    pub fn trim(&mut self) -> Result<(), HostError> {
        let selection = self.required_selection()?;
        self.snapshot();

        let start = selection.start as usize;
        let end = selection.end() as usize;
        for channel in &mut self.channels {
            *channel = channel[start.min(channel.len())..end.min(channel.len())].to_vec();
        }
        self.core.crop_markers(selection);
        let size = self.size();
        self.core.set_cursor(0, size);
        self.core.select(0, size, size);
        info!(kept = selection.len, "trimmed to selection");
        Ok(())
    }

    #[instrument(skip(self), fields(wave = %self.core.name()))]
    pub fn mute(&mut self) -> Result<(), HostError> {
        let selection = self.required_selection()?;
        let indices = self.scoped_indices()?;
        self.snapshot();
        self.map_selection(selection, &indices, |_, _| 0.0);
        info!("selection muted");
        Ok(())
    }

    #[instrument(skip(self), fields(wave = %self.core.name()))]
    pub fn reverse(&mut self) -> Result<(), HostError> {
        let selection = self.required_selection()?;
        let indices = self.scoped_indices()?;
        self.snapshot();
        let start = selection.start as usize;
        let end = selection.end() as usize;
        for &index in &indices {
            self.channels[index][start..end].reverse();
        }
        info!("selection reversed");
        Ok(())
    }

    #[instrument(skip(self), fields(wave = %self.core.name()))]
    pub fn invert_phase(&mut self) -> Result<(), HostError> {
        let selection = self.required_selection()?;
        let indices = self.scoped_indices()?;
        self.snapshot();
        self.map_selection(selection, &indices, |_, sample| -sample);
        info!("phase inverted");
        Ok(())
    }

    #[instrument(skip(self), fields(wave = %self.core.name()))]
    pub fn remove_dc_offset(&mut self) -> Result<(), HostError> {
        let selection = self.required_selection()?;
        let indices = self.scoped_indices()?;
        self.snapshot();
        for &index in &indices {
            let start = selection.start as usize;
            let end = selection.end() as usize;
            let slice = &self.channels[index][start..end];
            let mean =
                (slice.iter().map(|&s| f64::from(s)).sum::<f64>() / slice.len().max(1) as f64) as f32;
            for sample in &mut self.channels[index][start..end] {
                *sample -= mean;
            }
        }
        info!("dc offset removed");
        Ok(())
    }

    #[instrument(skip(self), fields(wave = %self.core.name()))]
    pub fn swap_channels(&mut self) -> Result<(), HostError> {
        if self.channels.len() < 2 {
            return Err(HostError::BadChannel {
                channel: 1,
                channels: self.channels.len() as u16,
            });
        }
        self.snapshot();
        self.channels.swap(0, 1);
        info!("channels swapped");
        Ok(())
    }

    /// Copies the selected range (all channels) to the clipboard.
    pub fn copy(&self, clipboard: &mut Clipboard) -> Result<(), HostError> {
        let selection = self.required_selection()?;
        clipboard.channels = render::slice_channels(&self.channels, selection);
        clipboard.sample_rate = self.sample_rate();
        Ok(())
    }

    #[instrument(skip(self, clipboard), fields(wave = %self.core.name()))]
    pub fn cut(&mut self, clipboard: &mut Clipboard) -> Result<(), HostError> {
        let selection = self.required_selection()?;
        self.copy(clipboard)?;
        self.snapshot();
        self.splice_out(selection);
        info!(cut = selection.len, "selection cut");
        Ok(())
    }

    /// Pastes clipboard audio over the selection, or inserts it at the
    /// cursor when nothing is selected. The pasted range becomes the new
    /// selection.
    #[instrument(skip(self, clipboard), fields(wave = %self.core.name()))]
    pub fn paste(&mut self, clipboard: &Clipboard) -> Result<(), HostError> {
        if clipboard.is_empty() {
            return Err(HostError::EmptyClipboard);
        }
        self.snapshot();

        let frames = clipboard.frames() as usize;
        let (at, replaced) = match self.core.selection() {
            Some(selection) => (selection.start as usize, selection.len as usize),
            None => (self.core.cursor() as usize, 0),
        };
        let source_channels = clipboard.channels.len();
        for (index, channel) in self.channels.iter_mut().enumerate() {
            let source = &clipboard.channels[index % source_channels];
            let at = at.min(channel.len());
            let end = (at + replaced).min(channel.len());
            channel.splice(at..end, source.iter().copied());
        }
        self.core
            .splice_markers(at as u64, replaced as u64, frames as u64);
        let size = self.size();
        self.core.select(at as u64, frames as u64, size);
        info!(frames, replaced, "clipboard pasted");
        Ok(())
    }

    fn required_selection(&self) -> Result<Selection, HostError> {
        self.core.selection().ok_or(HostError::EmptySelection)
    }

    fn scoped_indices(&self) -> Result<Vec<usize>, HostError> {
        match self.cursor_channel {
            Channel::Left => Ok(vec![0]),
            Channel::Right => {
                if self.channels.len() < 2 {
                    Err(HostError::BadChannel {
                        channel: 1,
                        channels: self.channels.len() as u16,
                    })
                } else {
                    Ok(vec![1])
                }
            }
            Channel::All => Ok((0..self.channels.len()).collect()),
        }
    }

    fn map_selection(
        &mut self,
        selection: Selection,
        channel_indices: &[usize],
        f: impl Fn(usize, f32) -> f32,
    ) {
        let start = selection.start as usize;
        let end = selection.end() as usize;
        for &index in channel_indices {
            let end = end.min(self.channels[index].len());
            for (offset, sample) in self.channels[index][start.min(end)..end].iter_mut().enumerate()
            {
                *sample = f(offset, *sample);
            }
        }
    }

    fn fold_selection<T: Copy>(
        &self,
        selection: Selection,
        channel_indices: &[usize],
        initial: T,
        f: impl Fn(T, f32) -> T,
    ) -> T {
        let start = selection.start as usize;
        let end = selection.end() as usize;
        let mut acc = initial;
        for &index in channel_indices {
            let end = end.min(self.channels[index].len());
            for &sample in &self.channels[index][start.min(end)..end] {
                acc = f(acc, sample);
            }
        }
        acc
    }

    fn splice_out(&mut self, selection: Selection) {
        let start = selection.start as usize;
        let end = selection.end() as usize;
        for channel in &mut self.channels {
            let end = end.min(channel.len());
            channel.splice(start.min(end)..end, std::iter::empty());
        }
        self.core.splice_markers(selection.start, selection.len, 0);
        let size = self.size();
        self.core.set_cursor(selection.start, size);
        self.core.clear_selection();
    }

    fn snapshot(&mut self) {
        self.undo = Some(WaveSnapshot {
            core: self.core.clone(),
            channels: self.channels.clone(),
            cursor_channel: self.cursor_channel,
        });
    }

    fn kind_mismatch(
        &self,
        name: &str,
        expected: &'static str,
        presets: &PresetLibrary,
    ) -> HostError {
        let found = presets.get(name).map_or("missing", Preset::kind);
        HostError::PresetKindMismatch {
            name: name.to_string(),
            expected,
            found,
        }
    }
}

impl AudioObject for Wave {
    fn core(&self) -> &AudioCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AudioCore {
        &mut self.core
    }

    fn size(&self) -> u64 {
        self.channels.first().map_or(0, |channel| channel.len() as u64)
    }

    fn num_channels(&self) -> u16 {
        self.channels.len() as u16
    }

    fn render(
        &self,
        target: &RenderTarget,
        settings: &RenderSettings,
    ) -> Result<Vec<PathBuf>, HostError> {
        match target {
            RenderTarget::File(path) => {
                let channels = match self.core.selection() {
                    Some(selection) => render::slice_channels(&self.channels, selection),
                    None => self.channels.clone(),
                };
                render::write_wav(path, &channels, self.sample_rate(), settings)?;
                Ok(vec![path.clone()])
            }
            RenderTarget::PerRegion { dir, stem } => {
                let regions = self.regions();
                if regions.is_empty() {
                    return Err(HostError::NoRegions);
                }
                let mut written = Vec::with_capacity(regions.len());
                for (index, region) in regions.into_iter().enumerate() {
                    let path = render::region_output_path(dir, stem, index + 1);
                    let channels = render::slice_channels(&self.channels, region);
                    render::write_wav(&path, &channels, self.sample_rate(), settings)?;
                    written.push(path);
                }
                Ok(written)
            }
        }
    }

    fn undo(&mut self) -> Result<(), HostError> {
        let snapshot = self.undo.take().ok_or(HostError::NothingToUndo)?;
        self.core = snapshot.core;
        self.channels = snapshot.channels;
        self.cursor_channel = snapshot.cursor_channel;
        Ok(())
    }
}

fn envelope_gain(points: &[EnvelopePoint], t: f32) -> f32 {
    if points.is_empty() {
        return 1.0;
    }

    let mut sorted: Vec<EnvelopePoint> = points.to_vec();
    sorted.sort_by(|a, b| a.at.total_cmp(&b.at));
    if t <= sorted[0].at {
        return db_to_gain(sorted[0].gain_db);
    }
    for pair in sorted.windows(2) {
        if t <= pair[1].at {
            let span = (pair[1].at - pair[0].at).max(f32::EPSILON);
            let fraction = (t - pair[0].at) / span;
            let db = pair[0].gain_db + (pair[1].gain_db - pair[0].gain_db) * fraction;
            return db_to_gain(db);
        }
    }
    db_to_gain(sorted[sorted.len() - 1].gain_db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_interpolates_between_points() {
        let points = vec![
            EnvelopePoint { at: 0.0, gain_db: 0.0 },
            EnvelopePoint { at: 1.0, gain_db: -20.0 },
        ];
        assert!((envelope_gain(&points, 0.0) - 1.0).abs() < 1e-6);
        let mid = envelope_gain(&points, 0.5);
        assert!((mid - db_to_gain(-10.0)).abs() < 1e-4);
    }

    #[test]
    fn empty_envelope_is_unity() {
        assert!((envelope_gain(&[], 0.3) - 1.0).abs() < 1e-6);
    }
}
