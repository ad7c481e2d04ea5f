use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    audio::{AudioCore, AudioObject},
    host::HostError,
    model::{ClipId, FadeShape, RippleMode},
    render::{self, RenderSettings, RenderTarget},
    sound,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrackChannels {
    Mono,
    Stereo,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    pub name: String,
    pub channels: TrackChannels,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ClipFade {
    pub shape: FadeShape,
    pub length: u64,
}

/// A placed audio segment on the montage timeline. The montage owns every
/// clip; scripts only hold ids, which go stale once the clip is gone.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    id: ClipId,
    name: String,
    track: usize,
    position: u64,
    length: u64,
    source_path: PathBuf,
    samples: Vec<Vec<f32>>,
    fade_in: Option<ClipFade>,
    fade_out: Option<ClipFade>,
    selected: bool,
}

impl Clip {
    #[must_use]
    pub fn id(&self) -> ClipId {
        self.id
    }

    #[must_use]
    pub fn end(&self) -> u64 {
        self.position.saturating_add(self.length)
    }
}

#[derive(Debug, Clone)]
struct MontageSnapshot {
    core: AudioCore,
    tracks: Vec<Track>,
    clips: Vec<Clip>,
    active_clip: Option<ClipId>,
    selected_track: usize,
}

/// A multi-track timeline. Clips are kept in insertion order; enumeration
/// through `first_clip`/`next_clip` promises completeness, not order.
#[derive(Debug, Clone)]
pub struct Montage {
    core: AudioCore,
    tracks: Vec<Track>,
    clips: Vec<Clip>,
    next_clip_id: u64,
    active_clip: Option<ClipId>,
    selected_track: usize,
    output_channels: u16,
    plugins_bypassed: bool,
    undo: Option<MontageSnapshot>,
}

impl Montage {
    #[must_use]
    pub fn new(name: impl Into<String>, sample_rate: u32, output_channels: u16) -> Self {
        Self {
            core: AudioCore::new(name, sample_rate),
            tracks: Vec::new(),
            clips: Vec::new(),
            next_clip_id: 1,
            active_clip: None,
            selected_track: 0,
            output_channels: output_channels.max(1),
            plugins_bypassed: false,
            undo: None,
        }
    }

    #[must_use]
    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    pub fn track_name(&self, index: usize) -> Result<&str, HostError> {
        self.tracks
            .get(index)
            .map(|track| track.name.as_str())
            .ok_or(HostError::TrackNotFound(index))
    }

    #[instrument(skip(self), fields(montage = %self.core.name(), index))]
    pub fn insert_mono_track(&mut self, index: usize) {
        self.insert_track(index, TrackChannels::Mono);
    }

    #[instrument(skip(self), fields(montage = %self.core.name(), index))]
    pub fn insert_stereo_track(&mut self, index: usize) {
        self.insert_track(index, TrackChannels::Stereo);
    }

    fn insert_track(&mut self, index: usize, channels: TrackChannels) {
        self.snapshot();
        let index = index.min(self.tracks.len());
        let name = format!("Track {}", self.tracks.len() + 1);
        self.tracks.insert(index, Track { name, channels });
        // Clips on tracks at or after the insert point follow their track.
        for clip in &mut self.clips {
            if clip.track >= index {
                clip.track += 1;
            }
        }
        info!(?channels, "track inserted");
    }

    pub fn set_track_name(&mut self, index: usize, name: &str) -> Result<(), HostError> {
        let track = self
            .tracks
            .get_mut(index)
            .ok_or(HostError::TrackNotFound(index))?;
        track.name = name.to_string();
        Ok(())
    }

    pub fn set_selected_track(&mut self, index: usize) -> Result<(), HostError> {
        if index >= self.tracks.len() {
            return Err(HostError::TrackNotFound(index));
        }
        self.selected_track = index;
        Ok(())
    }

    #[must_use]
    pub fn selected_track(&self) -> usize {
        self.selected_track
    }

    /// Creates a clip from a WAV file and places it on the timeline,
    /// displacing neighbours according to the ripple mode.
    #[instrument(skip(self), fields(montage = %self.core.name(), track, position, file = %file.display(), mode = mode.token()))]
    pub fn insert_clip(
        &mut self,
        track: usize,
        position: u64,
        file: &Path,
        mode: RippleMode,
    ) -> Result<ClipId, HostError> {
        let decoded = sound::decode_wav(file)?;
        let name = file
            .file_stem()
            .map_or_else(|| "clip".to_string(), |stem| stem.to_string_lossy().into_owned());
        self.insert_clip_inner(track, position, name, file.to_path_buf(), decoded.channels, mode)
    }

    /// Places a clip from in-memory audio; the host-side seam used by
    /// fixtures and embedders.
    pub fn insert_clip_from_samples(
        &mut self,
        track: usize,
        position: u64,
        name: impl Into<String>,
        samples: Vec<Vec<f32>>,
        mode: RippleMode,
    ) -> Result<ClipId, HostError> {
        self.insert_clip_inner(track, position, name.into(), PathBuf::new(), samples, mode)
    }

    fn insert_clip_inner(
        &mut self,
        track: usize,
        position: u64,
        name: String,
        source_path: PathBuf,
        samples: Vec<Vec<f32>>,
        mode: RippleMode,
    ) -> Result<ClipId, HostError> {
        if track >= self.tracks.len() {
            return Err(HostError::TrackNotFound(track));
        }
        self.snapshot();

        let length = samples.iter().map(Vec::len).max().unwrap_or(0) as u64;
        let id = ClipId(self.next_clip_id);
        self.next_clip_id += 1;

        match mode {
            RippleMode::NoShift => {}
            RippleMode::ShiftTrack => self.shift_clips(position, length, Some(track)),
            RippleMode::ShiftGlobal => self.shift_clips(position, length, None),
        }

        self.clips.push(Clip {
            id,
            name,
            track,
            position,
            length,
            source_path,
            samples,
            fade_in: None,
            fade_out: None,
            selected: false,
        });
        info!(clip_id = %id, length, "clip inserted");
        Ok(id)
    }

    /// Shifts clips starting at or after `position` right by `length`;
    /// clips straddling the insert point stay put.
    fn shift_clips(&mut self, position: u64, length: u64, track: Option<usize>) {
        for clip in &mut self.clips {
            if track.is_some_and(|track| clip.track != track) {
                continue;
            }
            if clip.position >= position {
                clip.position = clip.position.saturating_add(length);
            }
        }
    }

    /// Host-side removal, simulating a clip deleted outside the script.
    /// Outstanding ids for the clip become stale.
    #[instrument(skip(self), fields(montage = %self.core.name(), clip_id = %id))]
    pub fn remove_clip(&mut self, id: ClipId) -> Result<(), HostError> {
        let index = self.clip_index(id)?;
        self.snapshot();
        self.clips.remove(index);
        if self.active_clip == Some(id) {
            self.active_clip = None;
        }
        info!("clip removed");
        Ok(())
    }

    #[must_use]
    pub fn first_clip(&self) -> Option<ClipId> {
        self.clips.first().map(Clip::id)
    }

    /// The clip stored after `id`; `None` once the enumeration is done.
    /// Together with `first_clip` this visits every clip exactly once, in
    /// no particular order.
    pub fn next_clip(&self, id: ClipId) -> Result<Option<ClipId>, HostError> {
        let index = self.clip_index(id)?;
        Ok(self.clips.get(index + 1).map(Clip::id))
    }

    #[must_use]
    pub fn clip_with_file(&self, file: &Path) -> Option<ClipId> {
        self.clips
            .iter()
            .find(|clip| clip.source_path == file)
            .map(Clip::id)
    }

    #[must_use]
    pub fn clip_with_name(&self, name: &str) -> Option<ClipId> {
        self.clips
            .iter()
            .find(|clip| clip.name == name)
            .map(Clip::id)
    }

    pub fn clip_name(&self, id: ClipId) -> Result<&str, HostError> {
        Ok(self.clip(id)?.name.as_str())
    }

    pub fn clip_position(&self, id: ClipId) -> Result<u64, HostError> {
        Ok(self.clip(id)?.position)
    }

    pub fn clip_size(&self, id: ClipId) -> Result<u64, HostError> {
        Ok(self.clip(id)?.length)
    }

    pub fn clip_track(&self, id: ClipId) -> Result<usize, HostError> {
        Ok(self.clip(id)?.track)
    }

    #[instrument(skip(self), fields(montage = %self.core.name(), clip_id = %id, position))]
    pub fn move_clip(&mut self, id: ClipId, position: u64) -> Result<(), HostError> {
        let index = self.clip_index(id)?;
        self.snapshot();
        self.clips[index].position = position;
        info!("clip moved");
        Ok(())
    }

    /// Resizes on the timeline; a clip can never outgrow its source audio.
    #[instrument(skip(self), fields(montage = %self.core.name(), clip_id = %id, new_size))]
    pub fn resize_clip(&mut self, id: ClipId, new_size: u64) -> Result<(), HostError> {
        let index = self.clip_index(id)?;
        self.snapshot();
        let clip = &mut self.clips[index];
        let source_frames = clip.samples.iter().map(Vec::len).max().unwrap_or(0) as u64;
        clip.length = new_size.clamp(1, source_frames.max(1));
        info!(length = clip.length, "clip resized");
        Ok(())
    }

    pub fn set_clip_name(&mut self, id: ClipId, name: &str) -> Result<(), HostError> {
        let index = self.clip_index(id)?;
        self.snapshot();
        self.clips[index].name = name.to_string();
        Ok(())
    }

    pub fn set_clip_default_fade_in(&mut self, id: ClipId, fade: ClipFade) -> Result<(), HostError> {
        let index = self.clip_index(id)?;
        self.snapshot();
        self.clips[index].fade_in = Some(fade);
        Ok(())
    }

    pub fn set_clip_default_fade_out(
        &mut self,
        id: ClipId,
        fade: ClipFade,
    ) -> Result<(), HostError> {
        let index = self.clip_index(id)?;
        self.snapshot();
        self.clips[index].fade_out = Some(fade);
        Ok(())
    }

    /// Designates the single clip targeted by single-clip operations.
    /// Independent of the multi-clip selection set. Changing the active or
    /// selected clips is not an undoable edit: no snapshot is taken, and
    /// `undo` keeps reverting the last timeline change.
    pub fn select_active_clip(&mut self, id: ClipId) -> Result<(), HostError> {
        self.clip_index(id)?;
        self.active_clip = Some(id);
        Ok(())
    }

    #[must_use]
    pub fn active_clip(&self) -> Option<ClipId> {
        self.active_clip
    }

    /// Toggles the clip's membership in the selection set; other clips and
    /// the active clip are untouched. Like the active clip, this takes no
    /// undo snapshot.
    pub fn select_clip(&mut self, id: ClipId) -> Result<(), HostError> {
        let index = self.clip_index(id)?;
        self.clips[index].selected = !self.clips[index].selected;
        Ok(())
    }

    pub fn deselect_all_clips(&mut self) {
        for clip in &mut self.clips {
            clip.selected = false;
        }
    }

    #[must_use]
    pub fn selected_clips(&self) -> Vec<ClipId> {
        self.clips
            .iter()
            .filter(|clip| clip.selected)
            .map(Clip::id)
            .collect()
    }

    /// Bypasses all plug-in and fade staging at render time.
    #[instrument(skip(self), fields(montage = %self.core.name(), state))]
    pub fn bypass_plugins(&mut self, state: bool) {
        self.plugins_bypassed = state;
        info!("plugin bypass changed");
    }

    #[must_use]
    pub fn plugins_bypassed(&self) -> bool {
        self.plugins_bypassed
    }

    /// Mixes every placed clip into the output channel layout.
    fn mix_down(&self) -> Vec<Vec<f32>> {
        let frames = self.size() as usize;
        let mut output = vec![vec![0.0_f32; frames]; usize::from(self.output_channels)];
        for clip in &self.clips {
            if clip.samples.is_empty() {
                continue;
            }
            let start = clip.position as usize;
            let len = clip.length as usize;
            for (out_index, out_channel) in output.iter_mut().enumerate() {
                let source = &clip.samples[out_index % clip.samples.len()];
                for offset in 0..len.min(source.len()) {
                    let mut sample = source[offset];
                    if !self.plugins_bypassed {
                        sample *= clip_fade_gain(clip, offset as u64);
                    }
                    if let Some(slot) = out_channel.get_mut(start + offset) {
                        *slot += sample;
                    }
                }
            }
        }
        output
    }

    fn clip(&self, id: ClipId) -> Result<&Clip, HostError> {
        self.clips
            .iter()
            .find(|clip| clip.id == id)
            .ok_or(HostError::ClipNotFound(id))
    }

    fn clip_index(&self, id: ClipId) -> Result<usize, HostError> {
        self.clips
            .iter()
            .position(|clip| clip.id == id)
            .ok_or(HostError::ClipNotFound(id))
    }

    fn snapshot(&mut self) {
        self.undo = Some(MontageSnapshot {
            core: self.core.clone(),
            tracks: self.tracks.clone(),
            clips: self.clips.clone(),
            active_clip: self.active_clip,
            selected_track: self.selected_track,
        });
    }
}

impl AudioObject for Montage {
    fn core(&self) -> &AudioCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AudioCore {
        &mut self.core
    }

    fn size(&self) -> u64 {
        self.clips.iter().map(Clip::end).max().unwrap_or(0)
    }

    fn num_channels(&self) -> u16 {
        self.output_channels
    }

    fn render(
        &self,
        target: &RenderTarget,
        settings: &RenderSettings,
    ) -> Result<Vec<PathBuf>, HostError> {
        let mixed = self.mix_down();
        match target {
            RenderTarget::File(path) => {
                let channels = match self.core.selection() {
                    Some(selection) => render::slice_channels(&mixed, selection),
                    None => mixed,
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
                    let channels = render::slice_channels(&mixed, region);
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
        self.tracks = snapshot.tracks;
        self.clips = snapshot.clips;
        self.active_clip = snapshot.active_clip;
        self.selected_track = snapshot.selected_track;
        Ok(())
    }
}

fn clip_fade_gain(clip: &Clip, offset: u64) -> f32 {
    let mut gain = 1.0;
    if let Some(fade) = clip.fade_in
        && fade.length > 0
        && offset < fade.length
    {
        gain *= fade.shape.gain(offset as f32 / fade.length as f32);
    }
    if let Some(fade) = clip.fade_out
        && fade.length > 0
        && offset >= clip.length.saturating_sub(fade.length)
    {
        let into_fade = offset - clip.length.saturating_sub(fade.length);
        gain *= fade.shape.gain(1.0 - into_fade as f32 / fade.length as f32);
    }
    gain
}
