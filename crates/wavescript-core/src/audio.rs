use std::path::PathBuf;

use tracing::debug;

use crate::{
    host::HostError,
    model::{Marker, MarkerType, Selection},
    presets::{Preset, PresetLibrary},
    render::{RenderSettings, RenderTarget},
};

/// Edit state every audio object carries: cursor, selection and markers.
/// Positions are in samples; the owning object supplies its size so that
/// cursor and selection stay clamped to it.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioCore {
    name: String,
    sample_rate: u32,
    cursor: u64,
    selection: Option<Selection>,
    markers: Vec<Marker>,
}

impl AudioCore {
    #[must_use]
    pub fn new(name: impl Into<String>, sample_rate: u32) -> Self {
        Self {
            name: name.into(),
            sample_rate,
            cursor: 0,
            selection: None,
            markers: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[must_use]
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn set_cursor(&mut self, position: u64, size: u64) {
        self.cursor = position.min(size);
    }

    #[must_use]
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Clamps to the object bounds; a zero count clears the selection.
    pub fn select(&mut self, start: u64, count: u64, size: u64) {
        let start = start.min(size);
        let count = count.min(size.saturating_sub(start));
        self.selection = if count == 0 {
            None
        } else {
            Some(Selection { start, len: count })
        };
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn add_marker(&mut self, marker: Marker) {
        debug!(position = marker.position, marker_type = %marker.marker_type, "marker added");
        self.markers.push(marker);
    }

    /// Forward search for the next marker of `marker_type` at or after
    /// `from`. A start position beyond the object is never a hit.
    #[must_use]
    pub fn find_next_marker(&self, from: u64, marker_type: MarkerType, size: u64) -> Option<u64> {
        if from > size {
            return None;
        }

        self.markers
            .iter()
            .filter(|marker| marker.marker_type == marker_type && marker.position >= from)
            .map(|marker| marker.position)
            .min()
    }

    /// Regions delimited by region-start/region-end marker pairs, paired in
    /// position order. An unmatched start closes at the end of the object.
    #[must_use]
    pub fn regions(&self, size: u64) -> Vec<Selection> {
        let mut boundaries: Vec<&Marker> = self
            .markers
            .iter()
            .filter(|marker| {
                matches!(
                    marker.marker_type,
                    MarkerType::RegionStart | MarkerType::RegionEnd
                )
            })
            .collect();
        boundaries.sort_by_key(|marker| marker.position);

        let mut regions = Vec::new();
        let mut open: Option<u64> = None;
        for marker in boundaries {
            match marker.marker_type {
                MarkerType::RegionStart => {
                    if open.is_none() {
                        open = Some(marker.position);
                    }
                }
                MarkerType::RegionEnd => {
                    if let Some(start) = open.take()
                        && marker.position > start
                    {
                        regions.push(Selection {
                            start,
                            len: marker.position - start,
                        });
                    }
                }
                _ => {}
            }
        }
        if let Some(start) = open
            && size > start
        {
            regions.push(Selection {
                start,
                len: size - start,
            });
        }

        regions
    }

    /// Rewrites marker positions after `removed_len` samples at `at` were
    /// replaced by `inserted_len` samples. Markers inside the removed span
    /// are dropped.
    pub fn splice_markers(&mut self, at: u64, removed_len: u64, inserted_len: u64) {
        let removed_end = at.saturating_add(removed_len);
        self.markers.retain(|marker| {
            marker.position < at || marker.position >= removed_end || removed_len == 0
        });
        for marker in &mut self.markers {
            if marker.position >= removed_end {
                marker.position = marker.position - removed_len + inserted_len;
            }
        }
    }

    /// Keeps only markers inside `kept`, re-based to its start. A marker
    /// sitting exactly on the end boundary survives, so a region ending at
    /// the crop point stays matched.
    pub fn crop_markers(&mut self, kept: Selection) {
        self.markers
            .retain(|marker| kept.contains(marker.position) || marker.position == kept.end());
        for marker in &mut self.markers {
            marker.position -= kept.start;
        }
    }
}

/// Capability set shared by waves and montages: cursor and selection state,
/// markers, rendering and single-level undo.
pub trait AudioObject {
    fn core(&self) -> &AudioCore;
    fn core_mut(&mut self) -> &mut AudioCore;

    /// Total length in samples.
    fn size(&self) -> u64;

    fn num_channels(&self) -> u16;

    /// Renders with the currently active settings; returns the paths written.
    fn render(
        &self,
        target: &RenderTarget,
        settings: &RenderSettings,
    ) -> Result<Vec<PathBuf>, HostError>;

    /// Reverts the one most recent mutating edit.
    fn undo(&mut self) -> Result<(), HostError>;

    fn name(&self) -> &str {
        self.core().name()
    }

    fn sample_rate(&self) -> u32 {
        self.core().sample_rate()
    }

    fn cursor_position(&self) -> u64 {
        self.core().cursor()
    }

    fn set_cursor_position(&mut self, position: u64) {
        let size = self.size();
        self.core_mut().set_cursor(position, size);
    }

    fn selection(&self) -> Option<Selection> {
        self.core().selection()
    }

    fn selection_start(&self) -> Option<u64> {
        self.core().selection().map(|selection| selection.start)
    }

    fn selection_size(&self) -> u64 {
        self.core().selection().map_or(0, |selection| selection.len)
    }

    fn select(&mut self, start: u64, count: u64) {
        let size = self.size();
        self.core_mut().select(start, count, size);
    }

    fn clear_selection(&mut self) {
        self.core_mut().clear_selection();
    }

    /// Adds a marker at the cursor position.
    fn add_marker(&mut self, marker_type: MarkerType, name: &str, comment: &str) {
        let position = self.core().cursor();
        self.core_mut().add_marker(Marker {
            position,
            marker_type,
            name: name.to_string(),
            comment: comment.to_string(),
        });
    }

    fn markers(&self) -> &[Marker] {
        self.core().markers()
    }

    fn find_next_marker(&self, from: u64, marker_type: MarkerType) -> Option<u64> {
        self.core().find_next_marker(from, marker_type, self.size())
    }

    fn regions(&self) -> Vec<Selection> {
        self.core().regions(self.size())
    }

    /// Loads a stored audio-range preset and applies it as the selection.
    fn apply_audio_range_preset(
        &mut self,
        name: &str,
        presets: &PresetLibrary,
    ) -> Result<(), HostError> {
        match presets.get(name)? {
            Preset::AudioRange { start, length } => {
                let (start, length) = (*start, *length);
                self.select(start, length);
                Ok(())
            }
            other => Err(HostError::PresetKindMismatch {
                name: name.to_string(),
                expected: "audio range",
                found: other.kind(),
            }),
        }
    }
}
