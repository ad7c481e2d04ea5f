use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use tracing::{info, instrument};

use crate::{
    host::HostError,
    model::FileId,
    montage::Montage,
    wave::Wave,
};

#[derive(Debug, Clone)]
pub enum OpenObject {
    Wave(Wave),
    Montage(Montage),
}

#[derive(Debug, Clone)]
struct OpenFile {
    object: OpenObject,
    path: PathBuf,
    group: u64,
}

/// Owns every open file tab. Handles are opaque and stop being valid the
/// moment the file is closed; stale handles are rejected, never ignored.
#[derive(Debug)]
pub struct Workspace {
    files: BTreeMap<FileId, OpenFile>,
    active: Option<FileId>,
    /// Most recent activations last; used to resolve the active wave or
    /// montage when the focused tab is of the other kind.
    activation_history: Vec<FileId>,
    active_group: u64,
    next_group: u64,
    default_sample_rate: u32,
    montage_output_channels: u16,
}

impl Workspace {
    #[must_use]
    pub fn new(default_sample_rate: u32, montage_output_channels: u16) -> Self {
        Self {
            files: BTreeMap::new(),
            active: None,
            activation_history: Vec::new(),
            active_group: 0,
            next_group: 1,
            default_sample_rate,
            montage_output_channels,
        }
    }

    /// Opens a WAV file as a wave tab and focuses it.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn open_wave(&mut self, path: &Path) -> Result<FileId, HostError> {
        let wave = Wave::from_file(path)?;
        let id = self.adopt(OpenObject::Wave(wave), path.to_path_buf());
        info!(file_id = %id, "wave opened");
        Ok(id)
    }

    /// Opens a montage tab for an existing document path. The mock host does
    /// not interpret montage documents; the tab starts as an empty montage
    /// named after the file.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn open_montage(&mut self, path: &Path) -> Result<FileId, HostError> {
        if !path.is_file() {
            return Err(HostError::Io(format!(
                "montage file not found: {}",
                path.display()
            )));
        }
        let name = path
            .file_stem()
            .map_or_else(|| "untitled".to_string(), |stem| stem.to_string_lossy().into_owned());
        let montage = Montage::new(name, self.default_sample_rate, self.montage_output_channels);
        let id = self.adopt(OpenObject::Montage(montage), path.to_path_buf());
        info!(file_id = %id, "montage opened");
        Ok(id)
    }

    /// Adds an in-memory wave as an open tab; the injection seam used by
    /// fixtures and embedders.
    pub fn adopt_wave(&mut self, wave: Wave) -> FileId {
        self.adopt(OpenObject::Wave(wave), PathBuf::new())
    }

    pub fn adopt_montage(&mut self, montage: Montage) -> FileId {
        self.adopt(OpenObject::Montage(montage), PathBuf::new())
    }

    fn adopt(&mut self, object: OpenObject, path: PathBuf) -> FileId {
        let id = FileId::allocate();
        self.files.insert(
            id,
            OpenFile {
                object,
                path,
                group: self.active_group,
            },
        );
        self.focus(id);
        id
    }

    /// Switches the focused tab.
    #[instrument(skip(self), fields(file_id = %id))]
    pub fn activate_file(&mut self, id: FileId) -> Result<(), HostError> {
        if !self.files.contains_key(&id) {
            return Err(HostError::StaleFileId(id));
        }
        self.focus(id);
        Ok(())
    }

    fn focus(&mut self, id: FileId) {
        self.active = Some(id);
        self.activation_history.retain(|entry| *entry != id);
        self.activation_history.push(id);
    }

    /// Ends the handle's lifetime. Closing an already-closed handle is the
    /// same stale-handle error as any other use of it.
    #[instrument(skip(self), fields(file_id = %id))]
    pub fn close_file(&mut self, id: FileId) -> Result<(), HostError> {
        if self.files.remove(&id).is_none() {
            return Err(HostError::StaleFileId(id));
        }
        self.activation_history.retain(|entry| *entry != id);
        if self.active == Some(id) {
            self.active = self.activation_history.last().copied();
        }
        info!("file closed");
        Ok(())
    }

    /// Closes every file in the active group; returns how many were closed.
    #[instrument(skip(self))]
    pub fn close_all_files_in_active_group(&mut self) -> usize {
        let doomed: Vec<FileId> = self
            .files
            .iter()
            .filter(|(_, file)| file.group == self.active_group)
            .map(|(id, _)| *id)
            .collect();
        for id in &doomed {
            self.files.remove(id);
            self.activation_history.retain(|entry| entry != id);
        }
        if self.active.is_some_and(|active| doomed.contains(&active)) {
            self.active = self.activation_history.last().copied();
        }
        info!(closed = doomed.len(), "active group closed");
        doomed.len()
    }

    /// Creates a new file group and makes it active.
    pub fn new_file_group(&mut self) -> u64 {
        let group = self.next_group;
        self.next_group += 1;
        self.active_group = group;
        group
    }

    pub fn set_active_group(&mut self, group: u64) -> Result<(), HostError> {
        if group >= self.next_group {
            return Err(HostError::UnknownFileGroup(group));
        }
        self.active_group = group;
        Ok(())
    }

    #[must_use]
    pub fn active_group(&self) -> u64 {
        self.active_group
    }

    #[must_use]
    pub fn open_file_count(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_open(&self, id: FileId) -> bool {
        self.files.contains_key(&id)
    }

    #[must_use]
    pub fn active_file(&self) -> Option<FileId> {
        self.active
    }

    pub fn file_path(&self, id: FileId) -> Result<&Path, HostError> {
        self.files
            .get(&id)
            .map(|file| file.path.as_path())
            .ok_or(HostError::StaleFileId(id))
    }

    pub fn wave(&self, id: FileId) -> Result<&Wave, HostError> {
        match &self.files.get(&id).ok_or(HostError::StaleFileId(id))?.object {
            OpenObject::Wave(wave) => Ok(wave),
            OpenObject::Montage(_) => Err(HostError::WrongFileKind {
                id,
                expected: "wave",
            }),
        }
    }

    pub fn wave_mut(&mut self, id: FileId) -> Result<&mut Wave, HostError> {
        match &mut self
            .files
            .get_mut(&id)
            .ok_or(HostError::StaleFileId(id))?
            .object
        {
            OpenObject::Wave(wave) => Ok(wave),
            OpenObject::Montage(_) => Err(HostError::WrongFileKind {
                id,
                expected: "wave",
            }),
        }
    }

    pub fn montage(&self, id: FileId) -> Result<&Montage, HostError> {
        match &self.files.get(&id).ok_or(HostError::StaleFileId(id))?.object {
            OpenObject::Montage(montage) => Ok(montage),
            OpenObject::Wave(_) => Err(HostError::WrongFileKind {
                id,
                expected: "montage",
            }),
        }
    }

    pub fn montage_mut(&mut self, id: FileId) -> Result<&mut Montage, HostError> {
        match &mut self
            .files
            .get_mut(&id)
            .ok_or(HostError::StaleFileId(id))?
            .object
        {
            OpenObject::Montage(montage) => Ok(montage),
            OpenObject::Wave(_) => Err(HostError::WrongFileKind {
                id,
                expected: "montage",
            }),
        }
    }

    /// The wave in the focused tab, else the most recently activated wave
    /// still open.
    #[must_use]
    pub fn active_wave_id(&self) -> Option<FileId> {
        self.activation_history
            .iter()
            .rev()
            .copied()
            .find(|id| {
                matches!(
                    self.files.get(id),
                    Some(OpenFile {
                        object: OpenObject::Wave(_),
                        ..
                    })
                )
            })
    }

    #[must_use]
    pub fn active_montage_id(&self) -> Option<FileId> {
        self.activation_history
            .iter()
            .rev()
            .copied()
            .find(|id| {
                matches!(
                    self.files.get(id),
                    Some(OpenFile {
                        object: OpenObject::Montage(_),
                        ..
                    })
                )
            })
    }

    #[must_use]
    pub fn active_wave(&self) -> Option<&Wave> {
        self.active_wave_id().and_then(|id| self.wave(id).ok())
    }

    pub fn active_wave_mut(&mut self) -> Option<&mut Wave> {
        let id = self.active_wave_id()?;
        self.wave_mut(id).ok()
    }

    #[must_use]
    pub fn active_montage(&self) -> Option<&Montage> {
        self.active_montage_id().and_then(|id| self.montage(id).ok())
    }

    pub fn active_montage_mut(&mut self) -> Option<&mut Montage> {
        let id = self.active_montage_id()?;
        self.montage_mut(id).ok()
    }
}
