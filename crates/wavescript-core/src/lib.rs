pub mod application;
pub mod audio;
pub mod config;
pub mod diagnostics;
pub mod fixtures;
pub mod host;
pub mod logwin;
pub mod model;
pub mod montage;
pub mod presets;
pub mod render;
pub mod sound;
pub mod units;
pub mod wave;
pub mod workspace;

pub use application::Application;
pub use audio::{AudioCore, AudioObject};
pub use config::HostConfig;
pub use diagnostics::{TelemetryGuard, init_tracing, init_tracing_with_options};
pub use host::{Host, HostError, MasterSection, MontageEditor, WaveEditor};
pub use logwin::{LogEntry, LogLevel, LogWindow};
pub use model::{
    Channel, ClipId, FadeShape, FileId, Marker, MarkerType, RippleMode, Selection, UnknownToken,
};
pub use montage::{Clip, ClipFade, Montage, Track, TrackChannels};
pub use presets::{BitDepth, EnvelopePoint, Preset, PresetLibrary};
pub use render::{RenderSettings, RenderTarget};
pub use sound::DecodedAudio;
pub use wave::{Clipboard, Wave};
pub use workspace::{OpenObject, Workspace};

pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;
