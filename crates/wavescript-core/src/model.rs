use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A script-facing token that is not part of its closed set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {set} token: {token:?}")]
pub struct UnknownToken {
    pub set: &'static str,
    pub token: String,
}

/// Marker annotation kinds. Scripts pass these as spelled tokens
/// (`"cdTrackStart"`, `"loopEnd"`, ...); anything else is rejected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum MarkerType {
    Generic,
    Temporary,
    CdTrackStart,
    CdTrackEnd,
    CdTrackFrontier,
    CdTrackIndex,
    LoopStart,
    LoopEnd,
    MuteStart,
    MuteEnd,
    PlaybackStarter,
    RegionStart,
    RegionEnd,
    ErrorStart,
    ErrorEnd,
    CorrectionStart,
    CorrectionEnd,
}

impl MarkerType {
    pub const ALL: [Self; 17] = [
        Self::Generic,
        Self::Temporary,
        Self::CdTrackStart,
        Self::CdTrackEnd,
        Self::CdTrackFrontier,
        Self::CdTrackIndex,
        Self::LoopStart,
        Self::LoopEnd,
        Self::MuteStart,
        Self::MuteEnd,
        Self::PlaybackStarter,
        Self::RegionStart,
        Self::RegionEnd,
        Self::ErrorStart,
        Self::ErrorEnd,
        Self::CorrectionStart,
        Self::CorrectionEnd,
    ];

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Temporary => "temporary",
            Self::CdTrackStart => "cdTrackStart",
            Self::CdTrackEnd => "cdTrackEnd",
            Self::CdTrackFrontier => "cdTrackFrontier",
            Self::CdTrackIndex => "cdTrackIndex",
            Self::LoopStart => "loopStart",
            Self::LoopEnd => "loopEnd",
            Self::MuteStart => "muteStart",
            Self::MuteEnd => "muteEnd",
            Self::PlaybackStarter => "playbackStarter",
            Self::RegionStart => "regionStart",
            Self::RegionEnd => "regionEnd",
            Self::ErrorStart => "errorStart",
            Self::ErrorEnd => "errorEnd",
            Self::CorrectionStart => "correctionStart",
            Self::CorrectionEnd => "correctionEnd",
        }
    }
}

impl FromStr for MarkerType {
    type Err = UnknownToken;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|marker_type| marker_type.token() == token)
            .ok_or_else(|| UnknownToken {
                set: "marker type",
                token: token.to_string(),
            })
    }
}

impl fmt::Display for MarkerType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.token())
    }
}

/// Gain curve applied by fade edits over a normalized 0..=1 progress.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum FadeShape {
    Linear,
    Sinus,
    SquareRoot,
    Sinusoid,
    Log,
    Exp,
    Expp,
}

impl FadeShape {
    pub const ALL: [Self; 7] = [
        Self::Linear,
        Self::Sinus,
        Self::SquareRoot,
        Self::Sinusoid,
        Self::Log,
        Self::Exp,
        Self::Expp,
    ];

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Sinus => "sinus",
            Self::SquareRoot => "squareRoot",
            Self::Sinusoid => "sinusoid",
            Self::Log => "log",
            Self::Exp => "exp",
            Self::Expp => "expp",
        }
    }

    /// Gain at progress `t` in `0..=1`; every shape maps 0 to silence and
    /// 1 to unity.
    #[must_use]
    pub fn gain(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Sinus => (t * std::f32::consts::FRAC_PI_2).sin(),
            Self::SquareRoot => t.sqrt(),
            Self::Sinusoid => (1.0 - (t * std::f32::consts::PI).cos()) / 2.0,
            Self::Log => (1.0 + 9.0 * t).log10(),
            Self::Exp => t * t,
            Self::Expp => t * t * t,
        }
    }
}

impl FromStr for FadeShape {
    type Err = UnknownToken;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|shape| shape.token() == token)
            .ok_or_else(|| UnknownToken {
                set: "fade shape",
                token: token.to_string(),
            })
    }
}

/// Policy for displacing neighbouring clips when a new clip is inserted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RippleMode {
    #[serde(rename = "autoShiftNo")]
    NoShift,
    #[serde(rename = "autoShiftTrack")]
    ShiftTrack,
    #[serde(rename = "autoShiftGlobal")]
    ShiftGlobal,
}

impl RippleMode {
    pub const ALL: [Self; 3] = [Self::NoShift, Self::ShiftTrack, Self::ShiftGlobal];

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::NoShift => "autoShiftNo",
            Self::ShiftTrack => "autoShiftTrack",
            Self::ShiftGlobal => "autoShiftGlobal",
        }
    }
}

impl FromStr for RippleMode {
    type Err = UnknownToken;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.token() == token)
            .ok_or_else(|| UnknownToken {
                set: "ripple mode",
                token: token.to_string(),
            })
    }
}

/// Channel scope for wave edits and the cursor channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Channel {
    #[serde(rename = "leftCh")]
    Left,
    #[serde(rename = "rightCh")]
    Right,
    #[serde(rename = "allCh")]
    All,
}

impl Channel {
    pub const ALL: [Self; 3] = [Self::Left, Self::Right, Self::All];

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Left => "leftCh",
            Self::Right => "rightCh",
            Self::All => "allCh",
        }
    }
}

impl FromStr for Channel {
    type Err = UnknownToken;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|channel| channel.token() == token)
            .ok_or_else(|| UnknownToken {
                set: "channel",
                token: token.to_string(),
            })
    }
}

/// Position annotation on an audio object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Marker {
    pub position: u64,
    pub marker_type: MarkerType,
    pub name: String,
    pub comment: String,
}

/// Non-empty sample range, in samples from the start of the object.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Selection {
    pub start: u64,
    pub len: u64,
}

impl Selection {
    #[must_use]
    pub const fn end(self) -> u64 {
        self.start.saturating_add(self.len)
    }

    #[must_use]
    pub const fn contains(self, position: u64) -> bool {
        position >= self.start && position < self.end()
    }
}

/// Opaque montage-scoped clip identifier. Never zero; only valid while the
/// clip it names still exists in its montage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ClipId(pub(crate) u64);

impl fmt::Display for ClipId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "clip#{}", self.0)
    }
}

/// Opaque handle naming an open file in the workspace. Only valid while the
/// file remains open; never reused across sessions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct FileId(Uuid);

impl FileId {
    #[must_use]
    pub(crate) fn allocate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_tokens_round_trip() {
        for marker_type in MarkerType::ALL {
            assert_eq!(marker_type.token().parse::<MarkerType>(), Ok(marker_type));
        }
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        assert!("cdtrackstart".parse::<MarkerType>().is_err());
        assert!("cosine".parse::<FadeShape>().is_err());
        assert!("autoShift".parse::<RippleMode>().is_err());
        assert!("midCh".parse::<Channel>().is_err());
    }

    #[test]
    fn serde_spelling_matches_script_tokens() {
        let json = serde_json::to_string(&MarkerType::CdTrackFrontier).expect("serialize");
        assert_eq!(json, "\"cdTrackFrontier\"");
        let json = serde_json::to_string(&RippleMode::ShiftGlobal).expect("serialize");
        assert_eq!(json, "\"autoShiftGlobal\"");
        let json = serde_json::to_string(&Channel::Left).expect("serialize");
        assert_eq!(json, "\"leftCh\"");
    }

    #[test]
    fn fade_shapes_span_silence_to_unity() {
        for shape in FadeShape::ALL {
            assert!(shape.gain(0.0).abs() < 1e-6, "{shape:?} at 0");
            assert!((shape.gain(1.0) - 1.0).abs() < 1e-6, "{shape:?} at 1");
            assert!(shape.gain(0.5) > 0.0 && shape.gain(0.5) <= 1.0);
        }
    }

    #[test]
    fn selection_bounds_are_half_open() {
        let selection = Selection { start: 10, len: 5 };
        assert!(selection.contains(10));
        assert!(selection.contains(14));
        assert!(!selection.contains(15));
        assert_eq!(selection.end(), 15);
    }
}
