use std::f32::consts::TAU;

use crate::{
    audio::AudioObject,
    host::Host,
    logwin::LogWindow,
    model::{FileId, MarkerType, RippleMode},
    montage::Montage,
    wave::Wave,
};

pub const FIXTURE_SAMPLE_RATE: u32 = 48_000;
pub const FIXTURE_WAVE_FRAMES: usize = 9_600;

/// A deterministic stereo test wave: 440 Hz sine left, linear ramp right,
/// with two regions, a loop and a generic marker.
#[must_use]
pub fn demo_wave() -> Wave {
    let left: Vec<f32> = (0..FIXTURE_WAVE_FRAMES)
        .map(|frame| {
            let t = frame as f32 / FIXTURE_SAMPLE_RATE as f32;
            0.5 * (TAU * 440.0 * t).sin()
        })
        .collect();
    let right: Vec<f32> = (0..FIXTURE_WAVE_FRAMES)
        .map(|frame| 0.9 * frame as f32 / FIXTURE_WAVE_FRAMES as f32)
        .collect();

    let mut wave = Wave::from_samples("Demo Take", FIXTURE_SAMPLE_RATE, vec![left, right]);
    for (position, marker_type, name) in [
        (0, MarkerType::Generic, "start"),
        (1_000, MarkerType::RegionStart, "verse"),
        (3_000, MarkerType::RegionEnd, "verse"),
        (2_000, MarkerType::LoopStart, "loop"),
        (4_000, MarkerType::LoopEnd, "loop"),
        (5_000, MarkerType::RegionStart, "chorus"),
        (8_000, MarkerType::RegionEnd, "chorus"),
    ] {
        wave.set_cursor_position(position);
        wave.add_marker(marker_type, name, "");
    }
    wave.set_cursor_position(0);
    wave
}

/// A two-track montage holding three short clips at known positions.
#[must_use]
pub fn demo_montage() -> Montage {
    let mut montage = Montage::new("Demo Montage", FIXTURE_SAMPLE_RATE, 2);
    montage.insert_stereo_track(0);
    montage.insert_mono_track(1);

    let clips = [
        ("Intro", 0_usize, 0_u64, 220.0_f32, 1_200_usize),
        ("Verse", 0, 1_000, 330.0, 800),
        ("Outro", 1, 2_500, 110.0, 400),
    ];
    for (name, track, position, frequency, frames) in clips {
        let samples = vec![tone(frequency, frames)];
        montage
            .insert_clip_from_samples(track, position, name, samples, RippleMode::NoShift)
            .expect("fixture clip should insert");
    }
    montage
}

pub struct DemoHost {
    pub host: Host,
    pub wave: FileId,
    pub montage: FileId,
}

/// A ready-made host session with the demo wave and montage adopted and the
/// log window open.
#[must_use]
pub fn demo_host() -> DemoHost {
    let mut host = Host::default();
    host.log_window = LogWindow::open();
    let wave = host.workspace.adopt_wave(demo_wave());
    let montage = host.workspace.adopt_montage(demo_montage());
    DemoHost {
        host,
        wave,
        montage,
    }
}

fn tone(frequency: f32, frames: usize) -> Vec<f32> {
    (0..frames)
        .map(|frame| {
            let t = frame as f32 / FIXTURE_SAMPLE_RATE as f32;
            0.4 * (TAU * frequency * t).sin()
        })
        .collect()
}
