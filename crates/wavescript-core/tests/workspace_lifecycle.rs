use std::io::Write;

use hound::{SampleFormat, WavSpec, WavWriter};
use tempfile::NamedTempFile;
use wavescript_core::{
    AudioObject, HostError, Wave, Workspace,
    fixtures::{demo_montage, demo_wave},
};

fn fresh_workspace() -> Workspace {
    Workspace::new(48_000, 2)
}

fn temp_wav(frames: u32) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".wav")
        .tempfile()
        .expect("temp wav file");
    let spec = WavSpec {
        channels: 1,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(file.path(), spec).expect("wav writer");
    for frame in 0..frames {
        let sample = (f64::from(frame) * 0.01).sin();
        writer
            .write_sample((sample * 8_000.0) as i16)
            .expect("write sample");
    }
    writer.finalize().expect("finalize wav");
    file
}

#[test]
fn open_wave_decodes_and_focuses_the_file() {
    let mut workspace = fresh_workspace();
    let file = temp_wav(1_024);

    let id = workspace.open_wave(file.path()).expect("open");

    assert_eq!(workspace.active_file(), Some(id));
    let wave = workspace.wave(id).expect("wave access");
    assert_eq!(wave.size(), 1_024);
    assert_eq!(wave.sample_rate(), 44_100);
    assert_eq!(wave.num_channels(), 1);
}

#[test]
fn closed_handles_are_rejected_everywhere() {
    let mut workspace = fresh_workspace();
    let id = workspace.adopt_wave(demo_wave());

    workspace.close_file(id).expect("close");

    assert!(matches!(workspace.wave(id), Err(HostError::StaleFileId(_))));
    assert!(matches!(
        workspace.activate_file(id),
        Err(HostError::StaleFileId(_))
    ));
    assert!(matches!(
        workspace.close_file(id),
        Err(HostError::StaleFileId(_))
    ));
}

#[test]
fn handle_kind_is_checked() {
    let mut workspace = fresh_workspace();
    let wave = workspace.adopt_wave(demo_wave());
    let montage = workspace.adopt_montage(demo_montage());

    assert!(matches!(
        workspace.montage(wave),
        Err(HostError::WrongFileKind { .. })
    ));
    assert!(matches!(
        workspace.wave_mut(montage),
        Err(HostError::WrongFileKind { .. })
    ));
}

#[test]
fn active_wave_falls_back_to_the_last_activated_wave() {
    let mut workspace = fresh_workspace();
    let first_wave = workspace.adopt_wave(demo_wave());
    let second_wave = workspace.adopt_wave(Wave::from_samples("scratch", 48_000, vec![vec![0.0; 10]]));
    let montage = workspace.adopt_montage(demo_montage());

    // The montage tab has focus, but the wave surface still resolves.
    assert_eq!(workspace.active_file(), Some(montage));
    assert_eq!(workspace.active_wave_id(), Some(second_wave));

    workspace.activate_file(first_wave).expect("activate");
    workspace.activate_file(montage).expect("activate");
    assert_eq!(workspace.active_wave_id(), Some(first_wave));

    workspace.close_file(first_wave).expect("close");
    assert_eq!(workspace.active_wave_id(), Some(second_wave));
}

#[test]
fn closing_the_focused_tab_moves_focus_back() {
    let mut workspace = fresh_workspace();
    let first = workspace.adopt_wave(demo_wave());
    let second = workspace.adopt_wave(demo_wave());

    assert_eq!(workspace.active_file(), Some(second));
    workspace.close_file(second).expect("close");
    assert_eq!(workspace.active_file(), Some(first));

    workspace.close_file(first).expect("close");
    assert_eq!(workspace.active_file(), None);
    assert_eq!(workspace.active_wave_id(), None);
}

#[test]
fn file_groups_scope_bulk_close() {
    let mut workspace = fresh_workspace();
    let in_default = workspace.adopt_wave(demo_wave());

    let group = workspace.new_file_group();
    assert_eq!(workspace.active_group(), group);
    let in_group_a = workspace.adopt_wave(demo_wave());
    let in_group_b = workspace.adopt_montage(demo_montage());

    assert_eq!(workspace.close_all_files_in_active_group(), 2);
    assert!(!workspace.is_open(in_group_a));
    assert!(!workspace.is_open(in_group_b));
    assert!(workspace.is_open(in_default));
    assert_eq!(workspace.open_file_count(), 1);
}

#[test]
fn switching_back_to_an_earlier_group() {
    let mut workspace = fresh_workspace();
    let first_group = workspace.active_group();
    workspace.new_file_group();

    workspace.set_active_group(first_group).expect("switch back");
    assert_eq!(workspace.active_group(), first_group);

    assert!(matches!(
        workspace.set_active_group(99),
        Err(HostError::UnknownFileGroup(99))
    ));
}

#[test]
fn open_montage_requires_an_existing_document() {
    let mut workspace = fresh_workspace();

    let missing = std::env::temp_dir().join("definitely-not-here.mon");
    assert!(matches!(
        workspace.open_montage(&missing),
        Err(HostError::Io(_))
    ));

    let mut doc = NamedTempFile::new().expect("temp montage doc");
    doc.write_all(b"montage document placeholder")
        .expect("write placeholder");
    let id = workspace.open_montage(doc.path()).expect("open");
    let montage = workspace.montage(id).expect("montage access");
    assert_eq!(montage.num_tracks(), 0);
    assert_eq!(workspace.active_montage_id(), Some(id));
}
