use wavescript_core::{
    AudioObject, Channel, Clipboard, FadeShape, HostError, MarkerType, Preset, PresetLibrary,
    Wave, fixtures::demo_wave, units::db_to_gain,
};

fn constant_wave(value: f32, frames: usize) -> Wave {
    Wave::from_samples(
        "constant",
        48_000,
        vec![vec![value; frames], vec![value; frames]],
    )
}

#[test]
fn range_edits_without_a_selection_are_rejected() {
    let presets = PresetLibrary::builtin();
    let mut wave = demo_wave();

    assert!(matches!(
        wave.fade_in(FadeShape::Linear),
        Err(HostError::EmptySelection)
    ));
    assert!(matches!(wave.remove(), Err(HostError::EmptySelection)));
    assert!(matches!(
        wave.normalize("Peak -1 dB", &presets),
        Err(HostError::EmptySelection)
    ));
}

#[test]
fn fade_in_silences_the_start_and_keeps_the_end() {
    let mut wave = constant_wave(0.8, 1_000);
    wave.select(0, 1_000);
    wave.fade_in(FadeShape::Linear).expect("fade should apply");

    let samples = wave.read_samples(0, 0, 1_000).expect("read should succeed");
    assert!(samples[0].abs() < 1e-6);
    assert!((samples[999] - 0.8).abs() < 1e-6);
    assert!(samples[499] < 0.8);
}

#[test]
fn change_level_scales_only_the_selection() {
    let mut wave = constant_wave(0.5, 1_000);
    wave.select(200, 100);
    wave.change_level(-6.0).expect("level change should apply");

    let samples = wave.read_samples(0, 0, 1_000).expect("read should succeed");
    assert!((samples[100] - 0.5).abs() < 1e-6);
    assert!((samples[250] - 0.25).abs() < 0.01);
    assert!((samples[400] - 0.5).abs() < 1e-6);
}

#[test]
fn normalize_hits_the_preset_peak() {
    let presets = PresetLibrary::builtin();
    let mut wave = constant_wave(0.25, 500);
    wave.select(0, 500);
    wave.normalize("Peak -1 dB", &presets)
        .expect("normalize should apply");

    let samples = wave.read_samples(0, 0, 500).expect("read should succeed");
    let peak = samples.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()));
    let target = db_to_gain(-1.0);
    assert!((peak - target).abs() < 1e-4);
}

#[test]
fn normalize_loudness_hits_the_preset_rms() {
    let presets = PresetLibrary::builtin();
    let mut wave = constant_wave(0.5, 500);
    wave.select(0, 500);
    wave.normalize_loudness("Broadcast Loudness", &presets)
        .expect("loudness normalize should apply");

    // A constant signal's RMS is its level, so every sample lands on the
    // preset target.
    let samples = wave.read_samples(0, 0, 500).expect("read should succeed");
    let target = db_to_gain(-18.0);
    assert!((samples[250] - target).abs() < 1e-3);
}

#[test]
fn center_balance_matches_the_channel_peaks() {
    let presets = PresetLibrary::builtin();
    let mut wave = Wave::from_samples(
        "lopsided",
        48_000,
        vec![vec![0.8; 400], vec![0.2; 400]],
    );
    wave.select(0, 400);
    wave.normalize_pan("Center Balance", &presets)
        .expect("pan normalize should apply");

    let left = wave.read_samples(0, 0, 400).expect("left read");
    let right = wave.read_samples(1, 0, 400).expect("right read");
    assert!((left[100] - 0.8).abs() < 1e-4);
    assert!((right[100] - 0.8).abs() < 1e-4);
}

#[test]
fn normalize_with_wrong_preset_kind_is_rejected() {
    let presets = PresetLibrary::builtin();
    let mut wave = constant_wave(0.25, 500);
    wave.select(0, 500);

    assert!(matches!(
        wave.normalize("Soft Morph", &presets),
        Err(HostError::PresetKindMismatch { .. })
    ));
}

#[test]
fn cursor_channel_scopes_gain_edits() {
    let mut wave = constant_wave(0.5, 400);
    wave.set_cursor_channel(Channel::Left)
        .expect("left channel should exist");
    wave.select(0, 400);
    wave.mute().expect("mute should apply");

    let left = wave.read_samples(0, 0, 400).expect("left read");
    let right = wave.read_samples(1, 0, 400).expect("right read");
    assert!(left.iter().all(|s| s.abs() < 1e-6));
    assert!(right.iter().all(|s| (s - 0.5).abs() < 1e-6));
}

#[test]
fn right_channel_cursor_needs_a_second_channel() {
    let mut mono = Wave::from_samples("mono", 48_000, vec![vec![0.1; 100]]);
    assert!(matches!(
        mono.set_cursor_channel(Channel::Right),
        Err(HostError::BadChannel { .. })
    ));
}

#[test]
fn remove_shortens_and_shifts_markers() {
    let mut wave = demo_wave();
    let size = wave.size();

    // Remove 1000 samples ahead of the chorus region markers.
    wave.select(3_500, 1_000);
    wave.remove().expect("remove should apply");

    assert_eq!(wave.size(), size - 1_000);
    assert_eq!(
        wave.find_next_marker(0, MarkerType::RegionStart),
        Some(1_000),
        "earlier markers stay put"
    );
    assert_eq!(
        wave.find_next_marker(2_000, MarkerType::RegionStart),
        Some(4_000),
        "later markers shift left"
    );
    assert_eq!(wave.selection_start(), None);
    assert_eq!(wave.cursor_position(), 3_500);
}

#[test]
fn remove_soft_crossfades_the_boundary() {
    let mut wave = constant_wave(0.5, 2_000);
    wave.select(500, 1_000);
    wave.remove_soft(100).expect("soft remove should apply");

    // A hard remove would leave 1000 samples; the crossfade eats another 100.
    assert_eq!(wave.size(), 900);
    let samples = wave.read_samples(0, 0, 900).expect("read should succeed");
    // Equal-power blend of two identical signals overshoots unity slightly
    // but stays continuous; nothing should drop toward silence.
    let boundary = &samples[380..420];
    assert!(boundary.iter().all(|s| s.abs() > 0.4));
}

#[test]
fn trim_keeps_only_the_selection() {
    let mut wave = demo_wave();
    wave.select(1_000, 2_000);
    wave.trim().expect("trim should apply");

    assert_eq!(wave.size(), 2_000);
    // The verse region sat exactly on the trim boundaries; both markers
    // survive, so the region stays matched.
    assert_eq!(wave.find_next_marker(0, MarkerType::RegionStart), Some(0));
    assert_eq!(wave.find_next_marker(0, MarkerType::RegionEnd), Some(2_000));
    assert_eq!(wave.find_next_marker(0, MarkerType::LoopStart), Some(1_000));
    assert_eq!(wave.find_next_marker(0, MarkerType::LoopEnd), None);
    assert_eq!(wave.regions().len(), 1);
    assert_eq!(wave.selection_size(), 2_000);
}

#[test]
fn undo_restores_exactly_one_edit() {
    let mut wave = demo_wave();
    let before = wave.read_samples(0, 0, 100).expect("read before");

    wave.select(0, 100);
    wave.change_level(-12.0).expect("first edit");
    wave.select(0, 100);
    wave.mute().expect("second edit");

    wave.undo().expect("undo should restore the mute");
    let after_undo = wave.read_samples(0, 0, 100).expect("read after undo");
    assert_ne!(before, after_undo, "the level change is still in effect");

    assert!(matches!(wave.undo(), Err(HostError::NothingToUndo)));
}

#[test]
fn read_samples_rejects_out_of_range_requests() {
    let wave = demo_wave();
    let size = wave.size();

    assert!(matches!(
        wave.read_samples(0, size - 10, 11),
        Err(HostError::RangeOutOfBounds { .. })
    ));
    assert!(matches!(
        wave.read_samples(7, 0, 10),
        Err(HostError::BadChannel { .. })
    ));
    assert_eq!(
        wave.read_samples(0, size, 0).expect("empty read at end").len(),
        0
    );
}

#[test]
fn clipboard_cut_and_paste_round_trip() {
    let mut clipboard = Clipboard::default();
    let mut wave = constant_wave(0.5, 1_000);

    wave.select(100, 200);
    wave.cut(&mut clipboard).expect("cut should apply");
    assert_eq!(wave.size(), 800);
    assert_eq!(clipboard.frames(), 200);

    wave.set_cursor_position(0);
    wave.clear_selection();
    wave.paste(&clipboard).expect("paste should apply");
    assert_eq!(wave.size(), 1_000);
    assert_eq!(wave.selection_start(), Some(0));
    assert_eq!(wave.selection_size(), 200);
}

#[test]
fn paste_from_an_empty_clipboard_is_rejected() {
    let clipboard = Clipboard::default();
    let mut wave = constant_wave(0.5, 100);
    assert!(matches!(
        wave.paste(&clipboard),
        Err(HostError::EmptyClipboard)
    ));
}

#[test]
fn swap_channels_exchanges_left_and_right() {
    let mut wave = Wave::from_samples(
        "panned",
        48_000,
        vec![vec![0.9; 100], vec![0.1; 100]],
    );
    wave.swap_channels().expect("swap should apply");

    assert!((wave.read_samples(0, 0, 1).expect("read")[0] - 0.1).abs() < 1e-6);
    assert!((wave.read_samples(1, 0, 1).expect("read")[0] - 0.9).abs() < 1e-6);
}

#[test]
fn pitch_transforms_preserve_length_and_selection() {
    let presets = PresetLibrary::builtin();
    let mut wave = demo_wave();
    wave.select(200, 400);

    wave.pitch_bend("Up One Semitone", &presets)
        .expect("bend should apply");
    wave.pitch_correction("Gentle Correction", &presets)
        .expect("correction should apply");
    wave.pitch_quantize("Snap To Pitch", &presets)
        .expect("quantize should apply");

    assert_eq!(wave.size(), demo_wave().size());
    assert_eq!(wave.selection_start(), Some(200));
    assert_eq!(wave.selection_size(), 400);
}

#[test]
fn morph_blends_toward_the_filtered_signal() {
    let presets = PresetLibrary::builtin();
    let mut wave = constant_wave(0.5, 1_000);
    wave.select(0, 1_000);
    wave.morph("Soft Morph", &presets).expect("morph should apply");

    let samples = wave.read_samples(0, 0, 1_000).expect("read should succeed");
    // The filter state starts at zero, so the very first sample is pulled
    // down; by the end it has converged back to the input.
    assert!((samples[0] - 0.3).abs() < 1e-6);
    assert!((samples[999] - 0.5).abs() < 1e-3);
    assert_eq!(wave.size(), 1_000);
}

#[test]
fn silence_preset_zeroes_only_the_selection() {
    let presets = PresetLibrary::builtin();
    let mut wave = constant_wave(0.5, 1_000);
    wave.select(100, 200);
    wave.silence("Silence", &presets).expect("silence should apply");

    let samples = wave.read_samples(0, 0, 1_000).expect("read should succeed");
    assert!((samples[50] - 0.5).abs() < 1e-6);
    assert!(samples[150].abs() < 1e-6);
    assert!((samples[350] - 0.5).abs() < 1e-6);
    assert_eq!(wave.size(), 1_000);
}

#[test]
fn silence_insert_grows_the_wave_and_shifts_markers() {
    let presets = PresetLibrary::builtin();
    let mut wave = constant_wave(0.5, 1_000);
    wave.set_cursor_position(600);
    wave.add_marker(MarkerType::Generic, "late", "");

    wave.set_cursor_position(400);
    wave.silence("Insert One Second", &presets)
        .expect("insert should apply");

    // One second at 48 kHz.
    assert_eq!(wave.size(), 49_000);
    assert_eq!(wave.selection_start(), Some(400));
    assert_eq!(wave.selection_size(), 48_000);
    assert_eq!(wave.find_next_marker(0, MarkerType::Generic), Some(48_600));

    let samples = wave.read_samples(0, 0, 49_000).expect("read should succeed");
    assert!((samples[399] - 0.5).abs() < 1e-6);
    assert!(samples[500].abs() < 1e-6);
    assert!((samples[48_500] - 0.5).abs() < 1e-6);
}

#[test]
fn level_envelope_dips_mid_selection() {
    let presets = PresetLibrary::builtin();
    let mut wave = constant_wave(0.5, 1_000);
    wave.select(0, 1_000);
    wave.level_envelope("Fade Through", &presets)
        .expect("envelope should apply");

    let samples = wave.read_samples(0, 0, 1_000).expect("read should succeed");
    assert!((samples[0] - 0.5).abs() < 1e-4);
    assert!((samples[999] - 0.5).abs() < 1e-4);
    let mid_target = 0.5 * db_to_gain(-12.0);
    assert!((samples[500] - mid_target).abs() < 5e-3);
}

#[test]
fn invert_phase_negates_the_selection() {
    let mut wave = constant_wave(0.5, 300);
    wave.select(100, 100);
    wave.invert_phase().expect("invert should apply");

    let samples = wave.read_samples(0, 0, 300).expect("read should succeed");
    assert!((samples[50] - 0.5).abs() < 1e-6);
    assert!((samples[150] + 0.5).abs() < 1e-6);
}

#[test]
fn remove_dc_offset_centers_the_selection() {
    let mut wave = constant_wave(0.5, 500);
    wave.select(0, 500);
    wave.remove_dc_offset().expect("offset removal should apply");

    let samples = wave.read_samples(0, 0, 500).expect("read should succeed");
    assert!(samples.iter().all(|s| s.abs() < 1e-6));
}

#[test]
fn audio_range_preset_becomes_the_selection() {
    let mut presets = PresetLibrary::builtin();
    presets.insert(
        "Mix Range",
        Preset::AudioRange {
            start: 100,
            length: 400,
        },
    );
    let mut wave = demo_wave();

    wave.apply_audio_range_preset("Mix Range", &presets)
        .expect("range preset should apply");
    assert_eq!(wave.selection_start(), Some(100));
    assert_eq!(wave.selection_size(), 400);

    assert!(matches!(
        wave.apply_audio_range_preset("Silence", &presets),
        Err(HostError::PresetKindMismatch { .. })
    ));
}

#[test]
fn time_stretch_changes_the_selection_length() {
    let presets = PresetLibrary::builtin();
    let mut wave = constant_wave(0.3, 1_000);
    wave.select(200, 400);
    wave.time_stretch("Half Speed", &presets)
        .expect("stretch should apply");

    assert_eq!(wave.size(), 1_400);
    assert_eq!(wave.selection_size(), 800);
}
