use proptest::prelude::*;
use wavescript_core::{
    AudioObject, Clipboard, FadeShape, Montage, RippleMode, Wave,
};

#[derive(Debug, Clone)]
enum WaveOp {
    Select { start: u64, count: u64 },
    SetCursor(u64),
    FadeIn,
    ChangeLevel(f32),
    Remove,
    RemoveSoft(u64),
    Trim,
    Reverse,
    Copy,
    Cut,
    Paste,
    Undo,
}

fn wave_op() -> impl Strategy<Value = WaveOp> {
    prop_oneof![
        (0_u64..6_000, 0_u64..6_000).prop_map(|(start, count)| WaveOp::Select { start, count }),
        (0_u64..6_000).prop_map(WaveOp::SetCursor),
        Just(WaveOp::FadeIn),
        (-24.0_f32..24.0).prop_map(WaveOp::ChangeLevel),
        Just(WaveOp::Remove),
        (0_u64..500).prop_map(WaveOp::RemoveSoft),
        Just(WaveOp::Trim),
        Just(WaveOp::Reverse),
        Just(WaveOp::Copy),
        Just(WaveOp::Cut),
        Just(WaveOp::Paste),
        Just(WaveOp::Undo),
    ]
}

#[derive(Debug, Clone)]
enum MontageOp {
    InsertTrack(usize),
    InsertClip { track: usize, position: u64, frames: usize, mode: u8 },
    MoveFirst(u64),
    ResizeFirst(u64),
    RemoveFirst,
    Undo,
}

fn montage_op() -> impl Strategy<Value = MontageOp> {
    prop_oneof![
        (0_usize..4).prop_map(MontageOp::InsertTrack),
        (0_usize..4, 0_u64..10_000, 1_usize..400, 0_u8..3).prop_map(
            |(track, position, frames, mode)| MontageOp::InsertClip {
                track,
                position,
                frames,
                mode,
            }
        ),
        (0_u64..10_000).prop_map(MontageOp::MoveFirst),
        (0_u64..1_000).prop_map(MontageOp::ResizeFirst),
        Just(MontageOp::RemoveFirst),
        Just(MontageOp::Undo),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// Any script, valid or not, may only produce errors; the session must
    /// survive and its selection must stay inside the buffer.
    #[test]
    fn wave_sessions_never_panic(ops in proptest::collection::vec(wave_op(), 0..40)) {
        let mut wave = Wave::from_samples(
            "prop",
            48_000,
            vec![vec![0.25_f32; 4_096], vec![-0.25; 4_096]],
        );
        let mut clipboard = Clipboard::default();

        for op in ops {
            // Errors are legal outcomes; panics are not.
            let _ = match op {
                WaveOp::Select { start, count } => {
                    wave.select(start, count);
                    Ok(())
                }
                WaveOp::SetCursor(position) => {
                    wave.set_cursor_position(position);
                    Ok(())
                }
                WaveOp::FadeIn => wave.fade_in(FadeShape::Sinus),
                WaveOp::ChangeLevel(db) => wave.change_level(db),
                WaveOp::Remove => wave.remove(),
                WaveOp::RemoveSoft(crossfade) => wave.remove_soft(crossfade),
                WaveOp::Trim => wave.trim(),
                WaveOp::Reverse => wave.reverse(),
                WaveOp::Copy => wave.copy(&mut clipboard),
                WaveOp::Cut => wave.cut(&mut clipboard),
                WaveOp::Paste => wave.paste(&clipboard),
                WaveOp::Undo => wave.undo(),
            };

            let size = wave.size();
            if let Some(start) = wave.selection_start() {
                prop_assert!(start <= size);
                prop_assert!(start + wave.selection_size() <= size);
            }
            prop_assert!(wave.cursor_position() <= size);
        }
    }

    /// Clip ids stay resolvable while placed, and every placed clip sits on
    /// an existing track.
    #[test]
    fn montage_sessions_never_panic(ops in proptest::collection::vec(montage_op(), 0..40)) {
        let mut montage = Montage::new("prop", 48_000, 2);
        montage.insert_stereo_track(0);

        for op in ops {
            let _ = match op {
                MontageOp::InsertTrack(index) => {
                    montage.insert_mono_track(index);
                    Ok(())
                }
                MontageOp::InsertClip { track, position, frames, mode } => {
                    let mode = match mode {
                        0 => RippleMode::NoShift,
                        1 => RippleMode::ShiftTrack,
                        _ => RippleMode::ShiftGlobal,
                    };
                    montage
                        .insert_clip_from_samples(
                            track,
                            position,
                            "prop clip",
                            vec![vec![0.1; frames]],
                            mode,
                        )
                        .map(|_| ())
                }
                MontageOp::MoveFirst(position) => match montage.first_clip() {
                    Some(id) => montage.move_clip(id, position),
                    None => Ok(()),
                },
                MontageOp::ResizeFirst(size) => match montage.first_clip() {
                    Some(id) => montage.resize_clip(id, size),
                    None => Ok(()),
                },
                MontageOp::RemoveFirst => match montage.first_clip() {
                    Some(id) => montage.remove_clip(id),
                    None => Ok(()),
                },
                MontageOp::Undo => montage.undo(),
            };

            let mut cursor = montage.first_clip();
            while let Some(id) = cursor {
                let track = montage.clip_track(id).expect("placed clip resolves");
                prop_assert!(track < montage.num_tracks());
                prop_assert!(montage.clip_size(id).expect("placed clip resolves") >= 1);
                cursor = montage.next_clip(id).expect("placed clip resolves");
            }
        }
    }
}
