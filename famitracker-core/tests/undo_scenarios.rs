//! End-to-end undo/redo scenarios driven through `dispatch`.

use famitracker_core::command::EditCommand;
use famitracker_core::config::Config;
use famitracker_core::dispatch::{dispatch, Dispatched};
use famitracker_core::history::Commit;
use famitracker_core::state::AppState;
use famitracker_core::update::ViewUpdate;
use famitracker_core::EditError;
use famitracker_types::{
    Cell, ChipKind, FrameClipData, FrameCursor, Instrument, InstrumentIndex, Module,
};

fn idx(i: usize) -> InstrumentIndex {
    InstrumentIndex::new(i)
}

fn state_with(module: Module) -> AppState {
    let mut state = AppState::new(&Config::default());
    state.load(module);
    state
}

fn run(state: &mut AppState, cmd: EditCommand) -> Result<Dispatched, EditError> {
    let mut updates = Vec::new();
    dispatch(&cmd, state, &mut updates)
}

fn run_collect(state: &mut AppState, cmd: EditCommand) -> Vec<ViewUpdate> {
    let mut updates = Vec::new();
    dispatch(&cmd, state, &mut updates).unwrap();
    updates
}

#[test]
fn remove_instrument_reselects_on_undo_and_next_on_redo() {
    let mut module = Module::default();
    for i in [3, 5, 7] {
        module
            .instruments
            .insert(idx(i), Instrument::with_name(ChipKind::Apu2A03, format!("#{i}")));
    }
    let mut state = state_with(module);
    run(&mut state, EditCommand::SelectInstrument(idx(3))).unwrap();
    let original = state.editor.module.clone();

    run(&mut state, EditCommand::RemoveInstrument(idx(3))).unwrap();
    assert!(!state.editor.module.instruments.is_used(idx(3)));
    assert_eq!(state.editor.view.selected_instrument, Some(idx(5)));

    run(&mut state, EditCommand::Undo).unwrap();
    assert_eq!(state.editor.module, original);
    assert_eq!(state.editor.view.selected_instrument, Some(idx(3)));

    run(&mut state, EditCommand::Redo).unwrap();
    assert!(!state.editor.module.instruments.is_used(idx(3)));
    assert_eq!(state.editor.view.selected_instrument, Some(idx(5)));
}

#[test]
fn removing_the_last_used_instrument_closes_its_editor() {
    let mut module = Module::default();
    module
        .instruments
        .insert(idx(7), Instrument::new(ChipKind::N163));
    let mut state = state_with(module);
    run(&mut state, EditCommand::SelectInstrument(idx(7))).unwrap();
    run(&mut state, EditCommand::OpenInstrumentEditor).unwrap();

    let updates = run_collect(&mut state, EditCommand::RemoveInstrument(idx(7)));
    assert!(updates.contains(&ViewUpdate::CloseInstrumentEditor));
    assert!(!state.editor.view.instrument_editor_open);
    assert_eq!(state.editor.view.selected_instrument, None);
}

#[test]
fn repeating_the_same_title_records_one_entry() {
    let mut module = Module::default();
    module.metadata.title = "Old".into();
    let mut state = state_with(module);

    assert_eq!(
        run(&mut state, EditCommand::SetTitle("New".into())),
        Ok(Dispatched::Committed(Commit::Pushed))
    );
    let before_second = state.editor.clone();
    assert_eq!(
        run(&mut state, EditCommand::SetTitle("New".into())),
        Err(EditError::NoChange)
    );
    assert_eq!(state.editor, before_second);
    assert_eq!(state.history.undo_len(), 1);

    run(&mut state, EditCommand::Undo).unwrap();
    assert_eq!(state.editor.module.metadata.title, "Old");
}

#[test]
fn change_pattern_all_wraps_and_undo_restores_exactly() {
    let mut module = Module::new(3, 64, 16, 6, 150);
    if let Some(track) = module.track_mut(0) {
        track.set_frame_row(0, vec![14, 15, 3]);
    }
    let mut state = state_with(module);
    let original = state.editor.module.clone();

    for _ in 0..3 {
        run(&mut state, EditCommand::ChangePatternAll(1)).unwrap();
    }
    let track = state.editor.current_track().unwrap();
    assert_eq!(track.frame_row(0), Some(&vec![1, 2, 6]));
    // Consecutive row changes fold into one entry
    assert_eq!(state.history.undo_len(), 1);

    run(&mut state, EditCommand::Undo).unwrap();
    assert_eq!(state.editor.module, original);

    run(&mut state, EditCommand::Redo).unwrap();
    let track = state.editor.current_track().unwrap();
    assert_eq!(track.frame_row(0), Some(&vec![1, 2, 6]));
}

#[test]
fn change_pattern_clamps_at_the_ceiling() {
    let mut module = Module::new(1, 64, 16, 6, 150);
    if let Some(track) = module.track_mut(0) {
        track.set_frame_row(0, vec![13]);
    }
    let mut state = state_with(module);

    run(&mut state, EditCommand::ChangePattern(1)).unwrap();
    let updates = run_collect(&mut state, EditCommand::ChangePattern(5));
    assert!(updates.iter().any(|u| matches!(u, ViewUpdate::Status(_))));
    assert_eq!(state.editor.current_track().unwrap().pattern_at(0, 0), 15);
    // The clamped edit stays separate from the one before it
    assert_eq!(state.history.undo_len(), 2);

    run(&mut state, EditCommand::Undo).unwrap();
    assert_eq!(state.editor.current_track().unwrap().pattern_at(0, 0), 14);
    run(&mut state, EditCommand::Undo).unwrap();
    assert_eq!(state.editor.current_track().unwrap().pattern_at(0, 0), 13);
}

#[test]
fn frame_count_edits_merge_and_undo_to_the_first_count() {
    let mut module = Module::default();
    if let Some(track) = module.track_mut(0) {
        track.set_frame_count(8);
    }
    let mut state = state_with(module);

    run(&mut state, EditCommand::SetFrameCount(10)).unwrap();
    assert_eq!(
        run(&mut state, EditCommand::SetFrameCount(12)),
        Ok(Dispatched::Committed(Commit::Merged))
    );
    assert_eq!(state.history.undo_len(), 1);
    assert_eq!(state.editor.current_track().unwrap().frame_count(), 12);

    run(&mut state, EditCommand::Undo).unwrap();
    assert_eq!(state.editor.current_track().unwrap().frame_count(), 8);
    run(&mut state, EditCommand::Redo).unwrap();
    assert_eq!(state.editor.current_track().unwrap().frame_count(), 12);
}

#[test]
fn a_new_edit_discards_redo() {
    let mut state = AppState::new(&Config::default());
    run(&mut state, EditCommand::AddFrame).unwrap();
    run(&mut state, EditCommand::AddFrame).unwrap();
    run(&mut state, EditCommand::Undo).unwrap();
    assert!(state.history.can_redo());

    run(&mut state, EditCommand::SetArtist("Someone".into())).unwrap();
    assert!(!state.history.can_redo());
    assert_eq!(
        run(&mut state, EditCommand::Redo),
        Ok(Dispatched::NothingToRedo)
    );
}

#[test]
fn rejected_edits_never_mutate_or_record() {
    let mut module = Module::default();
    module
        .instruments
        .insert(idx(2), Instrument::new(ChipKind::Vrc7));
    let mut state = state_with(module);
    let before = state.editor.clone();

    let rejected = [
        EditCommand::RemoveFrame,
        EditCommand::MoveFrameUp,
        EditCommand::SetPattern(0),
        EditCommand::SetFrameCount(1),
        EditCommand::ChangePattern(0),
        EditCommand::DeleteSelection,
        EditCommand::DropMove { target: 0 },
        EditCommand::AddInstrument {
            index: idx(2),
            instrument: Instrument::new(ChipKind::Fds),
        },
        EditCommand::RemoveInstrument(idx(9)),
        EditCommand::RenameInstrument {
            index: idx(9),
            name: "x".into(),
        },
        EditCommand::RemoveTrack(0),
        EditCommand::MergeDuplicated,
    ];
    for cmd in rejected {
        assert!(run(&mut state, cmd.clone()).is_err(), "{:?} was accepted", cmd);
    }
    assert_eq!(state.editor, before);
    assert_eq!(state.history.undo_len(), 0);
    assert!(!state.dirty);
}

#[test]
fn every_edit_undoes_to_the_original_document() {
    let mut module = Module::new(4, 16, 64, 6, 150);
    module
        .instruments
        .insert(idx(0), Instrument::new(ChipKind::Apu2A03));
    let mut state = state_with(module);

    let edits = vec![
        EditCommand::AddFrame,
        EditCommand::DuplicateFrame,
        EditCommand::CloneFrame,
        EditCommand::SetFrameCount(6),
        EditCommand::MoveCursor(FrameCursor::new(1, 1)),
        EditCommand::SetPattern(9),
        EditCommand::SetPatternAll(4),
        EditCommand::ChangePattern(-2),
        EditCommand::ChangePatternAll(3),
        EditCommand::MoveFrameDown,
        EditCommand::Select {
            anchor: FrameCursor::new(0, 0),
            extent: FrameCursor::new(1, 3),
        },
        EditCommand::ClonePatterns,
        EditCommand::DropMove { target: 4 },
        EditCommand::Paste {
            clip: FrameClipData::from_rows(0, &[vec![1, 2, 3, 4]]),
            frame: 0,
            clone: true,
        },
        EditCommand::PasteOverwrite(FrameClipData::from_rows(1, &[vec![7, 7]])),
        EditCommand::WriteCell {
            frame: 0,
            channel: 0,
            row: 2,
            cell: Cell::note(48, idx(0)),
        },
        EditCommand::DeleteSelection,
        EditCommand::MergeDuplicated,
        EditCommand::SetTitle("All edits".into()),
        EditCommand::SetComment {
            text: "notes".into(),
            show_on_open: true,
        },
        EditCommand::NewInstrument(ChipKind::S5b),
        EditCommand::RenameInstrument {
            index: idx(0),
            name: "Lead".into(),
        },
        EditCommand::RemoveInstrument(idx(0)),
        EditCommand::AddTrack,
        EditCommand::RemoveTrack(0),
    ];

    // Snapshot the document before every accepted edit
    let mut snapshots = Vec::new();
    for cmd in edits {
        let before = state.editor.module.clone();
        if let Ok(out) = run(&mut state, cmd) {
            if out == Dispatched::Committed(Commit::Pushed) {
                snapshots.push(before);
            }
        }
    }
    assert!(snapshots.len() > 15, "only {} edits recorded", snapshots.len());
    let done = state.editor.module.clone();

    while let Some(expected) = snapshots.pop() {
        run(&mut state, EditCommand::Undo).unwrap();
        assert_eq!(state.editor.module, expected);
    }
    assert_eq!(run(&mut state, EditCommand::Undo), Ok(Dispatched::NothingToUndo));

    while state.history.can_redo() {
        run(&mut state, EditCommand::Redo).unwrap();
    }
    assert_eq!(state.editor.module, done);
}

#[test]
fn import_appends_tracks_and_undo_removes_them() {
    let mut source = Module::default();
    source
        .instruments
        .insert(idx(0), Instrument::with_name(ChipKind::Vrc6, "Saw"));
    if let Some(track) = source.track_mut(0) {
        track.title = "Boss".into();
        track.set_cell(1, 0, 0, Cell::note(20, idx(0)));
    }

    let mut module = Module::default();
    module
        .instruments
        .insert(idx(0), Instrument::new(ChipKind::Apu2A03));
    let mut state = state_with(module);
    let original = state.editor.module.clone();

    let updates = run_collect(
        &mut state,
        EditCommand::Import {
            source: Box::new(source),
            tracks: vec![0],
            instruments: true,
        },
    );
    assert!(updates.contains(&ViewUpdate::Track));
    assert_eq!(state.editor.module.track_count(), 2);
    assert_eq!(
        state.editor.module.track(1).unwrap().cell(1, 0, 0).instrument,
        Some(idx(1))
    );

    run(&mut state, EditCommand::Undo).unwrap();
    assert_eq!(state.editor.module, original);
}

#[test]
fn shrinking_frames_under_the_cursor_keeps_editing_possible() {
    let mut state = AppState::new(&Config::default());
    run(&mut state, EditCommand::SetFrameCount(4)).unwrap();
    run(&mut state, EditCommand::MoveCursor(FrameCursor::new(3, 0))).unwrap();

    run(&mut state, EditCommand::SetFrameCount(2)).unwrap();
    assert_eq!(state.editor.view.cursor.frame, 1);
    run(&mut state, EditCommand::AddFrame).unwrap();
    assert_eq!(state.editor.current_track().unwrap().frame_count(), 3);
    assert_eq!(state.editor.view.cursor.frame, 2);
}

#[test]
fn shrinking_frames_clamps_the_selection() {
    let mut state = AppState::new(&Config::default());
    run(&mut state, EditCommand::SetFrameCount(6)).unwrap();
    run(
        &mut state,
        EditCommand::Select {
            anchor: FrameCursor::new(1, 0),
            extent: FrameCursor::new(5, 1),
        },
    )
    .unwrap();

    run(&mut state, EditCommand::SetFrameCount(3)).unwrap();
    let selection = state.editor.view.selection.unwrap();
    assert_eq!(selection.frames().end, 2);
    run(&mut state, EditCommand::DeleteSelection).unwrap();
    assert_eq!(state.editor.current_track().unwrap().frame_count(), 1);

    // Undo restores the selection the shrink left behind
    run(&mut state, EditCommand::Undo).unwrap();
    assert_eq!(state.editor.view.selection, Some(selection));
}

#[test]
fn huge_row_offsets_stay_separate_and_undo_exactly() {
    let mut state = AppState::new(&Config::default());
    let original = state.editor.module.clone();

    run(&mut state, EditCommand::ChangePatternAll(i32::MAX)).unwrap();
    assert_eq!(
        run(&mut state, EditCommand::ChangePatternAll(i32::MAX)),
        Ok(Dispatched::Committed(Commit::Pushed))
    );
    assert_eq!(state.history.undo_len(), 2);

    run(&mut state, EditCommand::Undo).unwrap();
    run(&mut state, EditCommand::Undo).unwrap();
    assert_eq!(state.editor.module, original);
}

#[test]
fn changes_that_cancel_out_leave_no_entry() {
    let mut state = AppState::new(&Config::default());
    run(&mut state, EditCommand::SetPattern(5)).unwrap();
    run(&mut state, EditCommand::ChangePattern(1)).unwrap();
    assert_eq!(
        run(&mut state, EditCommand::ChangePattern(-1)),
        Ok(Dispatched::Committed(Commit::Cancelled))
    );
    assert_eq!(state.history.undo_len(), 1);
    assert_eq!(state.history.last_action_name(), Some("Set pattern"));

    run(&mut state, EditCommand::SetTitle("Draft".into())).unwrap();
    assert_eq!(
        run(&mut state, EditCommand::SetTitle(String::new())),
        Ok(Dispatched::Committed(Commit::Cancelled))
    );
    assert_eq!(state.history.undo_len(), 1);
}
