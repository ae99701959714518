//! Single entry point for state mutation.

use famitracker_types::{FrameCursor, FrameSelection};

use crate::command::{build_action, EditCommand};
use crate::error::EditError;
use crate::history::Commit;
use crate::state::AppState;
use crate::update::{push_unique, ViewUpdate};

/// What a dispatched command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Committed(Commit),
    Undone(&'static str),
    Redone(&'static str),
    NothingToUndo,
    NothingToRedo,
    ViewChanged,
}

impl Dispatched {
    /// Whether the document changed.
    pub fn modified(&self) -> bool {
        matches!(
            self,
            Dispatched::Committed(_) | Dispatched::Undone(_) | Dispatched::Redone(_)
        )
    }
}

/// Dispatch a command against `state`, collecting view notifications into `updates`.
///
/// Undoable commands run through the history; undo/redo move one entry;
/// view commands only touch the view. Every command is journaled when a
/// journal is open.
pub fn dispatch(
    cmd: &EditCommand,
    state: &mut AppState,
    updates: &mut Vec<ViewUpdate>,
) -> Result<Dispatched, EditError> {
    let result = dispatch_inner(cmd, state, updates);
    if let Ok(outcome) = &result {
        if outcome.modified() {
            state.dirty = true;
        }
    }
    if let Some(journal) = state.journal.as_mut() {
        if let Err(e) = journal.record(cmd, &result) {
            log::warn!(target: "journal", "failed to record edit: {}", e);
        }
    }
    result
}

fn dispatch_inner(
    cmd: &EditCommand,
    state: &mut AppState,
    updates: &mut Vec<ViewUpdate>,
) -> Result<Dispatched, EditError> {
    match cmd {
        EditCommand::Undo => Ok(state
            .history
            .undo(&mut state.editor, updates)
            .map_or(Dispatched::NothingToUndo, Dispatched::Undone)),
        EditCommand::Redo => Ok(state
            .history
            .redo(&mut state.editor, updates)
            .map_or(Dispatched::NothingToRedo, Dispatched::Redone)),
        cmd if cmd.is_undoable() => {
            let action = build_action(cmd, &state.editor)?;
            let commit = state.history.perform(action, &mut state.editor, updates)?;
            Ok(Dispatched::Committed(commit))
        }
        cmd => {
            dispatch_view(cmd, state, updates)?;
            Ok(Dispatched::ViewChanged)
        }
    }
}

fn dispatch_view(
    cmd: &EditCommand,
    state: &mut AppState,
    updates: &mut Vec<ViewUpdate>,
) -> Result<(), EditError> {
    let editor = &mut state.editor;
    match cmd {
        EditCommand::MoveCursor(cursor) => {
            editor.view.cursor = *cursor;
            editor.view.selection = None;
            editor.clamp_view();
            push_unique(updates, ViewUpdate::Frame);
        }
        EditCommand::Select { anchor, extent } => {
            editor.view.selection = Some(FrameSelection::new(*anchor, *extent));
            editor.view.cursor = *extent;
            editor.clamp_view();
            push_unique(updates, ViewUpdate::Frame);
        }
        EditCommand::ClearSelection => {
            editor.view.selection = None;
            push_unique(updates, ViewUpdate::Frame);
        }
        EditCommand::SelectInstrument(index) => {
            if !editor.module.instruments.is_used(*index) {
                return Err(EditError::NoInstrument(*index));
            }
            editor.view.selected_instrument = Some(*index);
            push_unique(updates, ViewUpdate::Instrument);
        }
        EditCommand::OpenInstrumentEditor => {
            if editor.view.selected_instrument.is_none() {
                return Err(EditError::InvalidTarget("no instrument selected"));
            }
            editor.view.instrument_editor_open = true;
            push_unique(updates, ViewUpdate::Instrument);
        }
        EditCommand::SelectTrack(track) => {
            if *track >= editor.module.track_count() {
                return Err(EditError::OutOfRange {
                    what: "track",
                    index: *track,
                });
            }
            editor.view.track = *track;
            editor.view.cursor = FrameCursor::default();
            editor.view.selection = None;
            push_unique(updates, ViewUpdate::Track);
            push_unique(updates, ViewUpdate::Frame);
        }
        _ => return Err(EditError::InvalidTarget("command is not a view command")),
    }
    Ok(())
}
