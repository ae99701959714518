//! Edit intents as issued by a front-end, and their construction into actions.

use serde::{Deserialize, Serialize};

use famitracker_types::{
    Cell, ChipKind, FrameClipData, FrameCursor, Instrument, InstrumentIndex, Module,
    MAX_INSTRUMENTS,
};

use crate::action::{Action, FrameAction, ImportModule, ModuleAction, PatternAction};
use crate::error::EditError;
use crate::state::Editor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EditCommand {
    // Frame editor
    AddFrame,
    RemoveFrame,
    DuplicateFrame,
    CloneFrame,
    SetFrameCount(usize),
    SetPattern(usize),
    SetPatternAll(usize),
    ChangePattern(i32),
    ChangePatternAll(i32),
    MoveFrameDown,
    MoveFrameUp,
    ClonePatterns,
    Paste {
        clip: FrameClipData,
        frame: usize,
        clone: bool,
    },
    PasteOverwrite(FrameClipData),
    DropMove {
        target: usize,
    },
    DeleteSelection,
    MergeDuplicated,

    // Pattern editor
    WriteCell {
        frame: usize,
        channel: usize,
        row: usize,
        cell: Cell,
    },

    // Module
    SetTitle(String),
    SetArtist(String),
    SetCopyright(String),
    SetComment {
        text: String,
        show_on_open: bool,
    },
    AddInstrument {
        index: InstrumentIndex,
        instrument: Instrument,
    },
    /// Add a default instrument in the first free slot
    NewInstrument(ChipKind),
    RemoveInstrument(InstrumentIndex),
    RenameInstrument {
        index: InstrumentIndex,
        name: String,
    },
    AddTrack,
    RemoveTrack(usize),
    Import {
        source: Box<Module>,
        tracks: Vec<usize>,
        instruments: bool,
    },

    // View (not recorded in history)
    MoveCursor(FrameCursor),
    Select {
        anchor: FrameCursor,
        extent: FrameCursor,
    },
    ClearSelection,
    SelectInstrument(InstrumentIndex),
    OpenInstrumentEditor,
    SelectTrack(usize),

    Undo,
    Redo,
}

impl EditCommand {
    /// Whether the command produces a history entry.
    pub fn is_undoable(&self) -> bool {
        !matches!(
            self,
            EditCommand::MoveCursor(_)
                | EditCommand::Select { .. }
                | EditCommand::ClearSelection
                | EditCommand::SelectInstrument(_)
                | EditCommand::OpenInstrumentEditor
                | EditCommand::SelectTrack(_)
                | EditCommand::Undo
                | EditCommand::Redo
        )
    }
}

/// Build the action for an undoable command.
///
/// Capacity preconditions (track and instrument table limits, import
/// compatibility) are checked here, before any action exists.
pub fn build_action(cmd: &EditCommand, editor: &Editor) -> Result<Action, EditError> {
    let action: Action = match cmd {
        EditCommand::AddFrame => FrameAction::add_frame().into(),
        EditCommand::RemoveFrame => FrameAction::remove_frame().into(),
        EditCommand::DuplicateFrame => FrameAction::duplicate_frame().into(),
        EditCommand::CloneFrame => FrameAction::clone_frame().into(),
        EditCommand::SetFrameCount(n) => FrameAction::frame_count(*n).into(),
        EditCommand::SetPattern(p) => FrameAction::set_pattern(*p).into(),
        EditCommand::SetPatternAll(p) => FrameAction::set_pattern_all(*p).into(),
        EditCommand::ChangePattern(d) => FrameAction::change_pattern(*d).into(),
        EditCommand::ChangePatternAll(d) => FrameAction::change_pattern_all(*d).into(),
        EditCommand::MoveFrameDown => FrameAction::move_down().into(),
        EditCommand::MoveFrameUp => FrameAction::move_up().into(),
        EditCommand::ClonePatterns => FrameAction::clone_patterns().into(),
        EditCommand::Paste { clip, frame, clone } => {
            FrameAction::paste(clip.clone(), *frame, *clone).into()
        }
        EditCommand::PasteOverwrite(clip) => FrameAction::paste_overwrite(clip.clone()).into(),
        EditCommand::DropMove { target } => FrameAction::drop_move(*target).into(),
        EditCommand::DeleteSelection => FrameAction::delete_selection().into(),
        EditCommand::MergeDuplicated => FrameAction::merge_duplicated().into(),

        EditCommand::WriteCell {
            frame,
            channel,
            row,
            cell,
        } => {
            let track = editor.current_track().ok_or(EditError::OutOfRange {
                what: "track",
                index: editor.view.track,
            })?;
            if *frame >= track.frame_count() {
                return Err(EditError::OutOfRange {
                    what: "frame",
                    index: *frame,
                });
            }
            let pattern = track.pattern_at(*frame, *channel);
            PatternAction::set_cell(editor.view.track, *channel, pattern, *row, *cell).into()
        }

        EditCommand::SetTitle(s) => ModuleAction::set_title(s).into(),
        EditCommand::SetArtist(s) => ModuleAction::set_artist(s).into(),
        EditCommand::SetCopyright(s) => ModuleAction::set_copyright(s).into(),
        EditCommand::SetComment { text, show_on_open } => {
            ModuleAction::set_comment(text, *show_on_open).into()
        }
        EditCommand::AddInstrument { index, instrument } => {
            ModuleAction::add_instrument(*index, instrument.clone()).into()
        }
        EditCommand::NewInstrument(chip) => {
            let index = editor
                .module
                .instruments
                .first_free()
                .ok_or(EditError::CapacityExceeded {
                    what: "instrument",
                    limit: MAX_INSTRUMENTS,
                })?;
            ModuleAction::add_instrument(index, Instrument::new(*chip)).into()
        }
        EditCommand::RemoveInstrument(index) => ModuleAction::remove_instrument(*index).into(),
        EditCommand::RenameInstrument { index, name } => {
            ModuleAction::rename_instrument(*index, name).into()
        }
        EditCommand::AddTrack => ModuleAction::add_track(editor)?.into(),
        EditCommand::RemoveTrack(index) => ModuleAction::remove_track(*index).into(),
        EditCommand::Import {
            source,
            tracks,
            instruments,
        } => {
            let import = ImportModule::new(&editor.module, source, tracks, *instruments)?;
            ModuleAction::import(import).into()
        }

        EditCommand::MoveCursor(_)
        | EditCommand::Select { .. }
        | EditCommand::ClearSelection
        | EditCommand::SelectInstrument(_)
        | EditCommand::OpenInstrumentEditor
        | EditCommand::SelectTrack(_)
        | EditCommand::Undo
        | EditCommand::Redo => {
            return Err(EditError::InvalidTarget("command is not an edit"));
        }
    };
    Ok(action)
}
