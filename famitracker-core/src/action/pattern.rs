//! Pattern-content edits.

use serde::{Deserialize, Serialize};

use famitracker_types::Cell;

use crate::error::EditError;
use crate::state::Editor;
use crate::update::{push_unique, ViewUpdate};

/// Overwrite one cell of a stored pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternAction {
    track: usize,
    channel: usize,
    pattern: usize,
    row: usize,
    cell: Cell,
    old: Cell,
}

impl PatternAction {
    pub fn set_cell(track: usize, channel: usize, pattern: usize, row: usize, cell: Cell) -> Self {
        Self {
            track,
            channel,
            pattern,
            row,
            cell,
            old: Cell::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        "Edit pattern"
    }

    pub fn save_state(&mut self, editor: &Editor) -> Result<(), EditError> {
        let track = editor.module.track(self.track).ok_or(EditError::OutOfRange {
            what: "track",
            index: self.track,
        })?;
        if self.channel >= track.channel_count() {
            return Err(EditError::OutOfRange {
                what: "channel",
                index: self.channel,
            });
        }
        if self.pattern >= editor.module.pattern_limit() {
            return Err(EditError::OutOfRange {
                what: "pattern",
                index: self.pattern,
            });
        }
        if self.row >= track.pattern_length() {
            return Err(EditError::OutOfRange {
                what: "row",
                index: self.row,
            });
        }
        self.old = track.cell(self.channel, self.pattern, self.row);
        if self.old == self.cell {
            return Err(EditError::NoChange);
        }
        Ok(())
    }

    pub fn redo(&self, editor: &mut Editor) {
        self.write(editor, self.cell);
    }

    pub fn undo(&self, editor: &mut Editor) {
        self.write(editor, self.old);
    }

    fn write(&self, editor: &mut Editor, cell: Cell) {
        if let Some(track) = editor.module.track_mut(self.track) {
            track.set_cell(self.channel, self.pattern, self.row, cell);
        }
    }

    /// Repeated writes to the same cell collapse into one edit.
    pub fn merge(&mut self, other: &PatternAction) -> bool {
        if (self.track, self.channel, self.pattern, self.row)
            != (other.track, other.channel, other.pattern, other.row)
        {
            return false;
        }
        self.cell = other.cell;
        true
    }

    pub fn is_identity(&self) -> bool {
        self.cell == self.old
    }

    pub fn update_views(&self, updates: &mut Vec<ViewUpdate>) {
        push_unique(updates, ViewUpdate::Pattern);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use famitracker_types::InstrumentIndex;

    #[test]
    fn set_cell_and_undo() {
        let mut editor = Editor::default();
        let before = editor.clone();
        let cell = Cell::note(36, InstrumentIndex::new(2));
        let mut action = PatternAction::set_cell(0, 1, 4, 10, cell);
        action.save_state(&editor).unwrap();
        action.redo(&mut editor);
        assert_eq!(editor.module.track(0).unwrap().cell(1, 4, 10), cell);
        action.undo(&mut editor);
        assert_eq!(editor, before);
    }

    #[test]
    fn rejects_unchanged_and_out_of_range() {
        let editor = Editor::default();
        let mut same = PatternAction::set_cell(0, 0, 0, 0, Cell::default());
        assert_eq!(same.save_state(&editor), Err(EditError::NoChange));
        let mut far = PatternAction::set_cell(0, 0, 0, 999, Cell::note(1, InstrumentIndex::new(0)));
        assert!(matches!(
            far.save_state(&editor),
            Err(EditError::OutOfRange { what: "row", .. })
        ));
    }

    #[test]
    fn merges_only_same_cell() {
        let a = Cell::note(1, InstrumentIndex::new(0));
        let b = Cell::note(2, InstrumentIndex::new(0));
        let mut first = PatternAction::set_cell(0, 0, 0, 0, a);
        assert!(first.merge(&PatternAction::set_cell(0, 0, 0, 0, b)));
        assert!(!first.merge(&PatternAction::set_cell(0, 0, 0, 1, b)));
    }
}
