//! Reversible edits.
//!
//! An [`Action`] goes through a fixed lifecycle driven by the history:
//!
//! 1. `save_state` captures what the edit will overwrite and decides
//!    whether it is worth recording. It never mutates the document.
//! 2. `save_undo_state` snapshots the editor position before the edit.
//! 3. `redo` performs the mutation (on the first run and on every redo).
//! 4. `save_redo_state` snapshots the editor position after the edit.
//! 5. `update_views` reports which parts of the UI need refreshing.
//!
//! `undo` inverts the mutation from the captured state, after which
//! `restore_undo_state` puts the editor back where it was.

mod frame;
mod import;
mod module;
mod pattern;

pub use frame::{FrameAction, FrameActionKind, PatternClone};
pub use import::ImportModule;
pub use module::{MetadataField, ModuleAction};
pub use pattern::PatternAction;

use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::state::Editor;
use crate::update::ViewUpdate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Frame(FrameAction),
    Pattern(PatternAction),
    Module(ModuleAction),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Frame(a) => a.name(),
            Action::Pattern(a) => a.name(),
            Action::Module(a) => a.name(),
        }
    }

    pub fn save_state(&mut self, editor: &Editor) -> Result<(), EditError> {
        match self {
            Action::Frame(a) => a.save_state(editor),
            Action::Pattern(a) => a.save_state(editor),
            Action::Module(a) => a.save_state(editor),
        }
    }

    pub fn save_undo_state(&mut self, editor: &Editor) {
        if let Action::Frame(a) = self {
            a.save_undo_state(editor);
        }
    }

    pub fn save_redo_state(&mut self, editor: &Editor) {
        if let Action::Frame(a) = self {
            a.save_redo_state(editor);
        }
    }

    pub fn restore_undo_state(&self, editor: &mut Editor) {
        if let Action::Frame(a) = self {
            a.restore_undo_state(editor);
        }
    }

    pub fn restore_redo_state(&self, editor: &mut Editor) {
        if let Action::Frame(a) = self {
            a.restore_redo_state(editor);
        }
    }

    pub fn redo(&self, editor: &mut Editor) {
        match self {
            Action::Frame(a) => a.redo(editor),
            Action::Pattern(a) => a.redo(editor),
            Action::Module(a) => a.redo(editor),
        }
    }

    pub fn undo(&self, editor: &mut Editor) {
        match self {
            Action::Frame(a) => a.undo(editor),
            Action::Pattern(a) => a.undo(editor),
            Action::Module(a) => a.undo(editor),
        }
    }

    /// Try to absorb `other`, the action performed right after `self`.
    /// Only actions of the same kind and target merge.
    pub fn merge(&mut self, other: &Action) -> bool {
        match (self, other) {
            (Action::Frame(a), Action::Frame(b)) => a.merge(b),
            (Action::Pattern(a), Action::Pattern(b)) => a.merge(b),
            (Action::Module(a), Action::Module(b)) => a.merge(b),
            _ => false,
        }
    }

    /// Whether redo and undo would leave the document as they found it.
    /// Only reachable through merging.
    pub fn is_identity(&self) -> bool {
        match self {
            Action::Frame(a) => a.is_identity(),
            Action::Pattern(a) => a.is_identity(),
            Action::Module(a) => a.is_identity(),
        }
    }

    pub fn update_views(&self, editor: &Editor, updates: &mut Vec<ViewUpdate>) {
        match self {
            Action::Frame(a) => a.update_views(editor, updates),
            Action::Pattern(a) => a.update_views(updates),
            Action::Module(a) => a.update_views(editor, updates),
        }
    }
}

impl From<FrameAction> for Action {
    fn from(action: FrameAction) -> Self {
        Action::Frame(action)
    }
}

impl From<PatternAction> for Action {
    fn from(action: PatternAction) -> Self {
        Action::Pattern(action)
    }
}

impl From<ModuleAction> for Action {
    fn from(action: ModuleAction) -> Self {
        Action::Module(action)
    }
}
