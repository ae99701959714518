use std::collections::VecDeque;

use crate::action::Action;
use crate::error::EditError;
use crate::state::Editor;
use crate::update::ViewUpdate;

/// How a performed action ended up in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// Recorded as a new undo entry
    Pushed,
    /// Folded into the previous entry
    Merged,
    /// Folded into the previous entry, which then had no net effect and was dropped
    Cancelled,
}

/// Bounded undo/redo stacks of performed actions.
pub struct ActionHistory {
    undo_stack: VecDeque<Action>,
    redo_stack: VecDeque<Action>,
    max_depth: usize,
    /// False right after undo/redo/clear so the next edit starts a new entry
    can_merge: bool,
}

impl Default for ActionHistory {
    fn default() -> Self {
        Self::new(500)
    }
}

impl ActionHistory {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth: max_depth.max(1),
            can_merge: false,
        }
    }

    /// Run `action` against `editor` and record it.
    ///
    /// A rejected `save_state` returns the reason with neither the document
    /// nor the history touched.
    pub fn perform(
        &mut self,
        mut action: Action,
        editor: &mut Editor,
        updates: &mut Vec<ViewUpdate>,
    ) -> Result<Commit, EditError> {
        if let Err(e) = action.save_state(editor) {
            log::debug!(target: "action", "{} rejected: {}", action.name(), e);
            return Err(e);
        }
        action.save_undo_state(editor);
        action.redo(editor);
        editor.clamp_view();
        action.save_redo_state(editor);
        action.update_views(editor, updates);
        Ok(self.push(action))
    }

    /// Record an action that has already been performed.
    pub fn push(&mut self, action: Action) -> Commit {
        self.redo_stack.clear();
        if self.can_merge {
            if let Some(top) = self.undo_stack.back_mut() {
                if top.merge(&action) {
                    if top.is_identity() {
                        log::debug!(target: "history", "{} cancelled out", action.name());
                        self.undo_stack.pop_back();
                        self.can_merge = false;
                        return Commit::Cancelled;
                    }
                    log::debug!(target: "history", "merged {}", action.name());
                    return Commit::Merged;
                }
            }
        }
        if self.undo_stack.len() >= self.max_depth {
            if let Some(evicted) = self.undo_stack.pop_front() {
                log::debug!(target: "history", "evicted {}", evicted.name());
            }
        }
        log::debug!(target: "history", "pushed {}", action.name());
        self.undo_stack.push_back(action);
        self.can_merge = true;
        Commit::Pushed
    }

    /// Undo the most recent entry. Returns its name, or `None` if nothing to undo.
    pub fn undo(&mut self, editor: &mut Editor, updates: &mut Vec<ViewUpdate>) -> Option<&'static str> {
        self.can_merge = false;
        let action = self.undo_stack.pop_back()?;
        action.undo(editor);
        action.restore_undo_state(editor);
        action.update_views(editor, updates);
        let name = action.name();
        log::debug!(target: "history", "undo {}", name);
        self.redo_stack.push_back(action);
        Some(name)
    }

    /// Redo the most recently undone entry. Returns its name, or `None` if nothing to redo.
    pub fn redo(&mut self, editor: &mut Editor, updates: &mut Vec<ViewUpdate>) -> Option<&'static str> {
        self.can_merge = false;
        let action = self.redo_stack.pop_back()?;
        action.redo(editor);
        action.restore_redo_state(editor);
        action.update_views(editor, updates);
        let name = action.name();
        log::debug!(target: "history", "redo {}", name);
        self.undo_stack.push_back(action);
        Some(name)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Name of the entry the next undo would revert.
    pub fn last_action_name(&self) -> Option<&'static str> {
        self.undo_stack.back().map(Action::name)
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.can_merge = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{FrameAction, ModuleAction};

    fn title(s: &str) -> Action {
        ModuleAction::set_title(s).into()
    }

    fn artist(s: &str) -> Action {
        ModuleAction::set_artist(s).into()
    }

    #[test]
    fn test_perform_and_undo() {
        let mut history = ActionHistory::new(100);
        let mut editor = Editor::default();
        let mut updates = Vec::new();

        assert!(!history.can_undo());
        assert_eq!(
            history.perform(title("A"), &mut editor, &mut updates),
            Ok(Commit::Pushed)
        );
        assert!(history.can_undo());
        assert_eq!(updates, vec![ViewUpdate::SongInfo]);

        assert_eq!(history.undo(&mut editor, &mut updates), Some("Song title"));
        assert_eq!(editor.module.metadata.title, "");
        assert!(history.can_redo());

        assert_eq!(history.redo(&mut editor, &mut updates), Some("Song title"));
        assert_eq!(editor.module.metadata.title, "A");
    }

    #[test]
    fn test_empty_stacks() {
        let mut history = ActionHistory::new(10);
        let mut editor = Editor::default();
        let mut updates = Vec::new();
        assert_eq!(history.undo(&mut editor, &mut updates), None);
        assert_eq!(history.redo(&mut editor, &mut updates), None);
        assert!(updates.is_empty());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = ActionHistory::new(100);
        let mut editor = Editor::default();
        let mut updates = Vec::new();

        history.perform(title("A"), &mut editor, &mut updates).unwrap();
        history.perform(artist("B"), &mut editor, &mut updates).unwrap();
        history.undo(&mut editor, &mut updates);
        assert!(history.can_redo());

        history.perform(artist("C"), &mut editor, &mut updates).unwrap();
        assert!(!history.can_redo());
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn test_max_depth() {
        let mut history = ActionHistory::new(3);
        let mut editor = Editor::default();
        let mut updates = Vec::new();

        // Alternate fields so consecutive edits never merge
        for i in 0..5 {
            let action = if i % 2 == 0 {
                title(&i.to_string())
            } else {
                artist(&i.to_string())
            };
            history.perform(action, &mut editor, &mut updates).unwrap();
        }
        assert_eq!(history.undo_len(), 3);
        let mut undone = 0;
        while history.undo(&mut editor, &mut updates).is_some() {
            undone += 1;
        }
        assert_eq!(undone, 3);
    }

    #[test]
    fn test_rejected_action_not_recorded() {
        let mut history = ActionHistory::new(10);
        let mut editor = Editor::default();
        let before = editor.clone();
        let mut updates = Vec::new();

        let result = history.perform(title(""), &mut editor, &mut updates);
        assert_eq!(result, Err(EditError::NoChange));
        assert_eq!(history.undo_len(), 0);
        assert!(updates.is_empty());
        assert_eq!(editor, before);
    }

    #[test]
    fn test_merge_keeps_single_entry() {
        let mut history = ActionHistory::new(10);
        let mut editor = Editor::default();
        let mut updates = Vec::new();

        history.perform(title("N"), &mut editor, &mut updates).unwrap();
        assert_eq!(
            history.perform(title("Ne"), &mut editor, &mut updates),
            Ok(Commit::Merged)
        );
        assert_eq!(history.undo_len(), 1);
        history.undo(&mut editor, &mut updates);
        assert_eq!(editor.module.metadata.title, "");
    }

    #[test]
    fn test_no_merge_across_undo() {
        let mut history = ActionHistory::new(10);
        let mut editor = Editor::default();
        let mut updates = Vec::new();

        history.perform(title("A"), &mut editor, &mut updates).unwrap();
        history.perform(artist("B"), &mut editor, &mut updates).unwrap();
        history.undo(&mut editor, &mut updates);
        // Title entry is on top again, but a fresh edit must not fold into it
        assert_eq!(
            history.perform(title("C"), &mut editor, &mut updates),
            Ok(Commit::Pushed)
        );
        assert_eq!(history.undo_len(), 2);
    }

    #[test]
    fn test_frame_edit_restores_cursor() {
        let mut history = ActionHistory::new(10);
        let mut editor = Editor::default();
        let mut updates = Vec::new();

        history
            .perform(FrameAction::add_frame().into(), &mut editor, &mut updates)
            .unwrap();
        assert_eq!(editor.view.cursor.frame, 1);
        history.undo(&mut editor, &mut updates);
        assert_eq!(editor.view.cursor.frame, 0);
        history.redo(&mut editor, &mut updates);
        assert_eq!(editor.view.cursor.frame, 1);
        assert_eq!(history.last_action_name(), Some("Add frame"));
    }

    #[test]
    fn test_merge_back_to_original_drops_entry() {
        let mut history = ActionHistory::new(10);
        let mut editor = Editor::default();
        let mut updates = Vec::new();

        history.perform(artist("B"), &mut editor, &mut updates).unwrap();
        history.perform(title("A"), &mut editor, &mut updates).unwrap();
        assert_eq!(
            history.perform(title(""), &mut editor, &mut updates),
            Ok(Commit::Cancelled)
        );
        assert_eq!(history.undo_len(), 1);
        assert_eq!(history.last_action_name(), Some("Song artist"));

        // The entry below is not a merge target for the next edit
        assert_eq!(
            history.perform(artist("C"), &mut editor, &mut updates),
            Ok(Commit::Pushed)
        );
    }

    #[test]
    fn test_perform_clamps_view() {
        let mut history = ActionHistory::new(10);
        let mut editor = Editor::default();
        let mut updates = Vec::new();
        if let Some(track) = editor.module.track_mut(0) {
            track.set_frame_count(4);
        }
        editor.view.cursor.frame = 3;

        history
            .perform(FrameAction::frame_count(2).into(), &mut editor, &mut updates)
            .unwrap();
        assert_eq!(editor.view.cursor.frame, 1);
        history.undo(&mut editor, &mut updates);
        assert_eq!(editor.view.cursor.frame, 3);
        history.redo(&mut editor, &mut updates);
        assert_eq!(editor.view.cursor.frame, 1);
    }

    #[test]
    fn test_clear() {
        let mut history = ActionHistory::new(10);
        let mut editor = Editor::default();
        let mut updates = Vec::new();
        history.perform(title("A"), &mut editor, &mut updates).unwrap();
        history.undo(&mut editor, &mut updates);
        history.clear();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
