mod view;

pub use view::{FrameEditorState, ViewState};

use std::path::Path;

use famitracker_types::{Module, Track};

use crate::config::{Config, DocumentConfig};
use crate::history::ActionHistory;
use crate::journal::{EditJournal, JournalError};

/// The context every action runs against: the document and the view
/// looking at it. Actions receive it per call and never keep a reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Editor {
    pub module: Module,
    pub view: ViewState,
}

impl Editor {
    pub fn new(module: Module) -> Self {
        let mut editor = Self {
            module,
            view: ViewState::default(),
        };
        editor.clamp_view();
        editor
    }

    /// Track currently shown in the frame editor.
    pub fn current_track(&self) -> Option<&Track> {
        self.module.track(self.view.track)
    }

    /// Keep the view pointing at things that exist after a structural edit.
    pub fn clamp_view(&mut self) {
        let last = self.module.track_count().saturating_sub(1);
        self.view.track = self.view.track.min(last);
        if let Some(track) = self.module.track(self.view.track) {
            self.view.clamp_to(track);
        }
        if let Some(inst) = self.view.selected_instrument {
            if !self.module.instruments.is_used(inst) {
                self.view.selected_instrument = None;
            }
        }
    }
}

/// Top-level editing state: one open document plus its history.
pub struct AppState {
    pub editor: Editor,
    pub history: ActionHistory,
    /// Set by any committed, undone or redone edit; cleared on load/save
    pub dirty: bool,
    pub journal: Option<EditJournal>,
    defaults: DocumentConfig,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            editor: Editor::new(config.new_module()),
            history: ActionHistory::new(config.history_depth()),
            dirty: false,
            journal: None,
            defaults: config.document.clone(),
        }
    }

    /// Replace the open document. History does not carry across documents.
    pub fn load(&mut self, module: Module) {
        log::info!(
            target: "history",
            "loaded module '{}' ({} tracks, {} instruments)",
            module.metadata.title,
            module.track_count(),
            module.instruments.count()
        );
        self.editor = Editor::new(module);
        self.history.clear();
        self.dirty = false;
    }

    /// Start over with a blank document built from the configured defaults.
    pub fn reset(&mut self) {
        log::info!(target: "history", "new module");
        self.editor = Editor::new(self.defaults.new_module());
        self.history.clear();
        self.dirty = false;
    }

    /// Start journaling every dispatched command to `path`.
    pub fn open_journal(&mut self, path: &Path) -> Result<(), JournalError> {
        self.journal = Some(EditJournal::open(path)?);
        Ok(())
    }

    /// Open the journal named by `config` when journaling is enabled.
    ///
    /// A journal that cannot be opened is logged and editing carries on
    /// without one.
    pub fn start_configured_journal(&mut self, config: &Config) {
        if !config.journal_enabled() {
            return;
        }
        let path = config.journal_path();
        if let Err(e) = self.open_journal(&path) {
            log::warn!(target: "journal", "cannot open journal {}: {}", path.display(), e);
        }
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }
}
