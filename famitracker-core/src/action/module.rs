//! Module-level edits: song information, comment, instruments and tracks.

use serde::{Deserialize, Serialize};

use famitracker_types::{
    truncate_field, FrameCursor, Instrument, InstrumentIndex, Track, INST_NAME_MAX,
    METADATA_FIELD_LENGTH, MAX_TRACKS,
};

use super::import::ImportModule;
use crate::error::EditError;
use crate::state::Editor;
use crate::update::{push_unique, ViewUpdate};

/// Which song-information field a metadata edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetadataField {
    Title,
    Artist,
    Copyright,
}

impl MetadataField {
    fn get(self, editor: &Editor) -> &str {
        let meta = &editor.module.metadata;
        match self {
            MetadataField::Title => &meta.title,
            MetadataField::Artist => &meta.artist,
            MetadataField::Copyright => &meta.copyright,
        }
    }

    fn set(self, editor: &mut Editor, value: &str) {
        let meta = &mut editor.module.metadata;
        let slot = match self {
            MetadataField::Title => &mut meta.title,
            MetadataField::Artist => &mut meta.artist,
            MetadataField::Copyright => &mut meta.copyright,
        };
        *slot = value.to_string();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModuleAction {
    Metadata {
        field: MetadataField,
        old: String,
        new: String,
    },
    Comment {
        old: String,
        old_show: bool,
        new: String,
        show: bool,
    },
    AddInstrument {
        index: InstrumentIndex,
        instrument: Instrument,
        prev_selection: Option<InstrumentIndex>,
    },
    RemoveInstrument {
        index: InstrumentIndex,
        removed: Option<Instrument>,
        /// Slot selected once `index` is gone
        next: Option<InstrumentIndex>,
    },
    RenameInstrument {
        index: InstrumentIndex,
        old: String,
        new: String,
    },
    AddTrack {
        index: usize,
        track: Track,
        prev_track: usize,
    },
    RemoveTrack {
        index: usize,
        removed: Option<Track>,
        prev_track: usize,
    },
    Import(Box<ImportModule>),
}

impl ModuleAction {
    fn metadata(field: MetadataField, value: &str) -> Self {
        ModuleAction::Metadata {
            field,
            old: String::new(),
            new: truncate_field(value, METADATA_FIELD_LENGTH),
        }
    }

    pub fn set_title(title: &str) -> Self {
        Self::metadata(MetadataField::Title, title)
    }

    pub fn set_artist(artist: &str) -> Self {
        Self::metadata(MetadataField::Artist, artist)
    }

    pub fn set_copyright(copyright: &str) -> Self {
        Self::metadata(MetadataField::Copyright, copyright)
    }

    pub fn set_comment(text: &str, show_on_open: bool) -> Self {
        ModuleAction::Comment {
            old: String::new(),
            old_show: false,
            new: text.to_string(),
            show: show_on_open,
        }
    }

    pub fn add_instrument(index: InstrumentIndex, instrument: Instrument) -> Self {
        ModuleAction::AddInstrument {
            index,
            instrument,
            prev_selection: None,
        }
    }

    pub fn remove_instrument(index: InstrumentIndex) -> Self {
        ModuleAction::RemoveInstrument {
            index,
            removed: None,
            next: None,
        }
    }

    pub fn rename_instrument(index: InstrumentIndex, name: &str) -> Self {
        ModuleAction::RenameInstrument {
            index,
            old: String::new(),
            new: truncate_field(name, INST_NAME_MAX),
        }
    }

    /// Append a blank track. Refused up front once the module is full.
    pub fn add_track(editor: &Editor) -> Result<Self, EditError> {
        check_track_room(editor, 1)?;
        Ok(ModuleAction::AddTrack {
            index: editor.module.track_count(),
            track: editor.module.new_track(),
            prev_track: 0,
        })
    }

    pub fn remove_track(index: usize) -> Self {
        ModuleAction::RemoveTrack {
            index,
            removed: None,
            prev_track: 0,
        }
    }

    pub fn import(import: ImportModule) -> Self {
        ModuleAction::Import(Box::new(import))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModuleAction::Metadata { field, .. } => match field {
                MetadataField::Title => "Song title",
                MetadataField::Artist => "Song artist",
                MetadataField::Copyright => "Song copyright",
            },
            ModuleAction::Comment { .. } => "Comment",
            ModuleAction::AddInstrument { .. } => "Add instrument",
            ModuleAction::RemoveInstrument { .. } => "Remove instrument",
            ModuleAction::RenameInstrument { .. } => "Rename instrument",
            ModuleAction::AddTrack { .. } => "Add track",
            ModuleAction::RemoveTrack { .. } => "Remove track",
            ModuleAction::Import(_) => "Import module",
        }
    }

    pub fn save_state(&mut self, editor: &Editor) -> Result<(), EditError> {
        match self {
            ModuleAction::Metadata { field, old, new } => {
                *old = field.get(editor).to_string();
                if old == new {
                    return Err(EditError::NoChange);
                }
            }
            // The comment dialog is modal; confirming it always counts as an edit
            ModuleAction::Comment { old, old_show, .. } => {
                *old = editor.module.metadata.comment.clone();
                *old_show = editor.module.metadata.show_comment_on_open;
            }
            ModuleAction::AddInstrument {
                index,
                prev_selection,
                ..
            } => {
                if !index.is_valid() {
                    return Err(EditError::OutOfRange {
                        what: "instrument",
                        index: index.get(),
                    });
                }
                if editor.module.instruments.is_used(*index) {
                    return Err(EditError::SlotOccupied(*index));
                }
                *prev_selection = editor.view.selected_instrument;
            }
            ModuleAction::RemoveInstrument {
                index,
                removed,
                next,
            } => {
                let instrument = editor
                    .module
                    .instruments
                    .get(*index)
                    .ok_or(EditError::NoInstrument(*index))?;
                *removed = Some(instrument.clone());
                *next = editor.module.instruments.next_used_after(*index);
            }
            ModuleAction::RenameInstrument { index, old, new } => {
                let instrument = editor
                    .module
                    .instruments
                    .get(*index)
                    .ok_or(EditError::NoInstrument(*index))?;
                *old = instrument.name.clone();
                if old == new {
                    return Err(EditError::NoChange);
                }
            }
            ModuleAction::AddTrack { prev_track, .. } => {
                check_track_room(editor, 1)?;
                *prev_track = editor.view.track;
            }
            ModuleAction::RemoveTrack {
                index,
                removed,
                prev_track,
            } => {
                if editor.module.track_count() == 1 {
                    return Err(EditError::InvalidTarget("cannot remove the last track"));
                }
                let track = editor.module.track(*index).ok_or(EditError::OutOfRange {
                    what: "track",
                    index: *index,
                })?;
                *removed = Some(track.clone());
                *prev_track = editor.view.track;
            }
            ModuleAction::Import(import) => import.save_state(editor)?,
        }
        Ok(())
    }

    pub fn redo(&self, editor: &mut Editor) {
        match self {
            ModuleAction::Metadata { field, new, .. } => field.set(editor, new),
            ModuleAction::Comment { new, show, .. } => {
                editor.module.metadata.comment = new.clone();
                editor.module.metadata.show_comment_on_open = *show;
            }
            ModuleAction::AddInstrument {
                index, instrument, ..
            } => {
                let inserted = editor.module.instruments.insert(*index, instrument.clone());
                debug_assert!(inserted, "instrument slot {} not free on redo", index);
                editor.view.selected_instrument = Some(*index);
            }
            ModuleAction::RemoveInstrument { index, next, .. } => {
                editor.module.instruments.remove(*index);
                editor.view.selected_instrument = *next;
                if next.is_none() {
                    editor.view.instrument_editor_open = false;
                }
            }
            ModuleAction::RenameInstrument { index, new, .. } => {
                if let Some(inst) = editor.module.instruments.get_mut(*index) {
                    inst.name = new.clone();
                }
                editor.view.selected_instrument = Some(*index);
            }
            ModuleAction::AddTrack { index, track, .. } => {
                editor.module.insert_track(*index, track.clone());
                show_track(editor, *index);
            }
            ModuleAction::RemoveTrack { index, .. } => {
                editor.module.remove_track(*index);
                let shown = editor.view.track;
                if shown > *index || shown >= editor.module.track_count() {
                    show_track(editor, shown.saturating_sub(1));
                } else if shown == *index {
                    show_track(editor, shown);
                }
            }
            ModuleAction::Import(import) => import.redo(editor),
        }
    }

    pub fn undo(&self, editor: &mut Editor) {
        match self {
            ModuleAction::Metadata { field, old, .. } => field.set(editor, old),
            ModuleAction::Comment { old, old_show, .. } => {
                editor.module.metadata.comment = old.clone();
                editor.module.metadata.show_comment_on_open = *old_show;
            }
            ModuleAction::AddInstrument {
                index,
                prev_selection,
                ..
            } => {
                editor.module.instruments.remove(*index);
                editor.view.selected_instrument = *prev_selection;
            }
            ModuleAction::RemoveInstrument { index, removed, .. } => {
                if let Some(inst) = removed {
                    editor.module.instruments.insert(*index, inst.clone());
                }
                editor.view.selected_instrument = Some(*index);
            }
            ModuleAction::RenameInstrument { index, old, .. } => {
                if let Some(inst) = editor.module.instruments.get_mut(*index) {
                    inst.name = old.clone();
                }
                editor.view.selected_instrument = Some(*index);
            }
            ModuleAction::AddTrack {
                index, prev_track, ..
            } => {
                editor.module.remove_track(*index);
                show_track(editor, *prev_track);
            }
            ModuleAction::RemoveTrack {
                index,
                removed,
                prev_track,
            } => {
                if let Some(track) = removed {
                    editor.module.insert_track(*index, track.clone());
                }
                show_track(editor, *prev_track);
            }
            ModuleAction::Import(import) => import.undo(editor),
        }
        editor.clamp_view();
    }

    pub fn is_identity(&self) -> bool {
        match self {
            ModuleAction::Metadata { old, new, .. } => old == new,
            ModuleAction::RenameInstrument { old, new, .. } => old == new,
            _ => false,
        }
    }

    /// Fold a follow-up edit of the same target into `self`.
    pub fn merge(&mut self, other: &ModuleAction) -> bool {
        match (self, other) {
            (
                ModuleAction::Metadata { field, new, .. },
                ModuleAction::Metadata {
                    field: next_field,
                    new: next_new,
                    ..
                },
            ) if field == next_field => {
                *new = next_new.clone();
                true
            }
            (
                ModuleAction::RenameInstrument { index, new, .. },
                ModuleAction::RenameInstrument {
                    index: next_index,
                    new: next_new,
                    ..
                },
            ) if index == next_index => {
                *new = next_new.clone();
                true
            }
            _ => false,
        }
    }

    pub fn update_views(&self, editor: &Editor, updates: &mut Vec<ViewUpdate>) {
        match self {
            ModuleAction::Metadata { .. } => push_unique(updates, ViewUpdate::SongInfo),
            ModuleAction::Comment { .. } => push_unique(updates, ViewUpdate::Comment),
            ModuleAction::AddInstrument { .. } => push_unique(updates, ViewUpdate::Instrument),
            ModuleAction::RemoveInstrument { index, next, .. } => {
                push_unique(updates, ViewUpdate::Instrument);
                if next.is_none() && !editor.module.instruments.is_used(*index) {
                    push_unique(updates, ViewUpdate::CloseInstrumentEditor);
                }
            }
            ModuleAction::RenameInstrument { .. } => {
                push_unique(updates, ViewUpdate::InstrumentName)
            }
            ModuleAction::AddTrack { .. } | ModuleAction::RemoveTrack { .. } => {
                push_unique(updates, ViewUpdate::Track);
                push_unique(updates, ViewUpdate::Frame);
            }
            ModuleAction::Import(import) => import.update_views(updates),
        }
    }
}

fn check_track_room(editor: &Editor, adding: usize) -> Result<(), EditError> {
    if editor.module.track_count() + adding > MAX_TRACKS {
        return Err(EditError::CapacityExceeded {
            what: "track",
            limit: MAX_TRACKS,
        });
    }
    Ok(())
}

/// Point the frame editor at `track` with the cursor at the top.
fn show_track(editor: &mut Editor, track: usize) {
    editor.view.track = track;
    editor.view.cursor = FrameCursor::default();
    editor.view.selection = None;
    editor.clamp_view();
}
