//! Importing tracks and instruments from another module.
//!
//! Everything is validated and copied when the import is built: the
//! selected tracks are cloned with their instrument references already
//! rewritten to the slots the imported instruments will occupy.

use serde::{Deserialize, Serialize};

use famitracker_types::{Instrument, InstrumentIndex, Module, Track, MAX_INSTRUMENTS, MAX_TRACKS};

use crate::error::EditError;
use crate::state::Editor;
use crate::update::{push_unique, ViewUpdate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportModule {
    tracks: Vec<Track>,
    /// Destination slot for each imported instrument
    instruments: Vec<(InstrumentIndex, Instrument)>,
    /// Index the first imported track lands at
    first_track: usize,
}

impl ImportModule {
    /// Prepare an import of `tracks` from `source` into `dest`.
    ///
    /// Refused when the channel layouts differ, when a track index is
    /// unknown, when `dest` lacks room for the tracks or instruments, or
    /// when the source uses pattern indices `dest` cannot hold.
    pub fn new(
        dest: &Module,
        source: &Module,
        tracks: &[usize],
        import_instruments: bool,
    ) -> Result<Self, EditError> {
        if source.channel_count() != dest.channel_count() {
            return Err(EditError::IncompatibleModule(format!(
                "source has {} channels, module has {}",
                source.channel_count(),
                dest.channel_count()
            )));
        }
        if tracks.is_empty() {
            return Err(EditError::InvalidTarget("no tracks selected"));
        }
        if dest.track_count() + tracks.len() > MAX_TRACKS {
            return Err(EditError::CapacityExceeded {
                what: "track",
                limit: MAX_TRACKS,
            });
        }

        let mut table: Vec<Option<InstrumentIndex>> = vec![None; MAX_INSTRUMENTS];
        let mut instruments = Vec::new();
        if import_instruments {
            let free: Vec<InstrumentIndex> = dest.instruments.free_slots().collect();
            if source.instruments.count() > free.len() {
                return Err(EditError::CapacityExceeded {
                    what: "instrument",
                    limit: MAX_INSTRUMENTS,
                });
            }
            for ((from, inst), to) in source.instruments.used_slots().zip(free) {
                table[from.get()] = Some(to);
                instruments.push((to, inst.clone()));
            }
        }

        let mut copied = Vec::with_capacity(tracks.len());
        for &index in tracks {
            let track = source.track(index).ok_or(EditError::OutOfRange {
                what: "track",
                index,
            })?;
            let highest = track.frame_rows().iter().flatten().copied().max().unwrap_or(0);
            if highest >= dest.pattern_limit() {
                return Err(EditError::IncompatibleModule(format!(
                    "track {} uses pattern {:02X}, module allows {:02X}",
                    index,
                    highest,
                    dest.max_pattern_index()
                )));
            }
            let mut track = track.clone();
            if import_instruments {
                track.remap_instruments(&table);
            }
            copied.push(track);
        }

        Ok(Self {
            tracks: copied,
            instruments,
            first_track: dest.track_count(),
        })
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn instrument_count(&self) -> usize {
        self.instruments.len()
    }

    pub(super) fn save_state(&mut self, editor: &Editor) -> Result<(), EditError> {
        let module = &editor.module;
        if module.track_count() + self.tracks.len() > MAX_TRACKS {
            return Err(EditError::CapacityExceeded {
                what: "track",
                limit: MAX_TRACKS,
            });
        }
        if let Some((slot, _)) = self
            .instruments
            .iter()
            .find(|(slot, _)| module.instruments.is_used(*slot))
        {
            return Err(EditError::SlotOccupied(*slot));
        }
        self.first_track = module.track_count();
        Ok(())
    }

    pub(super) fn redo(&self, editor: &mut Editor) {
        for (slot, inst) in &self.instruments {
            editor.module.instruments.insert(*slot, inst.clone());
        }
        for (i, track) in self.tracks.iter().enumerate() {
            editor.module.insert_track(self.first_track + i, track.clone());
        }
    }

    pub(super) fn undo(&self, editor: &mut Editor) {
        editor.module.truncate_tracks(self.first_track);
        for (slot, _) in &self.instruments {
            editor.module.instruments.remove(*slot);
        }
    }

    pub(super) fn update_views(&self, updates: &mut Vec<ViewUpdate>) {
        push_unique(updates, ViewUpdate::Track);
        if !self.instruments.is_empty() {
            push_unique(updates, ViewUpdate::Instrument);
        }
    }
}
