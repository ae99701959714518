//! Editor view state that edits read and move (cursor, selection, current
//! track and instrument). None of it is part of the saved document.

use serde::{Deserialize, Serialize};

use famitracker_types::{FrameCursor, FrameSelection, InstrumentIndex, IntRange, Track};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    /// Index of the track shown in the frame editor
    pub track: usize,
    pub cursor: FrameCursor,
    pub selection: Option<FrameSelection>,
    pub selected_instrument: Option<InstrumentIndex>,
    pub instrument_editor_open: bool,
}

impl ViewState {
    /// Pull cursor and selection back inside `track`. A selection that no
    /// longer overlaps the frame list is dropped.
    pub fn clamp_to(&mut self, track: &Track) {
        let last_frame = track.frame_count().saturating_sub(1);
        let last_channel = track.channel_count().saturating_sub(1);
        self.cursor.frame = self.cursor.frame.min(last_frame);
        self.cursor.channel = self.cursor.channel.min(last_channel);
        if let Some(sel) = self.selection {
            if sel.frame_start() > last_frame || sel.chan_start() > last_channel {
                self.selection = None;
            } else {
                let clamp = |c: FrameCursor| {
                    FrameCursor::new(c.frame.min(last_frame), c.channel.min(last_channel))
                };
                self.selection = Some(FrameSelection::new(clamp(sel.anchor), clamp(sel.extent)));
            }
        }
    }

    /// Frames x channels an edit applies to: the selection when one is
    /// active, otherwise the cursor cell. `None` if nothing lies inside `track`.
    pub fn target_region(&self, track: &Track) -> Option<(IntRange, IntRange)> {
        let (frames, channels) = match self.selection {
            Some(sel) => (sel.frames(), sel.channels()),
            None => (
                IntRange::single(self.cursor.frame),
                IntRange::single(self.cursor.channel),
            ),
        };
        Some((
            frames.clipped(track.frame_count())?,
            channels.clipped(track.channel_count())?,
        ))
    }
}

/// Frame-editor position captured around a frame edit and re-applied on
/// undo (the "before" image) and redo (the "after" image).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameEditorState {
    pub track: usize,
    pub cursor: FrameCursor,
    pub selection: Option<FrameSelection>,
}

impl FrameEditorState {
    pub fn capture(view: &ViewState) -> Self {
        Self {
            track: view.track,
            cursor: view.cursor,
            selection: view.selection,
        }
    }

    pub fn apply(&self, view: &mut ViewState) {
        view.track = self.track;
        view.cursor = self.cursor;
        view.selection = self.selection;
    }
}
