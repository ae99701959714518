//! View notifications emitted by actions after they run.
//!
//! The core only reports which part of the document changed; what a
//! front-end redraws in response is its own business.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewUpdate {
    /// Frame list contents or frame-editor cursor changed
    Frame,
    /// Pattern contents changed
    Pattern,
    /// Instrument table changed (add/remove/selection)
    Instrument,
    InstrumentName,
    /// Title/artist/copyright changed
    SongInfo,
    Comment,
    /// Track list or track properties changed
    Track,
    /// No instrument remains to show in the instrument editor
    CloseInstrumentEditor,
    /// Status bar message
    Status(String),
}

/// Push `update` unless an identical notification is already queued.
pub fn push_unique(updates: &mut Vec<ViewUpdate>, update: ViewUpdate) {
    if !updates.contains(&update) {
        updates.push(update);
    }
}
