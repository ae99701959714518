//! # famitracker-types
//!
//! Document model shared by the FamiTracker editing core: modules, tracks,
//! frame lists, patterns, instruments, and the frame-editor geometry that
//! edit actions operate on.
//!
//! Types here carry data and simple mutators only. Undo/redo, merging and
//! view notification live in `famitracker-core`.

pub mod state;

// Re-export all state types at crate root for convenience
pub use state::*;

/// Maximum number of frames in a single track.
pub const MAX_FRAMES: usize = 256;
/// Upper bound for the per-module pattern ceiling (pattern indices are `0..MAX_PATTERN`).
pub const MAX_PATTERN: usize = 256;
/// Maximum number of rows in a pattern.
pub const MAX_PATTERN_LENGTH: usize = 256;
/// Maximum number of tracks (songs) in a module.
pub const MAX_TRACKS: usize = 64;
/// Number of instrument slots in a module.
pub const MAX_INSTRUMENTS: usize = 64;
/// Maximum number of channels a module can enable.
pub const MAX_CHANNELS: usize = 28;
/// Size of the title/artist/copyright fields, including the terminator slot.
pub const METADATA_FIELD_LENGTH: usize = 32;
/// Size of an instrument name, including the terminator slot.
pub const INST_NAME_MAX: usize = 128;

/// Truncate `s` so it fits a fixed-size field of `field_len` slots.
///
/// One slot is reserved for the terminator, so at most `field_len - 1`
/// characters survive.
pub fn truncate_field(s: &str, field_len: usize) -> String {
    s.chars().take(field_len.saturating_sub(1)).collect()
}

/// Index of an instrument slot (`0..MAX_INSTRUMENTS`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct InstrumentIndex(usize);

impl InstrumentIndex {
    pub fn new(index: usize) -> Self {
        Self(index)
    }
    pub fn get(self) -> usize {
        self.0
    }
    /// Whether the index addresses an existing slot.
    pub fn is_valid(self) -> bool {
        self.0 < MAX_INSTRUMENTS
    }
}

impl std::fmt::Display for InstrumentIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02X}", self.0)
    }
}
