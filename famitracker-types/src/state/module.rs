//! The module document: metadata, tracks and instruments.

use serde::{Deserialize, Serialize};

use super::instrument::InstrumentManager;
use super::track::Track;
use crate::{MAX_CHANNELS, MAX_PATTERN, MAX_PATTERN_LENGTH, MAX_TRACKS};

/// Song information fields plus the module comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    pub title: String,
    pub artist: String,
    pub copyright: String,
    pub comment: String,
    pub show_comment_on_open: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub metadata: ModuleMetadata,
    pub instruments: InstrumentManager,
    channels: usize,
    /// Number of usable pattern indices per channel (indices are `0..pattern_limit`)
    pattern_limit: usize,
    pattern_length: usize,
    speed: u8,
    tempo: u16,
    /// Never empty
    tracks: Vec<Track>,
}

impl Default for Module {
    fn default() -> Self {
        Self::new(5, 64, MAX_PATTERN, 6, 150)
    }
}

impl Module {
    /// Create a module with one empty track. Arguments are clamped to engine limits.
    pub fn new(
        channels: usize,
        pattern_length: usize,
        pattern_limit: usize,
        speed: u8,
        tempo: u16,
    ) -> Self {
        let channels = channels.clamp(1, MAX_CHANNELS);
        let pattern_length = pattern_length.clamp(1, MAX_PATTERN_LENGTH);
        let pattern_limit = pattern_limit.clamp(1, MAX_PATTERN);
        Self {
            metadata: ModuleMetadata::default(),
            instruments: InstrumentManager::new(),
            channels,
            pattern_limit,
            pattern_length,
            speed,
            tempo,
            tracks: vec![Track::new(channels, pattern_length, speed, tempo)],
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels
    }

    pub fn pattern_limit(&self) -> usize {
        self.pattern_limit
    }

    /// Highest pattern index an edit may write.
    pub fn max_pattern_index(&self) -> usize {
        self.pattern_limit - 1
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn track_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// A blank track using this module's channel layout and defaults.
    pub fn new_track(&self) -> Track {
        Track::new(self.channels, self.pattern_length, self.speed, self.tempo)
    }

    /// Insert a track at `at` (clamped to the end). Refused once `MAX_TRACKS`
    /// is reached or when the channel layout differs.
    pub fn insert_track(&mut self, at: usize, track: Track) -> bool {
        if self.tracks.len() >= MAX_TRACKS || track.channel_count() != self.channels {
            return false;
        }
        let at = at.min(self.tracks.len());
        self.tracks.insert(at, track);
        true
    }

    /// Remove a track. The last remaining track is never removed.
    pub fn remove_track(&mut self, at: usize) -> Option<Track> {
        if at >= self.tracks.len() || self.tracks.len() == 1 {
            return None;
        }
        Some(self.tracks.remove(at))
    }

    /// Drop every track from `len` onwards (keeps at least one track).
    pub fn truncate_tracks(&mut self, len: usize) {
        self.tracks.truncate(len.max(1));
    }
}
