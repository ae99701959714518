//! A track (song): its frame list and per-channel pattern storage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::clip::FrameClipData;
use super::pattern::{Cell, Pattern};
use super::selection::IntRange;
use crate::InstrumentIndex;

/// One frame: the pattern index played by each channel.
pub type FrameRow = Vec<usize>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub speed: u8,
    pub tempo: u16,
    pattern_length: usize,
    channels: usize,
    /// Always holds at least one row; every row is `channels` wide
    frames: Vec<FrameRow>,
    /// Sparse pattern storage per channel. Absent entries are empty patterns.
    patterns: Vec<BTreeMap<usize, Pattern>>,
}

impl Track {
    pub fn new(channels: usize, pattern_length: usize, speed: u8, tempo: u16) -> Self {
        Self {
            title: String::new(),
            speed,
            tempo,
            pattern_length,
            channels,
            frames: vec![vec![0; channels]],
            patterns: vec![BTreeMap::new(); channels],
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn pattern_length(&self) -> usize {
        self.pattern_length
    }

    // ========================================================================
    // Frame list
    // ========================================================================

    pub fn pattern_at(&self, frame: usize, channel: usize) -> usize {
        self.frames
            .get(frame)
            .and_then(|row| row.get(channel))
            .copied()
            .unwrap_or(0)
    }

    pub fn set_pattern_at(&mut self, frame: usize, channel: usize, pattern: usize) {
        if let Some(slot) = self.frames.get_mut(frame).and_then(|row| row.get_mut(channel)) {
            *slot = pattern;
        }
    }

    pub fn frame_row(&self, frame: usize) -> Option<&FrameRow> {
        self.frames.get(frame)
    }

    pub fn set_frame_row(&mut self, frame: usize, row: FrameRow) {
        debug_assert_eq!(row.len(), self.channels);
        if let Some(slot) = self.frames.get_mut(frame) {
            *slot = row;
        }
    }

    pub fn frame_rows(&self) -> &[FrameRow] {
        &self.frames
    }

    /// Replace the whole frame list. Ignored when `rows` is empty.
    pub fn set_frame_rows(&mut self, rows: Vec<FrameRow>) {
        debug_assert!(rows.iter().all(|r| r.len() == self.channels));
        if !rows.is_empty() {
            self.frames = rows;
        }
    }

    /// Truncate or extend the frame list. New rows point every channel at pattern 0.
    pub fn set_frame_count(&mut self, count: usize) {
        debug_assert!(count > 0, "a track always keeps at least one frame");
        if count == 0 {
            return;
        }
        let channels = self.channels;
        self.frames.resize_with(count, || vec![0; channels]);
    }

    pub fn insert_frame(&mut self, at: usize, row: FrameRow) {
        self.insert_frames(at, vec![row]);
    }

    pub fn insert_frames(&mut self, at: usize, rows: Vec<FrameRow>) {
        let at = at.min(self.frames.len());
        self.frames.splice(at..at, rows);
    }

    /// Remove one frame. The last remaining frame is never removed.
    pub fn remove_frame(&mut self, at: usize) -> Option<FrameRow> {
        if at >= self.frames.len() || self.frames.len() == 1 {
            return None;
        }
        Some(self.frames.remove(at))
    }

    /// Remove a block of frames, keeping at least one frame in the track.
    pub fn remove_frames(&mut self, range: IntRange) -> Vec<FrameRow> {
        let Some(range) = range.clipped(self.frames.len()) else {
            return Vec::new();
        };
        if range.len() >= self.frames.len() {
            return Vec::new();
        }
        self.frames.drain(range.start..=range.end).collect()
    }

    pub fn swap_frames(&mut self, a: usize, b: usize) {
        if a < self.frames.len() && b < self.frames.len() {
            self.frames.swap(a, b);
        }
    }

    /// Whether any frame references `pattern` on `channel`.
    pub fn is_pattern_used(&self, channel: usize, pattern: usize) -> bool {
        self.frames.iter().any(|row| row.get(channel) == Some(&pattern))
    }

    // ========================================================================
    // Pattern storage
    // ========================================================================

    pub fn pattern(&self, channel: usize, index: usize) -> Option<&Pattern> {
        self.patterns.get(channel).and_then(|map| map.get(&index))
    }

    /// Store a pattern. Empty patterns are dropped from storage.
    pub fn set_pattern(&mut self, channel: usize, index: usize, pattern: Pattern) {
        let Some(map) = self.patterns.get_mut(channel) else {
            return;
        };
        if pattern.is_empty() {
            map.remove(&index);
        } else {
            map.insert(index, pattern);
        }
    }

    pub fn clear_pattern(&mut self, channel: usize, index: usize) -> Option<Pattern> {
        self.patterns.get_mut(channel).and_then(|map| map.remove(&index))
    }

    pub fn copy_pattern(&mut self, channel: usize, from: usize, to: usize) {
        match self.pattern(channel, from).cloned() {
            Some(p) => self.set_pattern(channel, to, p),
            None => {
                self.clear_pattern(channel, to);
            }
        }
    }

    pub fn is_pattern_empty(&self, channel: usize, index: usize) -> bool {
        self.pattern(channel, index).map_or(true, Pattern::is_empty)
    }

    /// Content equality, treating absent patterns as empty ones.
    pub fn patterns_equal(&self, channel: usize, a: usize, b: usize) -> bool {
        match (self.pattern(channel, a), self.pattern(channel, b)) {
            (None, None) => true,
            (Some(p), None) | (None, Some(p)) => p.is_empty(),
            (Some(p), Some(q)) => p == q,
        }
    }

    pub fn cell(&self, channel: usize, pattern: usize, row: usize) -> Cell {
        self.pattern(channel, pattern)
            .and_then(|p| p.cell(row))
            .copied()
            .unwrap_or_default()
    }

    pub fn set_cell(&mut self, channel: usize, pattern: usize, row: usize, cell: Cell) {
        let length = self.pattern_length;
        let mut p = self
            .pattern(channel, pattern)
            .cloned()
            .unwrap_or_else(|| Pattern::new(length));
        p.set_cell(row, cell);
        self.set_pattern(channel, pattern, p);
    }

    /// Patterns below `limit` on `channel` that are neither referenced nor hold data.
    pub fn free_patterns(&self, channel: usize, limit: usize) -> impl Iterator<Item = usize> + '_ {
        (0..limit).filter(move |&i| {
            !self.is_pattern_used(channel, i) && self.is_pattern_empty(channel, i)
        })
    }

    pub fn first_free_pattern(&self, channel: usize, limit: usize) -> Option<usize> {
        self.free_patterns(channel, limit).next()
    }

    /// Rewrite instrument references in every stored pattern.
    pub fn remap_instruments(&mut self, table: &[Option<InstrumentIndex>]) {
        for map in &mut self.patterns {
            for pattern in map.values_mut() {
                pattern.remap_instruments(table);
            }
        }
    }

    // ========================================================================
    // Rectangular regions
    // ========================================================================

    /// Deep copy of the frames x channels block. The ranges must lie inside the track.
    pub fn copy_region(&self, frames: IntRange, channels: IntRange) -> FrameClipData {
        let mut clip = FrameClipData::new(channels.start, channels.len(), frames.len());
        for (f, frame) in frames.iter().enumerate() {
            for (c, channel) in channels.iter().enumerate() {
                clip.set(f, c, self.pattern_at(frame, channel));
            }
        }
        clip
    }

    /// Write `clip` with its top-left corner at (`frame`, `channel`).
    /// Cells that fall outside the track are dropped.
    pub fn paste_region(&mut self, clip: &FrameClipData, frame: usize, channel: usize) {
        for f in 0..clip.frames {
            for c in 0..clip.channels {
                self.set_pattern_at(frame + f, channel + c, clip.get(f, c));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track_with_frames(rows: &[&[usize]]) -> Track {
        let mut t = Track::new(rows[0].len(), 16, 6, 150);
        t.set_frame_rows(rows.iter().map(|r| r.to_vec()).collect());
        t
    }

    #[test]
    fn new_track_has_single_zero_frame() {
        let t = Track::new(5, 64, 6, 150);
        assert_eq!(t.frame_count(), 1);
        assert_eq!(t.frame_row(0), Some(&vec![0; 5]));
    }

    #[test]
    fn set_frame_count_extends_with_zero_rows() {
        let mut t = track_with_frames(&[&[3, 4]]);
        t.set_frame_count(3);
        assert_eq!(t.frame_rows(), &[vec![3, 4], vec![0, 0], vec![0, 0]]);
        t.set_frame_count(1);
        assert_eq!(t.frame_rows(), &[vec![3, 4]]);
    }

    #[test]
    fn remove_keeps_last_frame() {
        let mut t = track_with_frames(&[&[1]]);
        assert_eq!(t.remove_frame(0), None);
        assert_eq!(t.frame_count(), 1);

        let mut t = track_with_frames(&[&[1], &[2], &[3]]);
        assert!(t.remove_frames(IntRange::new(0, 2)).is_empty());
        assert_eq!(t.remove_frames(IntRange::new(1, 2)), vec![vec![2], vec![3]]);
        assert_eq!(t.frame_count(), 1);
    }

    #[test]
    fn insert_and_swap() {
        let mut t = track_with_frames(&[&[1], &[2]]);
        t.insert_frames(1, vec![vec![7], vec![8]]);
        assert_eq!(t.frame_rows(), &[vec![1], vec![7], vec![8], vec![2]]);
        t.swap_frames(0, 3);
        assert_eq!(t.pattern_at(0, 0), 2);
        assert_eq!(t.pattern_at(3, 0), 1);
    }

    #[test]
    fn free_pattern_skips_used_and_non_empty() {
        let mut t = track_with_frames(&[&[0], &[1]]);
        t.set_cell(0, 2, 0, Cell::note(12, InstrumentIndex::new(0)));
        assert_eq!(t.first_free_pattern(0, 256), Some(3));
        assert_eq!(t.first_free_pattern(0, 3), None);
        let free: Vec<usize> = t.free_patterns(0, 6).collect();
        assert_eq!(free, vec![3, 4, 5]);
    }

    #[test]
    fn empty_patterns_are_not_stored() {
        let mut t = Track::new(1, 4, 6, 150);
        t.set_cell(0, 5, 1, Cell::note(1, InstrumentIndex::new(0)));
        assert!(t.pattern(0, 5).is_some());
        t.set_cell(0, 5, 1, Cell::default());
        assert!(t.pattern(0, 5).is_none());
        assert!(t.is_pattern_empty(0, 5));
    }

    #[test]
    fn patterns_equal_treats_absent_as_empty() {
        let mut t = Track::new(1, 4, 6, 150);
        assert!(t.patterns_equal(0, 0, 9));
        t.set_cell(0, 1, 0, Cell::note(1, InstrumentIndex::new(0)));
        t.set_cell(0, 2, 0, Cell::note(1, InstrumentIndex::new(0)));
        assert!(t.patterns_equal(0, 1, 2));
        assert!(!t.patterns_equal(0, 0, 1));
    }

    #[test]
    fn copy_and_paste_region() {
        let mut t = track_with_frames(&[&[1, 2, 3], &[4, 5, 6]]);
        let clip = t.copy_region(IntRange::new(0, 1), IntRange::new(1, 2));
        assert_eq!(clip.row(0), &[2, 3]);
        assert_eq!(clip.row(1), &[5, 6]);
        // Paste overlapping the right edge: column 2 is dropped
        t.paste_region(&clip, 0, 2);
        assert_eq!(t.frame_rows(), &[vec![1, 2, 2], vec![4, 5, 5]]);
    }
}
