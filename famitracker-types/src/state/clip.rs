//! Rectangular snapshots of frame-list contents.

use serde::{Deserialize, Serialize};

use super::selection::IntRange;

/// Deep copy of a frames x channels block of pattern indices.
///
/// Used both as clipboard payload and as the "before" image an action
/// restores on undo. Data is row-major: `data[frame * channels + channel]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameClipData {
    /// First channel the block was taken from
    pub channel_offset: usize,
    pub channels: usize,
    pub frames: usize,
    data: Vec<usize>,
}

impl FrameClipData {
    pub fn new(channel_offset: usize, channels: usize, frames: usize) -> Self {
        Self {
            channel_offset,
            channels,
            frames,
            data: vec![0; channels * frames],
        }
    }

    /// Build a block from explicit rows. Every row must have `channels` entries.
    pub fn from_rows(channel_offset: usize, rows: &[Vec<usize>]) -> Self {
        let channels = rows.first().map(Vec::len).unwrap_or(0);
        debug_assert!(rows.iter().all(|r| r.len() == channels));
        Self {
            channel_offset,
            channels,
            frames: rows.len(),
            data: rows.iter().flatten().copied().collect(),
        }
    }

    pub fn get(&self, frame: usize, channel: usize) -> usize {
        if frame >= self.frames || channel >= self.channels {
            return 0;
        }
        self.data[frame * self.channels + channel]
    }

    pub fn set(&mut self, frame: usize, channel: usize, pattern: usize) {
        if frame < self.frames && channel < self.channels {
            self.data[frame * self.channels + channel] = pattern;
        }
    }

    /// Absolute channel range covered by the block.
    pub fn channel_range(&self) -> Option<IntRange> {
        if self.channels == 0 {
            return None;
        }
        Some(IntRange::new(
            self.channel_offset,
            self.channel_offset + self.channels - 1,
        ))
    }

    pub fn is_empty(&self) -> bool {
        self.frames == 0 || self.channels == 0
    }

    /// Whether the block covers every channel of a `channel_count`-wide frame list.
    pub fn is_full_width(&self, channel_count: usize) -> bool {
        self.channel_offset == 0 && self.channels == channel_count
    }

    /// Every pattern index in the block, row by row.
    pub fn patterns(&self) -> impl Iterator<Item = usize> + '_ {
        self.data.iter().copied()
    }

    pub fn row(&self, frame: usize) -> &[usize] {
        if frame >= self.frames {
            return &[];
        }
        let start = frame * self.channels;
        &self.data[start..start + self.channels]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_row_major() {
        let mut clip = FrameClipData::new(1, 3, 2);
        clip.set(1, 2, 9);
        clip.set(0, 0, 4);
        assert_eq!(clip.get(1, 2), 9);
        assert_eq!(clip.get(0, 0), 4);
        assert_eq!(clip.row(1), &[0, 0, 9]);
        assert_eq!(clip.get(5, 5), 0);
    }

    #[test]
    fn from_rows_and_width() {
        let clip = FrameClipData::from_rows(0, &[vec![1, 2], vec![3, 4]]);
        assert_eq!(clip.frames, 2);
        assert_eq!(clip.channels, 2);
        assert!(clip.is_full_width(2));
        assert!(!clip.is_full_width(5));
        assert_eq!(clip.channel_range(), Some(IntRange::new(0, 1)));
    }

    #[test]
    fn empty_clip() {
        let clip = FrameClipData::from_rows(0, &[]);
        assert!(clip.is_empty());
        assert_eq!(clip.channel_range(), None);
    }
}
