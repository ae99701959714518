//! Frame editor geometry: ranges, cursor and rectangular selections.

use serde::{Deserialize, Serialize};

/// Inclusive integer range, always stored with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntRange {
    pub start: usize,
    pub end: usize,
}

impl IntRange {
    /// Build a range from two endpoints in either order.
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn single(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Never true; an inclusive range holds at least one element.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, x: usize) -> bool {
        x >= self.start && x <= self.end
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }

    /// Intersect with `0..limit`, returning `None` when nothing remains.
    pub fn clipped(&self, limit: usize) -> Option<Self> {
        if limit == 0 || self.start >= limit {
            return None;
        }
        Some(Self {
            start: self.start,
            end: self.end.min(limit - 1),
        })
    }
}

/// Cursor position in the frame editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameCursor {
    pub frame: usize,
    pub channel: usize,
}

impl FrameCursor {
    pub fn new(frame: usize, channel: usize) -> Self {
        Self { frame, channel }
    }
}

/// Rectangular frame-editor selection between an anchor and the moving end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSelection {
    pub anchor: FrameCursor,
    pub extent: FrameCursor,
}

impl FrameSelection {
    pub fn new(anchor: FrameCursor, extent: FrameCursor) -> Self {
        Self { anchor, extent }
    }

    /// Selection spanning whole rows `frames` across `channels` channels.
    pub fn rows(frames: IntRange, channels: usize) -> Self {
        Self {
            anchor: FrameCursor::new(frames.start, 0),
            extent: FrameCursor::new(frames.end, channels.saturating_sub(1)),
        }
    }

    pub fn frames(&self) -> IntRange {
        IntRange::new(self.anchor.frame, self.extent.frame)
    }

    pub fn channels(&self) -> IntRange {
        IntRange::new(self.anchor.channel, self.extent.channel)
    }

    pub fn frame_start(&self) -> usize {
        self.frames().start
    }

    pub fn frame_end(&self) -> usize {
        self.frames().end
    }

    pub fn chan_start(&self) -> usize {
        self.channels().start
    }

    pub fn chan_end(&self) -> usize {
        self.channels().end
    }
}
