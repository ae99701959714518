//! Frame-list edits: inserting, removing, reordering and rewriting the
//! pattern indices of a track's frames.
//!
//! Every frame action records the track it targets and the frames x
//! channels region it covers when `save_state` runs, together with the
//! frame-editor position before and after the edit. All captured data is
//! owned by the action; undo restores from it regardless of what happened
//! to the live document in between.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use famitracker_types::{
    FrameClipData, FrameCursor, FrameRow, FrameSelection, IntRange, Track, MAX_FRAMES,
};

use crate::error::EditError;
use crate::state::{Editor, FrameEditorState};
use crate::update::{push_unique, ViewUpdate};

/// A pattern copied to a fresh index on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternClone {
    pub channel: usize,
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameActionKind {
    /// Insert a row of free patterns after the cursor frame
    AddFrame { row: FrameRow },
    RemoveFrame { row: FrameRow },
    /// Insert a copy of the cursor row after it
    DuplicateFrame { row: FrameRow },
    /// Like `DuplicateFrame`, but each channel gets a fresh copy of its
    /// pattern. `None` where no free index was left (the row then shares
    /// the source pattern).
    CloneFrame {
        row: FrameRow,
        created: Vec<Option<usize>>,
    },
    /// Resize the frame list. `dropped` holds the original rows from
    /// `keep` up to `old`, where `keep` is the smallest count the edit
    /// passed through.
    FrameCount {
        old: usize,
        new: usize,
        keep: usize,
        dropped: Vec<FrameRow>,
    },
    SetPattern {
        pattern: usize,
        clip: FrameClipData,
    },
    SetPatternAll {
        pattern: usize,
        row: FrameRow,
    },
    /// Relative change, clamped to the pattern ceiling
    ChangePattern {
        offset: i32,
        clip: FrameClipData,
        overflow: bool,
    },
    /// Relative change of a whole row, wrapping at the pattern ceiling
    ChangePatternAll {
        offset: i32,
        row: FrameRow,
        overflow: bool,
    },
    MoveDown,
    MoveUp,
    ClonePatterns {
        clip: FrameClipData,
        plan: Vec<PatternClone>,
    },
    /// Insert the clip's rows at `frame`; channels outside the clip get pattern 0
    Paste {
        clip: FrameClipData,
        frame: usize,
        clone: bool,
        plan: Vec<PatternClone>,
    },
    PasteOverwrite {
        clip: FrameClipData,
        old: FrameClipData,
        origin: FrameCursor,
    },
    /// Move the selected rows so they start before frame `target`
    DropMove { target: usize, rows: Vec<FrameRow> },
    DeleteSelection { rows: Vec<FrameRow> },
    MergeDuplicated {
        old: Vec<FrameRow>,
        new: Vec<FrameRow>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameAction {
    kind: FrameActionKind,
    track: usize,
    frames: IntRange,
    channels: IntRange,
    undo_state: Option<FrameEditorState>,
    redo_state: Option<FrameEditorState>,
}

impl FrameAction {
    fn new(kind: FrameActionKind) -> Self {
        Self {
            kind,
            track: 0,
            frames: IntRange::single(0),
            channels: IntRange::single(0),
            undo_state: None,
            redo_state: None,
        }
    }

    pub fn add_frame() -> Self {
        Self::new(FrameActionKind::AddFrame { row: Vec::new() })
    }

    pub fn remove_frame() -> Self {
        Self::new(FrameActionKind::RemoveFrame { row: Vec::new() })
    }

    pub fn duplicate_frame() -> Self {
        Self::new(FrameActionKind::DuplicateFrame { row: Vec::new() })
    }

    pub fn clone_frame() -> Self {
        Self::new(FrameActionKind::CloneFrame {
            row: Vec::new(),
            created: Vec::new(),
        })
    }

    pub fn frame_count(count: usize) -> Self {
        Self::new(FrameActionKind::FrameCount {
            old: 0,
            new: count,
            keep: 0,
            dropped: Vec::new(),
        })
    }

    pub fn set_pattern(pattern: usize) -> Self {
        Self::new(FrameActionKind::SetPattern {
            pattern,
            clip: FrameClipData::default(),
        })
    }

    pub fn set_pattern_all(pattern: usize) -> Self {
        Self::new(FrameActionKind::SetPatternAll {
            pattern,
            row: Vec::new(),
        })
    }

    pub fn change_pattern(offset: i32) -> Self {
        Self::new(FrameActionKind::ChangePattern {
            offset,
            clip: FrameClipData::default(),
            overflow: false,
        })
    }

    pub fn change_pattern_all(offset: i32) -> Self {
        Self::new(FrameActionKind::ChangePatternAll {
            offset,
            row: Vec::new(),
            overflow: false,
        })
    }

    pub fn move_down() -> Self {
        Self::new(FrameActionKind::MoveDown)
    }

    pub fn move_up() -> Self {
        Self::new(FrameActionKind::MoveUp)
    }

    pub fn clone_patterns() -> Self {
        Self::new(FrameActionKind::ClonePatterns {
            clip: FrameClipData::default(),
            plan: Vec::new(),
        })
    }

    pub fn paste(clip: FrameClipData, frame: usize, clone: bool) -> Self {
        Self::new(FrameActionKind::Paste {
            clip,
            frame,
            clone,
            plan: Vec::new(),
        })
    }

    pub fn paste_overwrite(clip: FrameClipData) -> Self {
        Self::new(FrameActionKind::PasteOverwrite {
            clip,
            old: FrameClipData::default(),
            origin: FrameCursor::default(),
        })
    }

    pub fn drop_move(target: usize) -> Self {
        Self::new(FrameActionKind::DropMove {
            target,
            rows: Vec::new(),
        })
    }

    pub fn delete_selection() -> Self {
        Self::new(FrameActionKind::DeleteSelection { rows: Vec::new() })
    }

    pub fn merge_duplicated() -> Self {
        Self::new(FrameActionKind::MergeDuplicated {
            old: Vec::new(),
            new: Vec::new(),
        })
    }

    pub fn kind(&self) -> &FrameActionKind {
        &self.kind
    }

    pub fn track(&self) -> usize {
        self.track
    }

    /// Whether a relative change ran into the pattern ceiling.
    pub fn overflowed(&self) -> bool {
        matches!(
            self.kind,
            FrameActionKind::ChangePattern { overflow: true, .. }
                | FrameActionKind::ChangePatternAll { overflow: true, .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            FrameActionKind::AddFrame { .. } => "Add frame",
            FrameActionKind::RemoveFrame { .. } => "Remove frame",
            FrameActionKind::DuplicateFrame { .. } => "Duplicate frame",
            FrameActionKind::CloneFrame { .. } => "Clone frame",
            FrameActionKind::FrameCount { .. } => "Frame count",
            FrameActionKind::SetPattern { .. } => "Set pattern",
            FrameActionKind::SetPatternAll { .. } => "Set pattern (all channels)",
            FrameActionKind::ChangePattern { .. } => "Change pattern",
            FrameActionKind::ChangePatternAll { .. } => "Change pattern (all channels)",
            FrameActionKind::MoveDown => "Move frame down",
            FrameActionKind::MoveUp => "Move frame up",
            FrameActionKind::ClonePatterns { .. } => "Clone patterns",
            FrameActionKind::Paste { .. } => "Paste frames",
            FrameActionKind::PasteOverwrite { .. } => "Paste frames (overwrite)",
            FrameActionKind::DropMove { .. } => "Move frames",
            FrameActionKind::DeleteSelection { .. } => "Delete frames",
            FrameActionKind::MergeDuplicated { .. } => "Merge duplicated patterns",
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Capture everything the edit overwrites and check it is worth recording.
    /// Never touches the document.
    pub fn save_state(&mut self, editor: &Editor) -> Result<(), EditError> {
        let track_index = editor.view.track;
        let track = editor.module.track(track_index).ok_or(EditError::OutOfRange {
            what: "track",
            index: track_index,
        })?;
        let limit = editor.module.pattern_limit();
        let count = track.frame_count();
        let channel_count = track.channel_count();
        let cursor = editor.view.cursor;
        if cursor.frame >= count {
            return Err(EditError::OutOfRange {
                what: "frame",
                index: cursor.frame,
            });
        }

        self.track = track_index;
        self.frames = IntRange::single(cursor.frame);
        self.channels = IntRange::new(0, channel_count - 1);
        let frame = cursor.frame;

        match &mut self.kind {
            FrameActionKind::AddFrame { row } => {
                check_room(count, 1)?;
                *row = (0..channel_count)
                    .map(|ch| track.first_free_pattern(ch, limit).unwrap_or(0))
                    .collect();
            }
            FrameActionKind::RemoveFrame { row } => {
                if count == 1 {
                    return Err(EditError::InvalidTarget("cannot remove the last frame"));
                }
                *row = frame_row(track, frame);
            }
            FrameActionKind::DuplicateFrame { row } => {
                check_room(count, 1)?;
                *row = frame_row(track, frame);
            }
            FrameActionKind::CloneFrame { row, created } => {
                check_room(count, 1)?;
                *row = frame_row(track, frame);
                *created = (0..channel_count)
                    .map(|ch| track.first_free_pattern(ch, limit))
                    .collect();
            }
            FrameActionKind::FrameCount {
                old,
                new,
                keep,
                dropped,
            } => {
                if *new == 0 || *new > MAX_FRAMES {
                    return Err(EditError::OutOfRange {
                        what: "frame count",
                        index: *new,
                    });
                }
                if *new == count {
                    return Err(EditError::NoChange);
                }
                *old = count;
                *keep = count.min(*new);
                *dropped = track.frame_rows()[*keep..].to_vec();
            }
            FrameActionKind::SetPattern { pattern, clip } => {
                check_pattern(*pattern, limit)?;
                let (frames, channels) = region(editor, track)?;
                self.frames = frames;
                self.channels = channels;
                *clip = track.copy_region(frames, channels);
                if all_cells(clip, |p| p == *pattern) {
                    return Err(EditError::NoChange);
                }
            }
            FrameActionKind::SetPatternAll { pattern, row } => {
                check_pattern(*pattern, limit)?;
                *row = frame_row(track, frame);
                if row.iter().all(|&p| p == *pattern) {
                    return Err(EditError::NoChange);
                }
            }
            FrameActionKind::ChangePattern {
                offset,
                clip,
                overflow,
            } => {
                let (frames, channels) = region(editor, track)?;
                self.frames = frames;
                self.channels = channels;
                *clip = track.copy_region(frames, channels);
                let offset = i64::from(*offset);
                let max = limit as i64 - 1;
                *overflow = !all_cells(clip, |p| (0..=max).contains(&(p as i64 + offset)));
                if all_cells(clip, |p| clamp_offset(p, offset, limit) == p) {
                    return Err(EditError::NoChange);
                }
            }
            FrameActionKind::ChangePatternAll {
                offset,
                row,
                overflow,
            } => {
                if i64::from(*offset).rem_euclid(limit as i64) == 0 {
                    return Err(EditError::NoChange);
                }
                *row = frame_row(track, frame);
                let offset = i64::from(*offset);
                *overflow = row
                    .iter()
                    .any(|&p| !(0..limit as i64).contains(&(p as i64 + offset)));
            }
            FrameActionKind::MoveDown => {
                if frame + 1 >= count {
                    return Err(EditError::InvalidTarget("already the last frame"));
                }
            }
            FrameActionKind::MoveUp => {
                if frame == 0 {
                    return Err(EditError::InvalidTarget("already the first frame"));
                }
            }
            FrameActionKind::ClonePatterns { clip, plan } => {
                let (frames, channels) = region(editor, track)?;
                self.frames = frames;
                self.channels = channels;
                *clip = track.copy_region(frames, channels);
                *plan = plan_clones(track, clip, limit)?;
            }
            FrameActionKind::Paste {
                clip,
                frame: at,
                clone,
                plan,
            } => {
                if clip.is_empty() {
                    return Err(EditError::InvalidTarget("nothing to paste"));
                }
                if *at > count {
                    return Err(EditError::OutOfRange {
                        what: "frame",
                        index: *at,
                    });
                }
                check_room(count, clip.frames)?;
                if clip.channel_offset + clip.channels > channel_count {
                    return Err(EditError::OutOfRange {
                        what: "channel",
                        index: clip.channel_offset + clip.channels - 1,
                    });
                }
                if clip.patterns().any(|p| p >= limit) {
                    return Err(EditError::OutOfRange {
                        what: "pattern",
                        index: clip.patterns().max().unwrap_or(0),
                    });
                }
                *plan = if *clone {
                    plan_clones(track, clip, limit)?
                } else {
                    Vec::new()
                };
                self.frames = IntRange::new(*at, *at + clip.frames - 1);
                self.channels = IntRange::new(
                    clip.channel_offset,
                    clip.channel_offset + clip.channels - 1,
                );
            }
            FrameActionKind::PasteOverwrite { clip, old, origin } => {
                if clip.is_empty() {
                    return Err(EditError::InvalidTarget("nothing to paste"));
                }
                let channel = if clip.is_full_width(channel_count) {
                    0
                } else {
                    cursor.channel
                };
                *origin = FrameCursor::new(frame, channel);
                let frames = IntRange::new(frame, frame + clip.frames - 1).clipped(count);
                let channels =
                    IntRange::new(channel, channel + clip.channels - 1).clipped(channel_count);
                let (Some(frames), Some(channels)) = (frames, channels) else {
                    return Err(EditError::InvalidTarget("paste target outside the track"));
                };
                self.frames = frames;
                self.channels = channels;
                *old = track.copy_region(frames, channels);
            }
            FrameActionKind::DropMove { target, rows } => {
                let selected = selected_frames(editor, track)?;
                if *target > count {
                    return Err(EditError::OutOfRange {
                        what: "frame",
                        index: *target,
                    });
                }
                if *target >= selected.start && *target <= selected.end + 1 {
                    return Err(EditError::InvalidTarget("drop target inside the selection"));
                }
                self.frames = selected;
                *rows = track.frame_rows()[selected.start..=selected.end].to_vec();
            }
            FrameActionKind::DeleteSelection { rows } => {
                let (frames, _) = region(editor, track)?;
                if frames.len() >= count {
                    return Err(EditError::InvalidTarget("cannot delete every frame"));
                }
                self.frames = frames;
                *rows = track.frame_rows()[frames.start..=frames.end].to_vec();
            }
            FrameActionKind::MergeDuplicated { old, new } => {
                *old = track.frame_rows().to_vec();
                *new = merged_rows(track);
                if old == new {
                    return Err(EditError::NoChange);
                }
                self.frames = IntRange::new(0, count - 1);
            }
        }
        Ok(())
    }

    pub fn save_undo_state(&mut self, editor: &Editor) {
        self.undo_state = Some(FrameEditorState::capture(&editor.view));
    }

    pub fn save_redo_state(&mut self, editor: &Editor) {
        self.redo_state = Some(FrameEditorState::capture(&editor.view));
    }

    pub fn restore_undo_state(&self, editor: &mut Editor) {
        if let Some(state) = &self.undo_state {
            state.apply(&mut editor.view);
        }
        editor.clamp_view();
    }

    pub fn restore_redo_state(&self, editor: &mut Editor) {
        if let Some(state) = &self.redo_state {
            state.apply(&mut editor.view);
        }
        editor.clamp_view();
    }

    /// Apply the edit. Runs the first time as well as on every redo.
    pub fn redo(&self, editor: &mut Editor) {
        let limit = editor.module.pattern_limit();
        let Some(track) = editor.module.track_mut(self.track) else {
            debug_assert!(false, "frame action on missing track {}", self.track);
            return;
        };
        let frame = self.frames.start;
        let view = &mut editor.view;

        match &self.kind {
            FrameActionKind::AddFrame { row } | FrameActionKind::DuplicateFrame { row } => {
                track.insert_frame(frame + 1, row.clone());
                view.cursor.frame = frame + 1;
                view.selection = None;
            }
            FrameActionKind::RemoveFrame { .. } => {
                track.remove_frame(frame);
                view.cursor.frame = frame.min(track.frame_count() - 1);
                view.selection = None;
            }
            FrameActionKind::CloneFrame { row, created } => {
                let mut new_row = row.clone();
                for (ch, target) in created.iter().enumerate() {
                    if let Some(to) = *target {
                        track.copy_pattern(ch, row[ch], to);
                        new_row[ch] = to;
                    }
                }
                track.insert_frame(frame + 1, new_row);
                view.cursor.frame = frame + 1;
                view.selection = None;
            }
            FrameActionKind::FrameCount { new, keep, .. } => {
                track.set_frame_count(*keep);
                track.set_frame_count(*new);
            }
            FrameActionKind::SetPattern { pattern, .. } => {
                for f in self.frames.iter() {
                    for ch in self.channels.iter() {
                        track.set_pattern_at(f, ch, *pattern);
                    }
                }
            }
            FrameActionKind::SetPatternAll { pattern, .. } => {
                for ch in 0..track.channel_count() {
                    track.set_pattern_at(frame, ch, *pattern);
                }
            }
            FrameActionKind::ChangePattern { offset, clip, .. } => {
                let offset = i64::from(*offset);
                for (f, ch, p) in clip_cells(clip, self.frames.start) {
                    track.set_pattern_at(f, ch, clamp_offset(p, offset, limit));
                }
            }
            FrameActionKind::ChangePatternAll { offset, row, .. } => {
                let offset = i64::from(*offset);
                for (ch, &p) in row.iter().enumerate() {
                    let wrapped = (p as i64 + offset).rem_euclid(limit as i64) as usize;
                    track.set_pattern_at(frame, ch, wrapped);
                }
            }
            FrameActionKind::MoveDown => {
                track.swap_frames(frame, frame + 1);
                view.cursor.frame = frame + 1;
            }
            FrameActionKind::MoveUp => {
                track.swap_frames(frame, frame - 1);
                view.cursor.frame = frame - 1;
            }
            FrameActionKind::ClonePatterns { clip, plan } => {
                apply_clones(track, plan);
                for (f, ch, p) in clip_cells(clip, self.frames.start) {
                    track.set_pattern_at(f, ch, cloned_index(plan, ch, p));
                }
            }
            FrameActionKind::Paste {
                clip, clone, plan, ..
            } => {
                if *clone {
                    apply_clones(track, plan);
                }
                let channel_count = track.channel_count();
                let rows = (0..clip.frames)
                    .map(|f| {
                        let mut row = vec![0; channel_count];
                        for (c, &p) in clip.row(f).iter().enumerate() {
                            let ch = clip.channel_offset + c;
                            row[ch] = cloned_index(plan, ch, p);
                        }
                        row
                    })
                    .collect();
                track.insert_frames(frame, rows);
                view.cursor = FrameCursor::new(frame, self.channels.start);
                view.selection = Some(FrameSelection::new(
                    FrameCursor::new(self.frames.start, self.channels.start),
                    FrameCursor::new(self.frames.end, self.channels.end),
                ));
            }
            FrameActionKind::PasteOverwrite { clip, origin, .. } => {
                track.paste_region(clip, origin.frame, origin.channel);
            }
            FrameActionKind::DropMove { target, rows } => {
                let dest = drop_destination(*target, self.frames);
                track.remove_frames(self.frames);
                track.insert_frames(dest, rows.clone());
                let moved = IntRange::new(dest, dest + rows.len() - 1);
                let channels = view
                    .selection
                    .map(|s| s.channels())
                    .unwrap_or(self.channels);
                view.cursor.frame = dest;
                view.selection = Some(FrameSelection::new(
                    FrameCursor::new(moved.start, channels.start),
                    FrameCursor::new(moved.end, channels.end),
                ));
            }
            FrameActionKind::DeleteSelection { .. } => {
                track.remove_frames(self.frames);
                view.cursor.frame = frame.min(track.frame_count() - 1);
                view.selection = None;
            }
            FrameActionKind::MergeDuplicated { new, .. } => {
                track.set_frame_rows(new.clone());
            }
        }
    }

    /// Invert the edit from the captured state.
    pub fn undo(&self, editor: &mut Editor) {
        let Some(track) = editor.module.track_mut(self.track) else {
            debug_assert!(false, "frame action on missing track {}", self.track);
            return;
        };
        let frame = self.frames.start;

        match &self.kind {
            FrameActionKind::AddFrame { .. } | FrameActionKind::DuplicateFrame { .. } => {
                track.remove_frame(frame + 1);
            }
            FrameActionKind::RemoveFrame { row } => {
                track.insert_frame(frame, row.clone());
            }
            FrameActionKind::CloneFrame { created, .. } => {
                track.remove_frame(frame + 1);
                for (ch, target) in created.iter().enumerate() {
                    if let Some(to) = *target {
                        track.clear_pattern(ch, to);
                    }
                }
            }
            FrameActionKind::FrameCount {
                old, keep, dropped, ..
            } => {
                track.set_frame_count(*keep);
                track.set_frame_count(*old);
                for (i, row) in dropped.iter().enumerate() {
                    track.set_frame_row(*keep + i, row.clone());
                }
            }
            FrameActionKind::SetPattern { clip, .. }
            | FrameActionKind::ChangePattern { clip, .. } => {
                track.paste_region(clip, self.frames.start, self.channels.start);
            }
            FrameActionKind::SetPatternAll { row, .. }
            | FrameActionKind::ChangePatternAll { row, .. } => {
                track.set_frame_row(frame, row.clone());
            }
            FrameActionKind::MoveDown => track.swap_frames(frame, frame + 1),
            FrameActionKind::MoveUp => track.swap_frames(frame, frame - 1),
            FrameActionKind::ClonePatterns { clip, plan } => {
                track.paste_region(clip, self.frames.start, self.channels.start);
                clear_clones(track, plan);
            }
            FrameActionKind::Paste { clone, plan, .. } => {
                track.remove_frames(self.frames);
                if *clone {
                    clear_clones(track, plan);
                }
            }
            FrameActionKind::PasteOverwrite { old, .. } => {
                track.paste_region(old, self.frames.start, self.channels.start);
            }
            FrameActionKind::DropMove { target, rows } => {
                let dest = drop_destination(*target, self.frames);
                track.remove_frames(IntRange::new(dest, dest + rows.len() - 1));
                track.insert_frames(self.frames.start, rows.clone());
            }
            FrameActionKind::DeleteSelection { rows } => {
                track.insert_frames(frame, rows.clone());
            }
            FrameActionKind::MergeDuplicated { old, .. } => {
                track.set_frame_rows(old.clone());
            }
        }
    }

    /// Fold `other`, performed right after `self`, into `self`.
    pub fn merge(&mut self, other: &FrameAction) -> bool {
        if self.track != other.track {
            return false;
        }
        let same_region = self.frames == other.frames && self.channels == other.channels;
        let merged = match (&mut self.kind, &other.kind) {
            (
                FrameActionKind::FrameCount {
                    new, keep, dropped, ..
                },
                FrameActionKind::FrameCount {
                    new: next_new,
                    keep: next_keep,
                    dropped: next_dropped,
                    ..
                },
            ) => {
                // Rebuild the original rows from the lowest count either edit reached
                let combined_keep = (*keep).min(*next_keep);
                let mut rows = Vec::with_capacity(dropped.len() + next_dropped.len());
                for i in combined_keep..*keep {
                    rows.push(next_dropped[i - *next_keep].clone());
                }
                rows.append(dropped);
                *dropped = rows;
                *keep = combined_keep;
                *new = *next_new;
                true
            }
            (
                FrameActionKind::SetPattern { pattern, .. },
                FrameActionKind::SetPattern {
                    pattern: next_pattern,
                    ..
                },
            ) if same_region => {
                *pattern = *next_pattern;
                true
            }
            (
                FrameActionKind::SetPatternAll { pattern, .. },
                FrameActionKind::SetPatternAll {
                    pattern: next_pattern,
                    ..
                },
            ) if self.frames == other.frames => {
                *pattern = *next_pattern;
                true
            }
            (
                FrameActionKind::ChangePattern {
                    offset, overflow, ..
                },
                FrameActionKind::ChangePattern {
                    offset: next_offset,
                    overflow: next_overflow,
                    ..
                },
            ) if same_region && !*overflow && !*next_overflow => {
                match offset.checked_add(*next_offset) {
                    Some(sum) => {
                        *offset = sum;
                        true
                    }
                    None => false,
                }
            }
            (
                FrameActionKind::ChangePatternAll {
                    offset, overflow, ..
                },
                FrameActionKind::ChangePatternAll {
                    offset: next_offset,
                    overflow: next_overflow,
                    ..
                },
            ) if self.frames == other.frames => match offset.checked_add(*next_offset) {
                Some(sum) => {
                    *offset = sum;
                    *overflow |= *next_overflow;
                    true
                }
                None => false,
            },
            _ => false,
        };
        if merged {
            self.redo_state = other.redo_state;
        }
        merged
    }

    pub fn is_identity(&self) -> bool {
        match &self.kind {
            FrameActionKind::SetPattern { pattern, clip } => {
                clip.patterns().all(|p| p == *pattern)
            }
            FrameActionKind::SetPatternAll { pattern, row } => row.iter().all(|p| p == pattern),
            FrameActionKind::ChangePattern { offset, .. }
            | FrameActionKind::ChangePatternAll { offset, .. } => *offset == 0,
            _ => false,
        }
    }

    pub fn update_views(&self, editor: &Editor, updates: &mut Vec<ViewUpdate>) {
        push_unique(updates, ViewUpdate::Frame);
        match &self.kind {
            FrameActionKind::CloneFrame { .. }
            | FrameActionKind::ClonePatterns { .. }
            | FrameActionKind::Paste { clone: true, .. } => {
                push_unique(updates, ViewUpdate::Pattern);
            }
            FrameActionKind::ChangePattern { overflow: true, .. } => {
                push_unique(
                    updates,
                    ViewUpdate::Status(format!(
                        "Pattern index clamped to 00-{:02X}",
                        editor.module.max_pattern_index()
                    )),
                );
            }
            FrameActionKind::ChangePatternAll { overflow: true, .. } => {
                push_unique(
                    updates,
                    ViewUpdate::Status(format!(
                        "Pattern index wrapped at {:02X}",
                        editor.module.pattern_limit()
                    )),
                );
            }
            _ => {}
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn check_room(count: usize, adding: usize) -> Result<(), EditError> {
    if count + adding > MAX_FRAMES {
        return Err(EditError::CapacityExceeded {
            what: "frame",
            limit: MAX_FRAMES,
        });
    }
    Ok(())
}

fn check_pattern(pattern: usize, limit: usize) -> Result<(), EditError> {
    if pattern >= limit {
        return Err(EditError::OutOfRange {
            what: "pattern",
            index: pattern,
        });
    }
    Ok(())
}

fn frame_row(track: &Track, frame: usize) -> FrameRow {
    track.frame_row(frame).cloned().unwrap_or_default()
}

fn region(editor: &Editor, track: &Track) -> Result<(IntRange, IntRange), EditError> {
    editor
        .view
        .target_region(track)
        .ok_or(EditError::InvalidTarget("selection outside the track"))
}

fn selected_frames(editor: &Editor, track: &Track) -> Result<IntRange, EditError> {
    let selection = editor.view.selection.ok_or(EditError::NoSelection)?;
    selection
        .frames()
        .clipped(track.frame_count())
        .ok_or(EditError::NoSelection)
}

fn all_cells(clip: &FrameClipData, pred: impl Fn(usize) -> bool) -> bool {
    clip.patterns().all(pred)
}

/// Absolute (frame, channel, pattern) of every cell in a clip taken at `first_frame`.
fn clip_cells(
    clip: &FrameClipData,
    first_frame: usize,
) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
    (0..clip.frames).flat_map(move |f| {
        (0..clip.channels).map(move |c| (first_frame + f, clip.channel_offset + c, clip.get(f, c)))
    })
}

fn clamp_offset(pattern: usize, offset: i64, limit: usize) -> usize {
    (pattern as i64 + offset).clamp(0, limit as i64 - 1) as usize
}

/// Give every distinct pattern in `clip` a free index on its channel.
/// Patterns referenced by the clip are never chosen as targets.
fn plan_clones(
    track: &Track,
    clip: &FrameClipData,
    limit: usize,
) -> Result<Vec<PatternClone>, EditError> {
    let mut plan = Vec::new();
    for c in 0..clip.channels {
        let channel = clip.channel_offset + c;
        let mut sources = Vec::new();
        for f in 0..clip.frames {
            let p = clip.get(f, c);
            if !sources.contains(&p) {
                sources.push(p);
            }
        }
        let reserved: BTreeSet<usize> = sources.iter().copied().collect();
        let mut free = track
            .free_patterns(channel, limit)
            .filter(|p| !reserved.contains(p));
        for from in sources {
            let to = free.next().ok_or(EditError::NoFreePattern(channel))?;
            plan.push(PatternClone { channel, from, to });
        }
    }
    Ok(plan)
}

fn apply_clones(track: &mut Track, plan: &[PatternClone]) {
    for clone in plan {
        track.copy_pattern(clone.channel, clone.from, clone.to);
    }
}

fn clear_clones(track: &mut Track, plan: &[PatternClone]) {
    for clone in plan {
        track.clear_pattern(clone.channel, clone.to);
    }
}

fn cloned_index(plan: &[PatternClone], channel: usize, pattern: usize) -> usize {
    plan.iter()
        .find(|c| c.channel == channel && c.from == pattern)
        .map_or(pattern, |c| c.to)
}

/// First frame of the moved block once `selected` has been lifted out.
fn drop_destination(target: usize, selected: IntRange) -> usize {
    if target > selected.end {
        target - selected.len()
    } else {
        target
    }
}

/// Frame table with every pattern reference replaced by the first index
/// (in frame order) whose contents are equal on that channel.
fn merged_rows(track: &Track) -> Vec<FrameRow> {
    let mut rows = track.frame_rows().to_vec();
    for ch in 0..track.channel_count() {
        let mut canonical: Vec<usize> = Vec::new();
        for row in rows.iter_mut() {
            let p = row[ch];
            match canonical.iter().find(|&&q| track.patterns_equal(ch, p, q)) {
                Some(&q) => row[ch] = q,
                None => canonical.push(p),
            }
        }
    }
    rows
}
