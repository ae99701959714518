//! Append-only JSONL journal of dispatched edits, and replay.
//!
//! Each session starts with a header line; every dispatched command then
//! gets one line with its outcome. The file is tailable with `tail -f`.
//! Replaying the commands against a fresh document reproduces the edit
//! session, which makes journals handy as regression fixtures.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::command::EditCommand;
use crate::config::Config;
use crate::dispatch::{dispatch, Dispatched};
use crate::error::EditError;
use crate::state::AppState;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Append-only JSONL writer.
pub struct EditJournal {
    writer: BufWriter<File>,
    session_start: Instant,
}

#[derive(Serialize)]
struct SessionHeader {
    event: &'static str,
    epoch_ms: u128,
    version: &'static str,
}

#[derive(Serialize)]
struct JournalEntry<'a> {
    t_ms: u128,
    command: &'a EditCommand,
    outcome: String,
}

/// Deserialized journal line. Session headers carry `event` instead of `command`.
#[derive(Deserialize)]
struct ReplayEntry {
    command: Option<EditCommand>,
}

impl EditJournal {
    /// Open `path` for appending (creating parent directories) and write a session header.
    pub fn open(path: &Path) -> Result<Self, JournalError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = BufWriter::new(file);
        let header = SessionHeader {
            event: "session_start",
            epoch_ms: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis(),
            version: env!("CARGO_PKG_VERSION"),
        };
        writeln!(writer, "{}", serde_json::to_string(&header)?)?;
        writer.flush()?;
        log::info!(target: "journal", "journaling edits to {}", path.display());
        Ok(Self {
            writer,
            session_start: Instant::now(),
        })
    }

    /// Append one dispatched command and what came of it.
    pub fn record(
        &mut self,
        command: &EditCommand,
        result: &Result<Dispatched, EditError>,
    ) -> Result<(), JournalError> {
        let entry = JournalEntry {
            t_ms: self.session_start.elapsed().as_millis(),
            command,
            outcome: describe(result),
        };
        writeln!(self.writer, "{}", serde_json::to_string(&entry)?)?;
        self.writer.flush()?;
        Ok(())
    }
}

fn describe(result: &Result<Dispatched, EditError>) -> String {
    match result {
        Ok(Dispatched::Committed(commit)) => format!("committed ({:?})", commit).to_lowercase(),
        Ok(Dispatched::Undone(name)) => format!("undo {}", name),
        Ok(Dispatched::Redone(name)) => format!("redo {}", name),
        Ok(Dispatched::NothingToUndo) => "nothing to undo".to_string(),
        Ok(Dispatched::NothingToRedo) => "nothing to redo".to_string(),
        Ok(Dispatched::ViewChanged) => "view".to_string(),
        Err(e) => format!("rejected: {}", e),
    }
}

/// Summary of a replay run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub applied: usize,
    pub rejected: usize,
    pub skipped_lines: usize,
}

/// Rebuild the state a journal describes by dispatching its commands
/// against a fresh document.
///
/// Session headers, blank lines and unparseable lines are skipped.
/// Commands rejected during replay are counted and otherwise ignored, as
/// they were when first recorded.
pub fn replay_journal(path: &Path, config: &Config) -> Result<(AppState, ReplayStats), JournalError> {
    let mut state = AppState::new(config);
    let mut stats = ReplayStats::default();
    let mut updates = Vec::new();
    let file = File::open(path)?;
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let command = match serde_json::from_str::<ReplayEntry>(&line) {
            Ok(ReplayEntry {
                command: Some(command),
            }) => command,
            Ok(_) => continue,
            Err(e) => {
                log::debug!(target: "journal", "skipping line: {}", e);
                stats.skipped_lines += 1;
                continue;
            }
        };
        updates.clear();
        match dispatch(&command, &mut state, &mut updates) {
            Ok(_) => stats.applied += 1,
            Err(_) => stats.rejected += 1,
        }
    }
    log::info!(
        target: "journal",
        "replayed {} ({} applied, {} rejected, {} skipped)",
        path.display(),
        stats.applied,
        stats.rejected,
        stats.skipped_lines
    );
    Ok((state, stats))
}
