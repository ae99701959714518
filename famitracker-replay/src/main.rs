//! Replay an edit journal against a fresh document and print the result.
//!
//! ```text
//! famitracker-replay <journal.jsonl> [--verbose] [--log-file PATH] [--dump]
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;

use famitracker_core::config::Config;
use famitracker_core::journal::{replay_journal, ReplayStats};
use famitracker_core::state::AppState;

fn init_logging(verbose: bool, log_file: Option<&Path>) {
    use simplelog::*;

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let result = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match File::create(path) {
                Ok(file) => WriteLogger::init(log_level, Config::default(), file),
                Err(e) => {
                    eprintln!("cannot create log file {}: {}", path.display(), e);
                    return;
                }
            }
        }
        None => TermLogger::init(
            log_level,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ),
    };
    if let Err(e) = result {
        eprintln!("failed to initialize logger: {}", e);
        return;
    }

    log::info!("famitracker-replay starting (log level: {:?})", log_level);
}

/// Default log location when `--log-file` is given without a path.
fn default_log_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("famitracker")
        .join("replay.log")
}

#[derive(Serialize)]
struct TrackSummary<'a> {
    title: &'a str,
    frames: usize,
    speed: u8,
    tempo: u16,
}

#[derive(Serialize)]
struct Summary<'a> {
    title: &'a str,
    artist: &'a str,
    copyright: &'a str,
    channels: usize,
    tracks: Vec<TrackSummary<'a>>,
    instruments: usize,
    undo_entries: usize,
    redo_entries: usize,
    last_action: Option<&'static str>,
    applied: usize,
    rejected: usize,
    skipped_lines: usize,
}

fn summarize<'a>(state: &'a AppState, stats: &ReplayStats) -> Summary<'a> {
    let module = &state.editor.module;
    Summary {
        title: &module.metadata.title,
        artist: &module.metadata.artist,
        copyright: &module.metadata.copyright,
        channels: module.channel_count(),
        tracks: module
            .tracks()
            .iter()
            .map(|t| TrackSummary {
                title: &t.title,
                frames: t.frame_count(),
                speed: t.speed,
                tempo: t.tempo,
            })
            .collect(),
        instruments: module.instruments.count(),
        undo_entries: state.history.undo_len(),
        redo_entries: state.history.redo_len(),
        last_action: state.history.last_action_name(),
        applied: stats.applied,
        rejected: stats.rejected,
        skipped_lines: stats.skipped_lines,
    }
}

fn usage() -> ExitCode {
    eprintln!("usage: famitracker-replay <journal.jsonl> [--verbose] [--log-file PATH] [--dump]");
    ExitCode::from(2)
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    let dump = args.iter().any(|a| a == "--dump");
    let log_file = args.iter().position(|a| a == "--log-file").map(|i| {
        args.get(i + 1)
            .filter(|p| !p.starts_with("--"))
            .map(PathBuf::from)
            .unwrap_or_else(default_log_path)
    });
    init_logging(verbose, log_file.as_deref());

    // First positional argument, skipping flags and the --log-file value
    let mut journal = None;
    let mut skip_next = false;
    for arg in &args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--log-file" {
            skip_next = true;
            continue;
        }
        if !arg.starts_with('-') {
            journal = Some(PathBuf::from(arg));
            break;
        }
    }
    let Some(journal) = journal else {
        return usage();
    };

    let config = Config::load();
    let (state, stats) = match replay_journal(&journal, &config) {
        Ok(result) => result,
        Err(e) => {
            log::error!("replay of {} failed: {}", journal.display(), e);
            eprintln!("cannot replay {}: {}", journal.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let output = if dump {
        serde_json::to_string_pretty(&state.editor.module)
    } else {
        serde_json::to_string_pretty(&summarize(&state, &stats))
    };
    match output {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("cannot encode result: {}", e);
            ExitCode::FAILURE
        }
    }
}
