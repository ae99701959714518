//! # famitracker-core
//!
//! Undo/redo command core for the FamiTracker module editor. Edits are
//! reversible [`action::Action`]s that capture the state they overwrite,
//! apply themselves, and invert exactly on undo. The [`history`] stacks
//! them, merging consecutive edits of the same target into one entry.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use famitracker_core::config::Config;
//! use famitracker_core::command::EditCommand;
//! use famitracker_core::dispatch::dispatch;
//! use famitracker_core::state::AppState;
//!
//! let config = Config::load();
//! let mut state = AppState::new(&config);
//! let mut updates = Vec::new();
//!
//! dispatch(&EditCommand::SetTitle("Stage 1".into()), &mut state, &mut updates)?;
//! dispatch(&EditCommand::Undo, &mut state, &mut updates)?;
//! // `updates` now lists which views (song info, frame list, ...) need refreshing
//! ```
//!
//! ## Module Overview
//!
//! - [`state`]: `AppState`, the `Editor` context (document + view) every action runs against
//! - [`action`]: the `Action` sum type: frame, pattern and module edit families
//! - [`history`]: `ActionHistory`: perform, merge, undo, redo, bounded depth
//! - [`command`]: `EditCommand` intents and their construction into actions
//! - [`dispatch`]: `dispatch()`, the single entry point for state mutation
//! - [`update`]: `ViewUpdate` notifications emitted after edits
//! - [`config`]: TOML configuration (embedded defaults + user override)
//! - [`journal`]: append-only JSONL edit journal and replay

pub mod action;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod history;
pub mod journal;
pub mod state;
pub mod update;

pub use error::EditError;
