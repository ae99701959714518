//! Layered TOML configuration: embedded defaults plus an optional user file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use famitracker_types::{Module, MAX_CHANNELS, MAX_PATTERN, MAX_PATTERN_LENGTH};

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    history: HistoryConfig,
    #[serde(default)]
    document: DocumentConfig,
    #[serde(default)]
    journal: JournalConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct HistoryConfig {
    max_depth: Option<usize>,
}

/// Layout used for new documents.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DocumentConfig {
    channels: Option<usize>,
    pattern_length: Option<usize>,
    pattern_limit: Option<usize>,
    speed: Option<u8>,
    tempo: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct JournalConfig {
    enabled: Option<bool>,
    path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    history: HistoryConfig,
    pub document: DocumentConfig,
    journal: JournalConfig,
}

impl Default for Config {
    /// The embedded defaults alone.
    fn default() -> Self {
        Self::from_file(embedded())
    }
}

impl Config {
    /// Embedded defaults overridden by the user's config file, if any.
    /// A missing file is normal; an unreadable or malformed one is logged and ignored.
    pub fn load() -> Self {
        let Some(path) = user_config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!(target: "config", "ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Embedded defaults overridden by the file at `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Embedded defaults overridden by `contents`.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let user: ConfigFile = toml::from_str(contents)?;
        let mut base = embedded();
        merge_history(&mut base.history, user.history);
        merge_document(&mut base.document, user.document);
        merge_journal(&mut base.journal, user.journal);
        Ok(Self::from_file(base))
    }

    fn from_file(file: ConfigFile) -> Self {
        Config {
            history: file.history,
            document: file.document,
            journal: file.journal,
        }
    }

    /// Undo depth per document (at least 1).
    pub fn history_depth(&self) -> usize {
        self.history.max_depth.unwrap_or(500).max(1)
    }

    pub fn new_module(&self) -> Module {
        self.document.new_module()
    }

    pub fn journal_enabled(&self) -> bool {
        self.journal.enabled.unwrap_or(false)
    }

    /// Configured journal file, else `edits.jsonl` in the local data dir.
    pub fn journal_path(&self) -> PathBuf {
        if let Some(path) = &self.journal.path {
            return path.clone();
        }
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("famitracker")
            .join("edits.jsonl")
    }
}

impl DocumentConfig {
    pub fn channels(&self) -> usize {
        self.channels.unwrap_or(5).clamp(1, MAX_CHANNELS)
    }

    pub fn pattern_length(&self) -> usize {
        self.pattern_length.unwrap_or(64).clamp(1, MAX_PATTERN_LENGTH)
    }

    pub fn pattern_limit(&self) -> usize {
        self.pattern_limit.unwrap_or(MAX_PATTERN).clamp(1, MAX_PATTERN)
    }

    pub fn speed(&self) -> u8 {
        self.speed.unwrap_or(6)
    }

    pub fn tempo(&self) -> u16 {
        self.tempo.unwrap_or(150)
    }

    /// A blank module with this layout.
    pub fn new_module(&self) -> Module {
        Module::new(
            self.channels(),
            self.pattern_length(),
            self.pattern_limit(),
            self.speed(),
            self.tempo(),
        )
    }
}

fn embedded() -> ConfigFile {
    match toml::from_str(DEFAULT_CONFIG) {
        Ok(file) => file,
        Err(e) => {
            log::warn!(target: "config", "embedded config.toml is malformed: {}", e);
            ConfigFile::default()
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("famitracker").join("config.toml"))
}

fn merge_history(base: &mut HistoryConfig, user: HistoryConfig) {
    if user.max_depth.is_some() {
        base.max_depth = user.max_depth;
    }
}

fn merge_document(base: &mut DocumentConfig, user: DocumentConfig) {
    if user.channels.is_some() {
        base.channels = user.channels;
    }
    if user.pattern_length.is_some() {
        base.pattern_length = user.pattern_length;
    }
    if user.pattern_limit.is_some() {
        base.pattern_limit = user.pattern_limit;
    }
    if user.speed.is_some() {
        base.speed = user.speed;
    }
    if user.tempo.is_some() {
        base.tempo = user.tempo;
    }
}

fn merge_journal(base: &mut JournalConfig, user: JournalConfig) {
    if user.enabled.is_some() {
        base.enabled = user.enabled;
    }
    if user.path.is_some() {
        base.path = user.path;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults() {
        let config = Config::default();
        assert_eq!(config.history_depth(), 500);
        assert_eq!(config.document.channels(), 5);
        assert_eq!(config.document.pattern_length(), 64);
        assert_eq!(config.document.pattern_limit(), 256);
        assert!(!config.journal_enabled());

        let module = config.new_module();
        assert_eq!(module.channel_count(), 5);
        assert_eq!(module.pattern_limit(), 256);
    }

    #[test]
    fn user_values_override_field_by_field() {
        let config = Config::from_toml_str(
            r#"
            [history]
            max_depth = 20

            [document]
            pattern_limit = 128
            "#,
        )
        .unwrap();
        assert_eq!(config.history_depth(), 20);
        assert_eq!(config.document.pattern_limit(), 128);
        // Untouched fields keep the embedded value
        assert_eq!(config.document.channels(), 5);
        assert_eq!(config.document.tempo(), 150);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = Config::from_toml_str(
            "[history]\nmax_depth = 0\n[document]\nchannels = 99\npattern_limit = 4096\n",
        )
        .unwrap();
        assert_eq!(config.history_depth(), 1);
        assert_eq!(config.document.channels(), MAX_CHANNELS);
        assert_eq!(config.document.pattern_limit(), MAX_PATTERN);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(matches!(
            Config::from_toml_str("[history\nmax_depth = "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[journal]\nenabled = true\npath = \"/tmp/j.jsonl\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert!(config.journal_enabled());
        assert_eq!(config.journal_path(), PathBuf::from("/tmp/j.jsonl"));

        assert!(matches!(
            Config::load_from(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
