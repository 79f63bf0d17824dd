/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::domain::game_config::GameConfiguration;
use crate::sim::session::SessionTiming;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Pre-filled values for the three new-game fields.
    pub game: GameDefaults,
    pub timing: SessionTiming,
    pub log: LogConfig,
    pub sound_enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameDefaults {
    pub quarters: u32,
    pub quarter_seconds: u32,
    pub pause_seconds: u32,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub file: PathBuf,
    pub level: String,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    game: TomlGame,
    #[serde(default)]
    clock: TomlClock,
    #[serde(default)]
    log: TomlLog,
    #[serde(default)]
    sound: TomlSound,
}

#[derive(Deserialize, Debug)]
struct TomlGame {
    #[serde(default = "default_quarters")]
    quarters: u32,
    #[serde(default = "default_quarter_seconds")]
    quarter_seconds: u32,
    #[serde(default = "default_pause_seconds")]
    pause_seconds: u32,
}

#[derive(Deserialize, Debug)]
struct TomlClock {
    #[serde(default = "default_tick_ms")]
    tick_ms: u64,
    #[serde(default = "default_start_delay_ms")]
    start_delay_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_file")]
    file: String,
    #[serde(default = "default_log_level")]
    level: String,
}

#[derive(Deserialize, Debug)]
struct TomlSound {
    #[serde(default = "default_sound_enabled")]
    enabled: bool,
}

// ── Defaults ──

fn default_quarters() -> u32 { GameConfiguration::default().quarter_count() }
fn default_quarter_seconds() -> u32 { GameConfiguration::default().quarter_duration_secs() }
fn default_pause_seconds() -> u32 { GameConfiguration::default().pause_duration_secs() }
fn default_tick_ms() -> u64 { 1000 }
fn default_start_delay_ms() -> u64 { 50 }
fn default_log_file() -> String { "courtside.log".into() }
fn default_log_level() -> String { "info".into() }
fn default_sound_enabled() -> bool { true }

impl Default for TomlGame {
    fn default() -> Self {
        TomlGame {
            quarters: default_quarters(),
            quarter_seconds: default_quarter_seconds(),
            pause_seconds: default_pause_seconds(),
        }
    }
}

impl Default for TomlClock {
    fn default() -> Self {
        TomlClock {
            tick_ms: default_tick_ms(),
            start_delay_ms: default_start_delay_ms(),
        }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog {
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

impl Default for TomlSound {
    fn default() -> Self {
        TomlSound { enabled: default_sound_enabled() }
    }
}

// ── Loading ──

/// Outcome of looking for `config.toml`, kept so problems can be logged
/// once the subscriber (whose file path comes from this config) exists.
#[derive(Debug)]
pub enum LoadNote {
    Defaults,
    Loaded(PathBuf),
    ParseError(PathBuf, String),
    ReadError(PathBuf, String),
}

impl LoadNote {
    pub fn log(&self) {
        match self {
            LoadNote::Defaults => tracing::info!("no config.toml found, using defaults"),
            LoadNote::Loaded(p) => tracing::info!(path = %p.display(), "config loaded"),
            LoadNote::ParseError(p, e) => warn!(path = %p.display(), error = %e, "config.toml parse error, using defaults"),
            LoadNote::ReadError(p, e) => warn!(path = %p.display(), error = %e, "could not read config file"),
        }
    }
}

impl AppConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> (Self, LoadNote) {
        let (toml_cfg, note) = load_toml(&candidate_dirs());
        (Self::from_toml(toml_cfg), note)
    }

    fn from_toml(t: TomlConfig) -> Self {
        AppConfig {
            game: GameDefaults {
                quarters: t.game.quarters,
                quarter_seconds: t.game.quarter_seconds,
                pause_seconds: t.game.pause_seconds,
            },
            timing: SessionTiming {
                tick: Duration::from_millis(t.clock.tick_ms.max(1)),
                start_delay: Duration::from_millis(t.clock.start_delay_ms),
            },
            log: LogConfig {
                file: PathBuf::from(t.log.file),
                level: t.log.level,
            },
            sound_enabled: t.sound.enabled,
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> (TomlConfig, LoadNote) {
    let mut note = LoadNote::Defaults;
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() { continue; }
        match std::fs::read_to_string(&path) {
            Ok(text) => return match parse(&text) {
                Ok(cfg) => (cfg, LoadNote::Loaded(path)),
                Err(e) => (TomlConfig::default(), LoadNote::ParseError(path, e.to_string())),
            },
            Err(e) => note = LoadNote::ReadError(path, e.to_string()),
        }
    }
    (TomlConfig::default(), note)
}

fn parse(text: &str) -> Result<TomlConfig, toml::de::Error> {
    toml::from_str::<TomlConfig>(text)
}
