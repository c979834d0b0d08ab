use crate::events::WheelEvent;
use crate::phase::CyclePhase;
use crate::style::{StyleError, WheelStyle};
use crate::table::{PHASE_COUNT, PhaseTable, Phases};
use async_channel::Sender;
use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub style: WheelStyle,
    /// Replacement phase table, keyed by duration. Absent means the built-in one.
    #[serde(default)]
    pub phases: Option<BTreeMap<String, Vec<CyclePhase>>>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("Style error: {0}")]
    Style(#[from] StyleError),
    #[error("Phase table error: {0}")]
    Phases(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Config {
    /// Phase table override, if the file carries one.
    pub fn phase_table(&self) -> Result<Option<BTreeMap<u32, Phases>>, ConfigError> {
        let Some(raw) = &self.phases else {
            return Ok(None);
        };
        let mut table = BTreeMap::new();
        for (key, entries) in raw {
            let duration: u32 = key
                .trim()
                .parse()
                .map_err(|_| ConfigError::Phases(format!("{key:?} is not a duration")))?;
            let phases = Phases::try_from(entries.clone()).map_err(|listed| {
                ConfigError::Phases(format!(
                    "duration {duration} lists {} phases, expected {PHASE_COUNT}",
                    listed.len()
                ))
            })?;
            table.insert(duration, phases);
        }
        Ok(Some(table))
    }

    /// Pushes the configured phases into `table`, or restores the built-in ones.
    pub fn apply_phases(&self, table: &PhaseTable) -> Result<(), ConfigError> {
        match self.phase_table()? {
            Some(phases) => table
                .set_durations(phases)
                .map_err(|e| ConfigError::Phases(e.to_string())),
            None => {
                if !table.is_default() {
                    table.reset();
                }
                Ok(())
            }
        }
    }
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "reyst", "cycles").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&get_config_path()?)
}

/// Reads `path` (optional) with `CYCLES__*` environment overrides on top, and
/// validates the styling.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("CYCLES").separator("__"))
        .build()?;

    let config: Config = s.try_deserialize()?;
    config.style.validate()?;
    config.phase_table()?;
    Ok(config)
}

/// Falls back to the defaults when the file is missing or unusable.
pub fn load_or_default() -> Config {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Using default configuration: {}", e);
            Config::default()
        }
    }
}

/// Makes sure the user config file exists and returns its path.
pub fn write_default_config() -> Result<PathBuf, ConfigError> {
    let path = get_config_path()?;
    if write_default_config_at(&path)? {
        log::info!("Wrote default configuration to {}", path.display());
    }
    Ok(path)
}

/// Writes the commented default file at `path` unless something is already there.
/// Returns whether it wrote one.
pub fn write_default_config_at(path: &Path) -> Result<bool, ConfigError> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    fs_err::write(path, DEFAULT_CONFIG)?;
    Ok(true)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Turns file system events on the config file into validated configs. Unusable
/// edits are logged and skipped, and so are saves that change nothing.
#[derive(Debug)]
pub struct ConfigReloader {
    path: PathBuf,
    current: Config,
}

impl ConfigReloader {
    pub fn new(path: PathBuf, current: Config) -> Self {
        Self { path, current }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn concerns_config(&self, event: &notify::Event) -> bool {
        matches!(
            event.kind,
            EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
        ) && event.paths.iter().any(|p| p == &self.path)
    }

    /// The config to hand to the host after `event`, if there is a new one.
    pub fn on_event(&mut self, event: &notify::Event) -> Option<Config> {
        if !self.concerns_config(event) {
            return None;
        }
        match load_config_from(&self.path) {
            Ok(config) if config == self.current => {
                log::trace!("Config file touched without changes");
                None
            }
            Ok(config) => {
                self.current = config.clone();
                Some(config)
            }
            Err(e) => {
                log::error!("Keeping the current configuration: {}", e);
                None
            }
        }
    }
}

/// Watches the config file and posts each new validated config as
/// [`WheelEvent::ConfigReload`]. `current` is what the host started with.
pub async fn run_async_watcher(current: Config, tx: Sender<WheelEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let Some(config_dir) = config_path.parent().map(Path::to_path_buf) else {
        return;
    };
    // the directory is watched so that the file may be created later
    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();
    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };
    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    let mut reloader = ConfigReloader::new(config_path, current);
    log::debug!("Watching {}", reloader.path().display());
    while let Ok(res) = bridge_rx.recv().await {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                log::error!("Watch error: {}", e);
                continue;
            }
        };
        if let Some(config) = reloader.on_event(&event)
            && tx.send(WheelEvent::ConfigReload(Box::new(config))).await.is_err()
        {
            break;
        }
    }
}
