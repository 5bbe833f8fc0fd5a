use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::controller::{SessionOptions, TICK_RATE_MS};
use crate::layout::KeyboardLayout;
use crate::mistakes::WEAK_KEY_COUNT;

const MIN_TICK_RATE_MS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Extra exercise files; `None` uses the directory next to the config file
    pub exercises_dir: Option<PathBuf>,
    pub tick_rate_ms: u64,
    pub weak_key_count: usize,
    pub show_keyboard: bool,
    /// Layout for exercises whose file does not name one
    pub default_layout: KeyboardLayout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exercises_dir: None,
            tick_rate_ms: TICK_RATE_MS,
            weak_key_count: WEAK_KEY_COUNT,
            show_keyboard: true,
            default_layout: KeyboardLayout::English,
        }
    }
}

impl Config {
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            tick_interval: Duration::from_millis(self.tick_rate_ms.max(MIN_TICK_RATE_MS)),
            weak_key_count: self.weak_key_count,
        }
    }

    pub fn exercises_dir(&self) -> Option<PathBuf> {
        self.exercises_dir
            .clone()
            .or_else(AppDirs::default_exercises_dir)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("touchtype_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "ignoring unreadable config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(std::io::Error::other)?;
        fs::write(&self.path, data)
    }
}
