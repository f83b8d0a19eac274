use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::ranking::DEFAULT_RANKING_LIMIT;
use crate::record::GameKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Records database override; the state dir is used when unset
    pub db_path: Option<PathBuf>,
    pub ranking_limit: usize,
    pub default_game: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            ranking_limit: DEFAULT_RANKING_LIMIT,
            default_game: "reflex".to_string(),
        }
    }
}

impl Config {
    /// Configured default game, falling back to Reflex on unknown names
    pub fn default_game_kind(&self) -> GameKind {
        self.default_game.parse().unwrap_or(GameKind::Reflex)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    /// `config.json` in the platform config dir, or the working directory
    /// when none can be resolved
    pub fn new() -> Self {
        let path = ProjectDirs::from("", "", "trisense")
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("trisense_config.json"));
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
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => tracing::warn!("ignoring unreadable config {:?}: {}", self.path, e),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
