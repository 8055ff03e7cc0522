use crate::error::ErrorCode;
use crate::storage::{FileStorage, KvStorage, MemoryStorage, SqliteStorage};
use crate::store::ids::IdStrategy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the SQLite database inside the data directory.
pub const SQLITE_FILE_NAME: &str = "ticklist.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TicklistConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ids: IdConfig,
}

/// Which [`KvStorage`] implementation backs the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Memory,
    #[default]
    File,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: Backend,
    /// Data directory. Defaults to [`default_data_dir`].
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IdConfig {
    #[serde(default)]
    pub strategy: IdStrategy,
}

/// Parse a config file, or `None` if it does not exist.
pub fn load_config_file(path: &Path) -> Result<Option<TicklistConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<TicklistConfig>(&content)
        .map(Some)
        .with_context(|| format!("{}: Failed to parse {}", ErrorCode::ConfigParseError, path.display()))
}

/// `<project_root>/.ticklist/config.toml`
#[must_use]
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".ticklist/config.toml")
}

/// `<config dir>/ticklist/config.toml`, if the platform has a config dir.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ticklist/config.toml"))
}

/// Project config, else user config, else defaults.
pub fn resolve_config(project_root: &Path) -> Result<TicklistConfig> {
    let project = load_config_file(&project_config_path(project_root))?;
    let user = match project {
        Some(_) => None,
        None => match user_config_path() {
            Some(path) => load_config_file(&path)?,
            None => None,
        },
    };
    Ok(pick_config(project, user))
}

fn pick_config(project: Option<TicklistConfig>, user: Option<TicklistConfig>) -> TicklistConfig {
    project.or(user).unwrap_or_default()
}

/// `<data dir>/ticklist`
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("ticklist"))
        .context("no data directory on this platform; set storage.path in config.toml")
}

impl StorageConfig {
    /// Configured data directory, or the platform default.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => default_data_dir(),
        }
    }
}

/// Build the configured storage backend.
pub fn open_storage(config: &StorageConfig) -> Result<Box<dyn KvStorage>> {
    let storage: Box<dyn KvStorage> = match config.backend {
        Backend::Memory => Box::new(MemoryStorage::new()),
        Backend::File => Box::new(FileStorage::new(config.data_dir()?)),
        Backend::Sqlite => {
            let path = config.data_dir()?.join(SQLITE_FILE_NAME);
            let storage = SqliteStorage::open(&path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Box::new(storage)
        }
    };
    tracing::debug!(backend = storage.backend(), "storage opened");
    Ok(storage)
}
