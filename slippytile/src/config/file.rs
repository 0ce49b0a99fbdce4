//! `config.ini` loading and saving.

use std::fs;
use std::path::{Path, PathBuf};

use ini::Ini;
use tracing::debug;

use super::{default_cache_directory, ConfigError, ConfigKey};
use crate::cache::{DiskConfig, DEFAULT_BUDGET_BYTES, DEFAULT_META_DIR, DEFAULT_RASTER_DIR};
use crate::logging::LoggingConfig;
use crate::net::{NetConfig, TileEndpoint};

/// `[cache]` section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheSettings {
    /// Root of the disk tile store.
    pub directory: PathBuf,
    pub raster_dir: String,
    pub meta_dir: String,
    /// Byte budget for decoded resources held in memory.
    pub memory_budget: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            directory: default_cache_directory(),
            raster_dir: DEFAULT_RASTER_DIR.to_string(),
            meta_dir: DEFAULT_META_DIR.to_string(),
            memory_budget: DEFAULT_BUDGET_BYTES,
        }
    }
}

/// Parsed configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub cache: CacheSettings,
    pub network: NetConfig,
    pub endpoint: TileEndpoint,
    pub logging: LoggingConfig,
}

impl ConfigFile {
    /// Loads `path`, returning defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini)
    }

    /// Parses INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Read {
            path: PathBuf::from("<string>"),
            source: ini::Error::Parse(e),
        })?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for key in ConfigKey::all() {
            let Some(value) = ini.get_from(Some(key.section()), key.key_name()) else {
                continue;
            };
            // Blank means "use the default"
            if value.trim().is_empty() {
                continue;
            }
            key.set(&mut config, value)?;
        }
        Ok(config)
    }

    /// Writes every setting to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        self.to_ini().write_to_file(path).map_err(write_error)?;
        debug!(path = %path.display(), "Config saved");
        Ok(())
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini
    }

    /// Disk store settings from the `[cache]` section.
    pub fn disk_config(&self) -> DiskConfig {
        DiskConfig {
            root: self.cache.directory.clone(),
            raster_dir: self.cache.raster_dir.clone(),
            meta_dir: self.cache.meta_dir.clone(),
        }
    }
}
