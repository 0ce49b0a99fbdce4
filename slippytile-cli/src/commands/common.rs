//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use clap::Args;
use slippytile::app::{App, AppConfig};
use slippytile::config::ConfigFile;
use slippytile::coord::{TileId, MAX_ZOOM};

use crate::error::CliError;

/// Loaded configuration plus the global overrides from the command line.
pub struct CliContext {
    /// Effective configuration after overrides.
    pub config: ConfigFile,

    /// File the configuration was read from and is saved back to.
    pub config_path: PathBuf,
}

impl CliContext {
    /// Loads `config_path` and applies the `--cache-dir` override.
    pub fn load(config_path: PathBuf, cache_dir: Option<PathBuf>) -> Result<Self, CliError> {
        let mut config = ConfigFile::load_from(&config_path)?;
        if let Some(dir) = cache_dir {
            config.cache.directory = dir;
        }
        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn app_config(&self) -> AppConfig {
        AppConfig::from_config_file(&self.config)
    }

    /// Bootstraps the tile stack with the real transport.
    pub fn app(&self) -> Result<App, CliError> {
        Ok(App::bootstrap(self.app_config())?)
    }
}

/// A tile address given as `<z> <x> <y>`.
#[derive(Debug, Clone, Copy, Args)]
pub struct TileArgs {
    /// Zoom level (0-22)
    pub z: u8,

    /// Column
    pub x: u32,

    /// Row
    pub y: u32,
}

impl TileArgs {
    /// Validates the address against the grid for its zoom.
    pub fn tile_id(&self) -> Result<TileId, CliError> {
        let id = TileId::new(self.z, self.x, self.y);
        if self.z > MAX_ZOOM {
            return Err(CliError::InvalidTile(format!(
                "zoom {} exceeds the maximum of {}",
                self.z, MAX_ZOOM
            )));
        }
        if !id.is_valid() {
            return Err(CliError::InvalidTile(format!(
                "{} is outside the grid (x and y must be at most {})",
                id,
                id.max_index()
            )));
        }
        Ok(id)
    }
}

/// Format a size in bytes as a human-readable string.
pub fn format_size_display(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Formats an optional header value for display.
pub fn or_unset(value: Option<&str>) -> &str {
    value.unwrap_or("(not set)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_tile_args_validation() {
        let ok = TileArgs { z: 2, x: 3, y: 0 };
        assert_eq!(ok.tile_id().unwrap(), TileId::new(2, 3, 0));

        let off_grid = TileArgs { z: 2, x: 4, y: 0 };
        assert!(matches!(off_grid.tile_id(), Err(CliError::InvalidTile(_))));

        let too_deep = TileArgs { z: 23, x: 0, y: 0 };
        assert!(matches!(too_deep.tile_id(), Err(CliError::InvalidTile(_))));
    }

    #[test]
    fn test_format_size_display_rounds() {
        assert_eq!(format_size_display(0), "0 bytes");
        assert_eq!(format_size_display(1023), "1023 bytes");
        assert_eq!(format_size_display(1536), "1.50 KB");
        assert_eq!(format_size_display(12_345_678), "11.77 MB");
        assert_eq!(format_size_display(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_context_cache_dir_override() {
        let temp = TempDir::new().unwrap();
        let context = CliContext::load(
            temp.path().join("missing.ini"),
            Some(temp.path().join("tiles")),
        )
        .unwrap();

        assert_eq!(context.config.cache.directory, temp.path().join("tiles"));
        assert_eq!(context.app_config().disk.root, temp.path().join("tiles"));
    }
}
