//! User configuration.
//!
//! Settings live in an INI file at `<config_dir>/slippytile/config.ini`
//! (`~/.config/slippytile/config.ini` on Linux). A missing file or a missing
//! key falls back to the built-in default; a value that does not parse is an
//! error rather than being silently ignored.
//!
//! ```ini
//! [cache]
//! directory = ~/.cache/slippytile
//! memory_budget = 128MB
//!
//! [network]
//! max_retries = 2
//!
//! [endpoint]
//! base_url = https://tile.openstreetmap.org
//! ```

mod file;
mod keys;

pub use file::{CacheSettings, ConfigFile};
pub use keys::ConfigKey;

use std::path::{Path, PathBuf};

use thiserror::Error;

const APP_DIR: &str = "slippytile";
const CONFIG_FILE_NAME: &str = "config.ini";

/// Errors loading or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// Directory holding the configuration file.
pub fn config_directory() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Default location of `config.ini`.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

/// Default root of the disk tile store.
pub fn default_cache_directory() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Expands a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (path.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) if rest.starts_with('/') || rest.starts_with('\\') => {
            home.join(&rest[1..])
        }
        _ => PathBuf::from(path),
    }
}

/// Replaces the home directory prefix with `~` for display.
pub fn collapse_tilde(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(rest) = path.strip_prefix(&home) {
            if rest.as_os_str().is_empty() {
                return "~".to_string();
            }
            return format!("~/{}", rest.display());
        }
    }
    path.display().to_string()
}

/// Parses a byte size such as `512`, `64KB`, `128 MB` or `2gb`.
///
/// Suffixes are binary multiples (1 KB = 1024 bytes).
pub fn parse_size(input: &str) -> Option<usize> {
    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);
    let number: usize = digits.parse().ok()?;

    let multiplier: usize = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "KB" => 1024,
        "MB" => 1024 * 1024,
        "GB" => 1024 * 1024 * 1024,
        _ => return None,
    };
    number.checked_mul(multiplier)
}

/// Formats a byte count with the largest whole unit [`parse_size`] accepts.
pub fn format_size(bytes: usize) -> String {
    const UNITS: [(usize, &str); 3] = [
        (1024 * 1024 * 1024, "GB"),
        (1024 * 1024, "MB"),
        (1024, "KB"),
    ];
    for (factor, unit) in UNITS {
        if bytes >= factor && bytes % factor == 0 {
            return format!("{}{}", bytes / factor, unit);
        }
    }
    format!("{}B", bytes)
}
