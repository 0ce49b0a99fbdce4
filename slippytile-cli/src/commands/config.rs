//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list`, and `config path` commands
//! for viewing and modifying configuration settings from the command line.

use clap::Subcommand;
use slippytile::config::{ConfigFile, ConfigKey};

use super::common::CliContext;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., network.max_retries)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., network.max_retries)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(context: &CliContext, command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(context, &key),
        ConfigCommands::Set { key, value } => run_set(context, &key, &value),
        ConfigCommands::List => run_list(context),
        ConfigCommands::Path => run_path(context),
    }
}

/// Get a configuration value.
fn run_get(context: &CliContext, key: &str) -> Result<(), CliError> {
    let config_key: ConfigKey = key.parse()?;
    let value = config_key.get(&context.config);

    if value.is_empty() {
        println!("(not set)");
    } else {
        println!("{}", value);
    }
    Ok(())
}

/// Set a configuration value and save the file.
///
/// Saves what was loaded from disk, so command-line overrides such as
/// `--cache-dir` are not persisted.
fn run_set(context: &CliContext, key: &str, value: &str) -> Result<(), CliError> {
    let config_key: ConfigKey = key.parse()?;

    let mut config = ConfigFile::load_from(&context.config_path)?;
    config_key.set(&mut config, value)?;
    config.save_to(&context.config_path)?;

    println!("Set {} = {}", config_key, config_key.get(&config));
    Ok(())
}

/// List all configuration settings.
fn run_list(context: &CliContext) -> Result<(), CliError> {
    println!("Configuration Settings");
    println!("======================");
    println!();

    let mut current_section = "";

    for key in ConfigKey::all() {
        let section = key.section();

        // Print section header when section changes
        if section != current_section {
            if !current_section.is_empty() {
                println!();
            }
            println!("[{}]", section);
            current_section = section;
        }

        let value = key.get(&context.config);
        if value.is_empty() {
            println!("  {} = (not set)", key.key_name());
        } else {
            println!("  {} = {}", key.key_name(), value);
        }
    }
    Ok(())
}

/// Show the configuration file path.
fn run_path(context: &CliContext) -> Result<(), CliError> {
    println!("{}", context.config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use slippytile::config::ConfigError;
    use tempfile::TempDir;

    #[test]
    fn test_set_persists_and_get_reads_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        let context = CliContext::load(path.clone(), None).unwrap();

        run(
            &context,
            ConfigCommands::Set {
                key: "network.max_retries".to_string(),
                value: "7".to_string(),
            },
        )
        .unwrap();

        let saved = ConfigFile::load_from(&path).unwrap();
        assert_eq!(saved.network.max_retries, 7);

        let reloaded = CliContext::load(path, None).unwrap();
        run(
            &reloaded,
            ConfigCommands::Get {
                key: "network.max_retries".to_string(),
            },
        )
        .unwrap();
    }

    #[test]
    fn test_set_does_not_persist_cache_dir_override() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        let context = CliContext::load(path.clone(), Some(temp.path().join("override"))).unwrap();

        run(
            &context,
            ConfigCommands::Set {
                key: "logging.level".to_string(),
                value: "debug".to_string(),
            },
        )
        .unwrap();

        let saved = ConfigFile::load_from(&path).unwrap();
        assert_eq!(saved.logging.level, "debug");
        assert_ne!(saved.cache.directory, temp.path().join("override"));
    }

    #[test]
    fn test_unknown_key_and_bad_value() {
        let temp = TempDir::new().unwrap();
        let context = CliContext::load(temp.path().join("config.ini"), None).unwrap();

        let unknown = run(&context, ConfigCommands::Get { key: "nope.nope".to_string() });
        assert!(matches!(
            unknown,
            Err(CliError::Config(ConfigError::UnknownKey(_)))
        ));

        let bad = run(
            &context,
            ConfigCommands::Set {
                key: "network.http2".to_string(),
                value: "perhaps".to_string(),
            },
        );
        assert!(matches!(
            bad,
            Err(CliError::Config(ConfigError::InvalidValue { .. }))
        ));
        assert!(!temp.path().join("config.ini").exists());
    }

    #[test]
    fn test_list_and_path() {
        let temp = TempDir::new().unwrap();
        let context = CliContext::load(temp.path().join("config.ini"), None).unwrap();
        run(&context, ConfigCommands::List).unwrap();
        run(&context, ConfigCommands::Path).unwrap();
    }
}
