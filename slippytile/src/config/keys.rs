//! Addressable configuration keys.
//!
//! Every setting in `config.ini` is a [`ConfigKey`] of the form
//! `section.key`. Keys know how to read their value out of a [`ConfigFile`]
//! as text and how to parse text back into it, which is all the loader, the
//! writer and the `config` CLI commands need.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::{collapse_tilde, expand_tilde, format_size, parse_size, ConfigError, ConfigFile};
use crate::logging::LEVELS;
use crate::net::TileEndpoint;

/// A single configuration setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    CacheDirectory,
    CacheRasterDir,
    CacheMetaDir,
    CacheMemoryBudget,
    NetworkUserAgent,
    NetworkConnectTimeoutMs,
    NetworkTotalTimeoutMs,
    NetworkVerifyTls,
    NetworkFollowRedirects,
    NetworkHttp2,
    NetworkMaxRetries,
    NetworkRetryBackoffFirstMs,
    NetworkRetryBackoffSubsequentMs,
    EndpointBaseUrl,
    LoggingLevel,
    LoggingDirectory,
}

const ALL_KEYS: [ConfigKey; 16] = [
    ConfigKey::CacheDirectory,
    ConfigKey::CacheRasterDir,
    ConfigKey::CacheMetaDir,
    ConfigKey::CacheMemoryBudget,
    ConfigKey::NetworkUserAgent,
    ConfigKey::NetworkConnectTimeoutMs,
    ConfigKey::NetworkTotalTimeoutMs,
    ConfigKey::NetworkVerifyTls,
    ConfigKey::NetworkFollowRedirects,
    ConfigKey::NetworkHttp2,
    ConfigKey::NetworkMaxRetries,
    ConfigKey::NetworkRetryBackoffFirstMs,
    ConfigKey::NetworkRetryBackoffSubsequentMs,
    ConfigKey::EndpointBaseUrl,
    ConfigKey::LoggingLevel,
    ConfigKey::LoggingDirectory,
];

impl ConfigKey {
    /// Every key, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    /// INI section the key lives in.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::CacheDirectory
            | ConfigKey::CacheRasterDir
            | ConfigKey::CacheMetaDir
            | ConfigKey::CacheMemoryBudget => "cache",
            ConfigKey::NetworkUserAgent
            | ConfigKey::NetworkConnectTimeoutMs
            | ConfigKey::NetworkTotalTimeoutMs
            | ConfigKey::NetworkVerifyTls
            | ConfigKey::NetworkFollowRedirects
            | ConfigKey::NetworkHttp2
            | ConfigKey::NetworkMaxRetries
            | ConfigKey::NetworkRetryBackoffFirstMs
            | ConfigKey::NetworkRetryBackoffSubsequentMs => "network",
            ConfigKey::EndpointBaseUrl => "endpoint",
            ConfigKey::LoggingLevel | ConfigKey::LoggingDirectory => "logging",
        }
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::CacheDirectory => "directory",
            ConfigKey::CacheRasterDir => "raster_dir",
            ConfigKey::CacheMetaDir => "meta_dir",
            ConfigKey::CacheMemoryBudget => "memory_budget",
            ConfigKey::NetworkUserAgent => "user_agent",
            ConfigKey::NetworkConnectTimeoutMs => "connect_timeout_ms",
            ConfigKey::NetworkTotalTimeoutMs => "total_timeout_ms",
            ConfigKey::NetworkVerifyTls => "verify_tls",
            ConfigKey::NetworkFollowRedirects => "follow_redirects",
            ConfigKey::NetworkHttp2 => "http2",
            ConfigKey::NetworkMaxRetries => "max_retries",
            ConfigKey::NetworkRetryBackoffFirstMs => "retry_backoff_first_ms",
            ConfigKey::NetworkRetryBackoffSubsequentMs => "retry_backoff_subsequent_ms",
            ConfigKey::EndpointBaseUrl => "base_url",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingDirectory => "directory",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as it would be written to the file. Unset is empty.
    pub fn get(&self, config: &ConfigFile) -> String {
        let net = &config.network;
        match self {
            ConfigKey::CacheDirectory => collapse_tilde(&config.cache.directory),
            ConfigKey::CacheRasterDir => config.cache.raster_dir.clone(),
            ConfigKey::CacheMetaDir => config.cache.meta_dir.clone(),
            ConfigKey::CacheMemoryBudget => format_size(config.cache.memory_budget),
            ConfigKey::NetworkUserAgent => net.user_agent.clone(),
            ConfigKey::NetworkConnectTimeoutMs => net.connect_timeout.as_millis().to_string(),
            ConfigKey::NetworkTotalTimeoutMs => net.total_timeout.as_millis().to_string(),
            ConfigKey::NetworkVerifyTls => net.verify_tls.to_string(),
            ConfigKey::NetworkFollowRedirects => net.follow_redirects.to_string(),
            ConfigKey::NetworkHttp2 => net.http2.to_string(),
            ConfigKey::NetworkMaxRetries => net.max_retries.to_string(),
            ConfigKey::NetworkRetryBackoffFirstMs => net.retry_backoff_first.as_millis().to_string(),
            ConfigKey::NetworkRetryBackoffSubsequentMs => {
                net.retry_backoff_subsequent.as_millis().to_string()
            }
            ConfigKey::EndpointBaseUrl => config.endpoint.base_url().to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingDirectory => config
                .logging
                .directory
                .as_deref()
                .map(collapse_tilde)
                .unwrap_or_default(),
        }
    }

    /// Parses `value` and stores it in `config`.
    ///
    /// An empty value resets optional settings; for the rest it is rejected.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let net = &mut config.network;
        match self {
            ConfigKey::CacheDirectory => config.cache.directory = expand_tilde(self.non_empty(value)?),
            ConfigKey::CacheRasterDir => config.cache.raster_dir = self.dir_name(value)?,
            ConfigKey::CacheMetaDir => config.cache.meta_dir = self.dir_name(value)?,
            ConfigKey::CacheMemoryBudget => {
                config.cache.memory_budget = parse_size(value)
                    .ok_or_else(|| self.invalid(value, "expected a size such as 512KB or 128MB"))?
            }
            ConfigKey::NetworkUserAgent => net.user_agent = self.non_empty(value)?.to_string(),
            ConfigKey::NetworkConnectTimeoutMs => net.connect_timeout = self.millis(value)?,
            ConfigKey::NetworkTotalTimeoutMs => net.total_timeout = self.millis(value)?,
            ConfigKey::NetworkVerifyTls => net.verify_tls = self.boolean(value)?,
            ConfigKey::NetworkFollowRedirects => net.follow_redirects = self.boolean(value)?,
            ConfigKey::NetworkHttp2 => net.http2 = self.boolean(value)?,
            ConfigKey::NetworkMaxRetries => {
                net.max_retries = value
                    .parse()
                    .map_err(|_| self.invalid(value, "expected a non-negative integer"))?
            }
            ConfigKey::NetworkRetryBackoffFirstMs => net.retry_backoff_first = self.millis(value)?,
            ConfigKey::NetworkRetryBackoffSubsequentMs => {
                net.retry_backoff_subsequent = self.millis(value)?
            }
            ConfigKey::EndpointBaseUrl => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(self.invalid(value, "expected an http:// or https:// URL"));
                }
                config.endpoint = TileEndpoint::new(value);
            }
            ConfigKey::LoggingLevel => {
                let level = value.to_ascii_lowercase();
                if !LEVELS.contains(&level.as_str()) {
                    return Err(self.invalid(value, "expected trace, debug, info, warn or error"));
                }
                config.logging.level = level;
            }
            ConfigKey::LoggingDirectory => {
                config.logging.directory = (!value.is_empty()).then(|| expand_tilde(value))
            }
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn non_empty<'a>(&self, value: &'a str) -> Result<&'a str, ConfigError> {
        if value.is_empty() {
            Err(self.invalid(value, "must not be empty"))
        } else {
            Ok(value)
        }
    }

    fn dir_name(&self, value: &str) -> Result<String, ConfigError> {
        let value = self.non_empty(value)?;
        if value.contains(['/', '\\']) || value == "." || value == ".." {
            return Err(self.invalid(value, "expected a single directory name"));
        }
        Ok(value.to_string())
    }

    fn millis(&self, value: &str) -> Result<Duration, ConfigError> {
        value
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| self.invalid(value, "expected milliseconds as a non-negative integer"))
    }

    fn boolean(&self, value: &str) -> Result<bool, ConfigError> {
        match value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(self.invalid(value, "expected true or false")),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ALL_KEYS
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}
