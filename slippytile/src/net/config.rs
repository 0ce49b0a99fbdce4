//! Network configuration.

use std::time::Duration;

/// Default User-Agent. Public tile servers require an identifying agent.
pub const DEFAULT_USER_AGENT: &str = concat!("SlippyTile/", env!("CARGO_PKG_VERSION"));

/// Transport and retry settings, fixed for the lifetime of a client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetConfig {
    pub user_agent: String,
    pub connect_timeout: Duration,
    /// Upper bound for a whole request, body included.
    pub total_timeout: Duration,
    pub verify_tls: bool,
    pub follow_redirects: bool,
    /// Negotiate HTTP/2 when the server offers it; HTTP/1.1 only otherwise.
    pub http2: bool,
    /// Retries after the first attempt; total attempts are `max_retries + 1`.
    pub max_retries: u32,
    /// Sleep before the second attempt.
    pub retry_backoff_first: Duration,
    /// Sleep before every later attempt.
    pub retry_backoff_subsequent: Duration,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: Duration::from_millis(5_000),
            total_timeout: Duration::from_millis(10_000),
            verify_tls: true,
            follow_redirects: true,
            http2: true,
            max_retries: 2,
            retry_backoff_first: Duration::from_millis(200),
            retry_backoff_subsequent: Duration::from_millis(500),
        }
    }
}

impl NetConfig {
    /// Backoff to sleep after the failed attempt numbered `attempt` (0-based).
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            self.retry_backoff_first
        } else {
            self.retry_backoff_subsequent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NetConfig::default();
        assert!(config.user_agent.starts_with("SlippyTile/"));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.total_timeout, Duration::from_secs(10));
        assert!(config.verify_tls);
        assert!(config.follow_redirects);
        assert!(config.http2);
        assert_eq!(config.max_retries, 2);
    }

    #[test]
    fn test_backoff_schedule() {
        let config = NetConfig {
            retry_backoff_first: Duration::from_millis(10),
            retry_backoff_subsequent: Duration::from_millis(30),
            ..NetConfig::default()
        };
        assert_eq!(config.backoff_after(0), Duration::from_millis(10));
        assert_eq!(config.backoff_after(1), Duration::from_millis(30));
        assert_eq!(config.backoff_after(5), Duration::from_millis(30));
    }
}
