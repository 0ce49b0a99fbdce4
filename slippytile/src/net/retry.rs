//! GET with conditional headers and bounded retries.

use std::thread;

use tracing::{debug, warn};

use super::config::NetConfig;
use super::http::HttpTransport;
use super::types::{Conditional, HttpResponse, RequestHeaders};

/// Blocking HTTP client that retries transient failures.
///
/// Each call is self-contained; the client holds only read-only state, so it
/// can be shared between threads freely.
pub struct RetryingClient<T: HttpTransport> {
    transport: T,
    config: NetConfig,
}

impl<T: HttpTransport> RetryingClient<T> {
    pub fn new(transport: T, config: NetConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Performs a GET, retrying transport failures and 5xx responses.
    ///
    /// Makes at most `max_retries + 1` attempts, sleeping the configured
    /// backoff between them. 2xx, 3xx and 4xx responses are returned at once.
    /// The last attempt's response is returned whatever its status.
    pub fn get(
        &self,
        url: &str,
        headers: Option<&RequestHeaders>,
        conditional: Option<&Conditional>,
    ) -> HttpResponse {
        let mut request_headers: Vec<(String, String)> = headers
            .map(|h| h.items().to_vec())
            .unwrap_or_default();
        if let Some(cond) = conditional {
            request_headers.extend(cond.to_headers());
        }

        let attempts = self.config.max_retries.saturating_add(1);
        let mut attempt = 0;
        loop {
            let response = self.transport.get(url, &request_headers);
            debug!(url, status = response.status, attempt, "GET");

            if !response.is_retryable() || attempt + 1 >= attempts {
                return response;
            }

            warn!(
                url,
                status = response.status,
                "GET retry {}/{}",
                attempt + 1,
                attempts - 1
            );
            thread::sleep(self.config.backoff_after(attempt));
            attempt += 1;
        }
    }
}
