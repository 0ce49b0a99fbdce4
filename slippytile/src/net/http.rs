//! HTTP transport abstraction for testability

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use thiserror::Error;
use tracing::warn;

use super::config::NetConfig;
use super::types::{HttpResponse, ResponseHeaders};

/// Errors creating a transport.
#[derive(Debug, Error)]
pub enum NetError {
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// A single, non-retrying HTTP GET.
///
/// This abstraction allows for dependency injection and easier testing by
/// enabling mock transports in tests. Implementations never fail: anything
/// that prevents an HTTP response is reported as status 0.
pub trait HttpTransport: Send + Sync {
    /// Performs a GET with the given request headers.
    fn get(&self, url: &str, headers: &[(String, String)]) -> HttpResponse;
}

impl<T: HttpTransport + ?Sized> HttpTransport for std::sync::Arc<T> {
    fn get(&self, url: &str, headers: &[(String, String)]) -> HttpResponse {
        (**self).get(url, headers)
    }
}

/// Real transport implementation using reqwest.
///
/// Owns the connection pool and TLS setup. Build it once at the application
/// root and hand it to the clients that need it.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport configured from `config`.
    pub fn new(config: &NetConfig) -> Result<Self, NetError> {
        let redirect = if config.follow_redirects {
            Policy::default()
        } else {
            Policy::none()
        };

        let mut builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(config.connect_timeout)
            .timeout(config.total_timeout)
            .redirect(redirect)
            .danger_accept_invalid_certs(!config.verify_tls);

        if !config.http2 {
            builder = builder.http1_only();
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str, headers: &[(String, String)]) -> HttpResponse {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = match request.send() {
            Ok(response) => response,
            Err(e) => {
                warn!(url, error = %e, "HTTP request failed");
                return HttpResponse::transport_failure(url);
            }
        };

        let status = response.status().as_u16();
        let effective_url = response.url().to_string();
        let headers = ResponseHeaders::from_pairs(
            response
                .headers()
                .iter()
                .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v))),
        );

        match response.bytes() {
            Ok(body) => HttpResponse {
                status,
                body: body.to_vec(),
                headers,
                effective_url,
            },
            Err(e) => {
                warn!(url, status, error = %e, "Failed to read response body");
                HttpResponse {
                    effective_url,
                    ..HttpResponse::transport_failure(url)
                }
            }
        }
    }
}
