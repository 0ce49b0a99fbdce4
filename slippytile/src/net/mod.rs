//! Network access to tile servers
//!
//! [`ReqwestTransport`] performs single GET requests behind the
//! [`HttpTransport`] trait; [`RetryingClient`] layers conditional
//! revalidation headers and retry-with-backoff on top of any transport.
//!
//! ```ignore
//! use slippytile::net::{NetConfig, ReqwestTransport, RetryingClient};
//!
//! let config = NetConfig::default();
//! let transport = ReqwestTransport::new(&config)?;
//! let client = RetryingClient::new(transport, config);
//! let resp = client.get("https://tile.openstreetmap.org/0/0/0.png", None, None);
//! ```

mod config;
mod endpoint;
mod http;
mod retry;
mod types;

pub use config::{NetConfig, DEFAULT_USER_AGENT};
pub use endpoint::{TileEndpoint, DEFAULT_BASE_URL};
pub use http::{HttpTransport, NetError, ReqwestTransport};
pub use retry::RetryingClient;
pub use types::{Conditional, HttpResponse, RequestHeaders, ResponseHeaders};

#[cfg(test)]
pub use http::tests::{response as mock_response, MockTransport, RecordedRequest};
