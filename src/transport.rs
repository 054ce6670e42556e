//! HTTP transport seam
//!
//! [`ExchangeRateClient`](crate::ExchangeRateClient) only needs "GET this URL
//! with these query parameters and give me the body". [`HttpTransport`] does
//! that with a blocking `reqwest` client; tests can plug in anything else.

use crate::error::{ExchangeError, Result};
use reqwest::blocking::Client;
use std::time::Duration;

/// Blocking GET of a text body
pub trait Transport: Send + Sync {
    /// Fetch `url` with `query` appended.
    ///
    /// Implementations must return `ExchangeError::RemoteService` for
    /// non-2xx responses rather than handing back the error body.
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<String>;
}

/// `reqwest` blocking transport with a per-request timeout
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rusty_oxr/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
        let response = self.client.get(url).query(query).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_else(|e| {
                log::debug!("could not read body of HTTP {} response: {}", status, e);
                String::new()
            });
            log::warn!("GET {} returned HTTP {}", url, status);
            return Err(ExchangeError::RemoteService {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text()?;
        log::debug!("GET {} returned {} bytes", url, body.len());
        Ok(body)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
        (**self).get(url, query)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
        (**self).get(url, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_transport_creation() {
        let transport = HttpTransport::new(Duration::from_secs(5));
        assert!(transport.is_ok());
    }
}
