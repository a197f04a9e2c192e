//! Blocking bridge over the async HTTP client shared by every adapter.
//!
//! The core traits are synchronous so the engine stays embeddable in
//! synchronous hosts. Each adapter owns a [`BlockingClient`] that drives
//! `reqwest` futures on a private current-thread runtime, or on the caller's
//! multi-threaded runtime when there is one.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

/// Default user agent for outgoing requests.
pub const DEFAULT_USER_AGENT: &str = "waymark/0.1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while constructing an HTTP adapter.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// The base URL does not parse or cannot carry a path.
    #[error("invalid base URL `{url}`")]
    InvalidBaseUrl {
        /// Rejected URL.
        url: String,
        /// Parser failure, when the URL did not parse at all.
        #[source]
        source: Option<url::ParseError>,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime")]
    Runtime(#[source] std::io::Error),
}

/// Transport failure classified independently of the adapter's error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Failure {
    Timeout { timeout_secs: u64 },
    Status { status: u16, message: String },
    Network { message: String },
}

/// Parse `raw` as a base URL whose path always ends in `/`, so relative
/// joins append to it instead of replacing its last segment.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ClientBuildError> {
    let mut url = Url::parse(raw).map_err(|source| ClientBuildError::InvalidBaseUrl {
        url: raw.to_owned(),
        source: Some(source),
    })?;
    if url.cannot_be_a_base() {
        return Err(ClientBuildError::InvalidBaseUrl {
            url: raw.to_owned(),
            source: None,
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

pub(crate) struct BlockingClient {
    client: Client,
    runtime: Runtime,
    timeout: Duration,
}

impl std::fmt::Debug for BlockingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingClient")
            .field("client", &self.client)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl BlockingClient {
    pub(crate) fn new(user_agent: &str, timeout: Duration) -> Result<Self, ClientBuildError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(ClientBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ClientBuildError::Runtime)?;
        Ok(Self {
            client,
            runtime,
            timeout,
        })
    }

    /// Run `future` to completion.
    ///
    /// Inside a multi-threaded runtime the caller's runtime is used through
    /// `block_in_place`. Anywhere else, including a current-thread runtime,
    /// the private runtime is used; that can deadlock if the caller's runtime
    /// drives IO this request depends on.
    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }

    /// GET `url` and return the status code with the body text.
    pub(crate) async fn get_text(&self, url: &Url) -> Result<(u16, String), Failure> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|err| self.classify(&err))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|err| self.classify(&err))?;
        Ok((status, body))
    }

    fn classify(&self, error: &reqwest::Error) -> Failure {
        if error.is_timeout() {
            return Failure::Timeout {
                timeout_secs: self.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return Failure::Status {
                status: status.as_u16(),
                message: error.to_string(),
            };
        }
        Failure::Network {
            message: error.to_string(),
        }
    }
}

pub(crate) const fn is_success(status: u16) -> bool {
    status >= 200 && status < 300
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("http://api.example.com", "http://api.example.com/")]
    #[case("http://api.example.com/v1", "http://api.example.com/v1/")]
    #[case("http://api.example.com/v1/", "http://api.example.com/v1/")]
    fn base_urls_gain_a_trailing_slash(#[case] raw: &str, #[case] expected: &str) {
        let url = parse_base_url(raw).expect("valid base");
        assert_eq!(url.as_str(), expected);
    }

    #[rstest]
    #[case("not a url")]
    #[case("mailto:someone@example.com")]
    fn unusable_base_urls_are_rejected(#[case] raw: &str) {
        let err = parse_base_url(raw).expect_err("unusable base");
        assert!(matches!(err, ClientBuildError::InvalidBaseUrl { .. }));
    }

    #[rstest]
    #[case(200, true)]
    #[case(204, true)]
    #[case(301, false)]
    #[case(404, false)]
    fn success_covers_the_2xx_range(#[case] status: u16, #[case] expected: bool) {
        assert_eq!(is_success(status), expected);
    }
}
