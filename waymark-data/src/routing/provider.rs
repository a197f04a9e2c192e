//! HTTP-based `DirectionsProvider` using OSRM's Route API.
//!
//! The [`DirectionsProvider`] trait is synchronous; this provider blocks on
//! its async request internally. Hosts with their own event loop can call
//! [`HttpDirectionsProvider::route_async`] directly and feed the result to
//! the planner.
//!
//! # Example
//!
//! ```no_run
//! use geo::Coord;
//! use waymark_core::{DirectionsProvider, DirectionsRequest, RoutePreference, TravelMode};
//! use waymark_data::routing::HttpDirectionsProvider;
//!
//! let provider = HttpDirectionsProvider::new("http://localhost:5000")?;
//! let request = DirectionsRequest::new(
//!     vec![Coord { x: -0.1, y: 51.5 }, Coord { x: -0.2, y: 51.6 }],
//!     TravelMode::Walking,
//!     RoutePreference::Shortest,
//! )?;
//!
//! let routes = provider.route(&request)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use url::Url;
use waymark_core::{DirectionsProvider, DirectionsRequest, RouteAlternative, RoutingError};

use super::osrm::RouteResponse;
use crate::http::{
    BlockingClient, ClientBuildError, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, Failure,
    is_success, parse_base_url,
};

/// Configuration for [`HttpDirectionsProvider`].
#[derive(Debug, Clone)]
pub struct HttpDirectionsConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for HttpDirectionsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpDirectionsConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Directions provider backed by an OSRM-compatible Route API.
///
/// Routes are requested with full GeoJSON geometry and turn-by-turn steps.
/// Alternatives are requested only when the [`DirectionsRequest`] asks for
/// them.
#[derive(Debug)]
pub struct HttpDirectionsProvider {
    http: BlockingClient,
    base: Url,
}

impl HttpDirectionsProvider {
    /// Create a new provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is unusable or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientBuildError> {
        Self::with_config(HttpDirectionsConfig::new(base_url))
    }

    /// Create a new provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// As [`Self::new`].
    pub fn with_config(config: HttpDirectionsConfig) -> Result<Self, ClientBuildError> {
        let base = parse_base_url(&config.base_url)?;
        let http = BlockingClient::new(&config.user_agent, config.timeout)?;
        Ok(Self { http, base })
    }

    /// Build the Route API URL for `request`.
    ///
    /// The format is `{base}/route/v1/{profile}/{lon,lat;...}` with
    /// `alternatives`, `steps`, `geometries` and `overview` query options.
    fn build_route_url(&self, request: &DirectionsRequest) -> Result<Url, RoutingError> {
        let coords = request
            .coordinates()
            .iter()
            .map(|c| format!("{},{}", c.x, c.y))
            .collect::<Vec<_>>()
            .join(";");
        let path = format!("route/v1/{}/{coords}", request.mode().profile());
        let mut url = self
            .base
            .join(&path)
            .map_err(|err| RoutingError::NetworkError {
                url: format!("{}{path}", self.base),
                message: err.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("alternatives", if request.alternatives() { "true" } else { "false" })
            .append_pair("steps", "true")
            .append_pair("geometries", "geojson")
            .append_pair("overview", "full");
        Ok(url)
    }

    /// Fetch route alternatives asynchronously.
    ///
    /// An empty vector means the service found no route.
    ///
    /// # Errors
    ///
    /// Transport, HTTP, service and decoding failures as [`RoutingError`].
    pub async fn route_async(
        &self,
        request: &DirectionsRequest,
    ) -> Result<Vec<RouteAlternative>, RoutingError> {
        let url = self.build_route_url(request)?;
        let (status, body) = self
            .http
            .get_text(&url)
            .await
            .map_err(|failure| routing_failure(failure, &url))?;
        let routes = decode_route_response(status, &body).map_err(|err| match err {
            RoutingError::HttpError { status, message, .. } => RoutingError::HttpError {
                url: url.to_string(),
                status,
                message,
            },
            other => other,
        })?;
        log::debug!("{} route(s) from {url}", routes.len());
        Ok(routes)
    }
}

/// Decode an OSRM Route API body received with HTTP `status`.
///
/// OSRM reports `NoRoute` and invalid queries with a 4xx status and a JSON
/// body, so the body is decoded first; only an undecodable error body
/// becomes [`RoutingError::HttpError`] (with an empty `url`).
///
/// # Errors
///
/// [`RoutingError::ServiceError`] for a non-`Ok` code other than `NoRoute`,
/// [`RoutingError::HttpError`] or [`RoutingError::ParseError`] for a body
/// that is not a Route response.
pub fn decode_route_response(
    status: u16,
    body: &str,
) -> Result<Vec<RouteAlternative>, RoutingError> {
    match serde_json::from_str::<RouteResponse>(body) {
        Ok(response) => response.into_alternatives(),
        Err(_) if !is_success(status) => Err(RoutingError::HttpError {
            url: String::new(),
            status,
            message: body.to_owned(),
        }),
        Err(err) => Err(RoutingError::ParseError {
            message: err.to_string(),
        }),
    }
}

fn routing_failure(failure: Failure, url: &Url) -> RoutingError {
    match failure {
        Failure::Timeout { timeout_secs } => RoutingError::Timeout {
            url: url.to_string(),
            timeout_secs,
        },
        Failure::Status { status, message } => RoutingError::HttpError {
            url: url.to_string(),
            status,
            message,
        },
        Failure::Network { message } => RoutingError::NetworkError {
            url: url.to_string(),
            message,
        },
    }
}

impl DirectionsProvider for HttpDirectionsProvider {
    /// Fetch routes for `request`, blocking until the response arrives.
    ///
    /// # Runtime requirements
    ///
    /// Inside an existing Tokio runtime, the runtime must be multi-threaded
    /// to avoid blocking it.
    fn route(&self, request: &DirectionsRequest) -> Result<Vec<RouteAlternative>, RoutingError> {
        self.http.block_on(self.route_async(request))
    }
}
