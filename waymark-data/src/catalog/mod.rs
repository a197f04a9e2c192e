//! HTTP client for the read-only backend data API.
//!
//! [`HttpRouteCatalog`] implements [`RouteCatalog`] over:
//!
//! - `GET {base}/routes`
//! - `GET {base}/routes/{id}`
//! - `GET {base}/pois`
//! - `GET` of a route's `track_file`, absolute or relative to `{base}`
//!
//! # Example
//!
//! ```no_run
//! use waymark_core::RouteCatalog;
//! use waymark_data::catalog::HttpRouteCatalog;
//!
//! let catalog = HttpRouteCatalog::new("https://api.example.com/v1")?;
//! for route in catalog.list_routes()? {
//!     let gpx = catalog.fetch_track_file(&route.track_file)?;
//!     println!("{}: {} bytes", route.name, gpx.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod dto;

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;
use waymark_core::{CatalogError, PointOfInterest, RouteCatalog, RouteRecord};

use crate::http::{
    BlockingClient, ClientBuildError, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, Failure,
    is_success, parse_base_url,
};
use dto::{PoiDto, RouteDto};

/// Configuration for [`HttpRouteCatalog`].
#[derive(Debug, Clone)]
pub struct HttpCatalogConfig {
    /// Base URL of the data API.
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl HttpCatalogConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
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

/// Route catalogue served over HTTP.
#[derive(Debug)]
pub struct HttpRouteCatalog {
    http: BlockingClient,
    base: Url,
}

impl HttpRouteCatalog {
    /// Create a catalogue client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is unusable or the HTTP client or
    /// Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientBuildError> {
        Self::with_config(HttpCatalogConfig::new(base_url))
    }

    /// Create a catalogue client with explicit configuration.
    ///
    /// # Errors
    ///
    /// As [`Self::new`].
    pub fn with_config(config: HttpCatalogConfig) -> Result<Self, ClientBuildError> {
        let base = parse_base_url(&config.base_url)?;
        let http = BlockingClient::new(&config.user_agent, config.timeout)?;
        Ok(Self { http, base })
    }

    /// Resolve an endpoint path or track-file reference against the base.
    ///
    /// Absolute URLs are used as they are; a leading `/` is relative to the
    /// base path, not the host root.
    fn resolve(&self, reference: &str) -> Result<Url, CatalogError> {
        if let Ok(absolute) = Url::parse(reference) {
            return Ok(absolute);
        }
        self.base
            .join(reference.trim_start_matches('/'))
            .map_err(|err| CatalogError::NotFound {
                resource: format!("{reference} ({err})"),
            })
    }

    fn get_text(&self, reference: &str, resource: &str) -> Result<String, CatalogError> {
        let url = self.resolve(reference)?;
        let (status, body) = self
            .http
            .block_on(self.http.get_text(&url))
            .map_err(|failure| catalog_failure(failure, &url))?;
        if status == 404 {
            return Err(CatalogError::NotFound {
                resource: resource.to_owned(),
            });
        }
        if !is_success(status) {
            return Err(CatalogError::HttpError {
                url: url.to_string(),
                status,
                message: body,
            });
        }
        log::debug!("fetched {} bytes from {url}", body.len());
        Ok(body)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        reference: &str,
        resource: &str,
    ) -> Result<T, CatalogError> {
        let body = self.get_text(reference, resource)?;
        serde_json::from_str(&body).map_err(|err| CatalogError::ParseError {
            message: format!("{resource}: {err}"),
        })
    }
}

fn catalog_failure(failure: Failure, url: &Url) -> CatalogError {
    match failure {
        Failure::Timeout { timeout_secs } => CatalogError::Timeout {
            url: url.to_string(),
            timeout_secs,
        },
        Failure::Status { status, message } => CatalogError::HttpError {
            url: url.to_string(),
            status,
            message,
        },
        Failure::Network { message } => CatalogError::NetworkError {
            url: url.to_string(),
            message,
        },
    }
}

impl RouteCatalog for HttpRouteCatalog {
    fn list_routes(&self) -> Result<Vec<RouteRecord>, CatalogError> {
        let routes: Vec<RouteDto> = self.get_json("routes", "routes")?;
        Ok(routes.into_iter().map(RouteRecord::from).collect())
    }

    fn fetch_route(&self, id: u64) -> Result<RouteRecord, CatalogError> {
        let route: RouteDto = self.get_json(&format!("routes/{id}"), &format!("route {id}"))?;
        Ok(route.into())
    }

    fn list_pois(&self) -> Result<Vec<PointOfInterest>, CatalogError> {
        let pois: Vec<PoiDto> = self.get_json("pois", "points of interest")?;
        Ok(pois.into_iter().map(PointOfInterest::from).collect())
    }

    fn fetch_track_file(&self, reference: &str) -> Result<String, CatalogError> {
        self.get_text(reference, reference)
    }
}
