//! Read-only access to the backend route catalogue.
//!
//! The engine never writes to the backend. [`RouteCatalog`] lists published
//! routes and points of interest and fetches the raw GPX text a route's
//! `track_file` refers to.

use thiserror::Error;

use crate::{PointOfInterest, RouteRecord};

/// Errors from [`RouteCatalog`] implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The requested resource does not exist.
    #[error("catalogue resource not found: {resource}")]
    NotFound {
        /// Route identifier or file reference.
        resource: String,
    },
    /// The request could not reach the backend.
    #[error("network error calling {url}: {message}")]
    NetworkError {
        /// Request URL.
        url: String,
        /// Transport failure description.
        message: String,
    },
    /// The request exceeded the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The backend answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    HttpError {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse catalogue response: {message}")]
    ParseError {
        /// Decoder failure description.
        message: String,
    },
}

/// Read-only route catalogue.
pub trait RouteCatalog {
    /// Every published route.
    fn list_routes(&self) -> Result<Vec<RouteRecord>, CatalogError>;

    /// A single route by identifier.
    fn fetch_route(&self, id: u64) -> Result<RouteRecord, CatalogError>;

    /// Every published point of interest.
    fn list_pois(&self) -> Result<Vec<PointOfInterest>, CatalogError>;

    /// Raw GPX text for a route's `track_file` reference.
    fn fetch_track_file(&self, reference: &str) -> Result<String, CatalogError>;
}
