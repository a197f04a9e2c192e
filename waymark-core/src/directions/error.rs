use thiserror::Error;

/// Errors from [`crate::directions::DirectionsProvider::route`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// Fewer than two waypoints were supplied.
    #[error("at least two waypoints are required, got {count}")]
    TooFewWaypoints {
        /// Number of waypoints supplied.
        count: usize,
    },
    /// A coordinate was not finite or lay outside valid latitude/longitude.
    #[error("waypoint {index} has an invalid coordinate")]
    InvalidCoordinate {
        /// Position of the offending waypoint.
        index: usize,
    },
    /// The service answered but found no route between the waypoints.
    #[error("no route found between the waypoints")]
    NoRoute,
    /// The request could not reach the service.
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
    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    HttpError {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },
    /// The service reported an error code in an otherwise valid response.
    #[error("directions service error {code}: {message}")]
    ServiceError {
        /// Service-specific error code.
        code: String,
        /// Service-supplied message.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse directions response: {message}")]
    ParseError {
        /// Decoder failure description.
        message: String,
    },
}
