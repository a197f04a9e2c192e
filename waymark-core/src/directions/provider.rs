//! Directions provider trait and the request it consumes.

use geo::Coord;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{RouteAlternative, RoutingError};

/// How the route will be travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TravelMode {
    /// On foot.
    #[default]
    Walking,
    /// By bicycle.
    Cycling,
}

impl TravelMode {
    /// Routing profile name understood by OSRM-compatible services.
    #[must_use]
    pub const fn profile(self) -> &'static str {
        match self {
            Self::Walking => "walking",
            Self::Cycling => "cycling",
        }
    }
}

/// Which route the user would rather see first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RoutePreference {
    /// A single shortest route.
    #[default]
    Shortest,
    /// The fastest route plus any alternatives the service offers.
    Fastest,
}

impl RoutePreference {
    /// Whether the service should be asked for alternative routes.
    #[must_use]
    pub const fn wants_alternatives(self) -> bool {
        matches!(self, Self::Fastest)
    }
}

/// A validated directions query.
///
/// Coordinates are `[lon, lat]` in waypoint order.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRequest {
    coordinates: Vec<Coord<f64>>,
    mode: TravelMode,
    alternatives: bool,
}

impl DirectionsRequest {
    /// Build a request, validating the waypoint coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::TooFewWaypoints`] for fewer than two
    /// coordinates and [`RoutingError::InvalidCoordinate`] for a non-finite or
    /// out-of-range one.
    ///
    /// # Examples
    ///
    /// ```
    /// use geo::Coord;
    /// use waymark_core::{DirectionsRequest, RoutePreference, RoutingError, TravelMode};
    ///
    /// let err = DirectionsRequest::new(
    ///     vec![Coord { x: 0.0, y: 0.0 }],
    ///     TravelMode::Walking,
    ///     RoutePreference::Shortest,
    /// )
    /// .unwrap_err();
    /// assert_eq!(err, RoutingError::TooFewWaypoints { count: 1 });
    /// ```
    pub fn new(
        coordinates: Vec<Coord<f64>>,
        mode: TravelMode,
        preference: RoutePreference,
    ) -> Result<Self, RoutingError> {
        if coordinates.len() < 2 {
            return Err(RoutingError::TooFewWaypoints {
                count: coordinates.len(),
            });
        }
        if let Some(index) = coordinates.iter().position(|c| !is_valid(*c)) {
            return Err(RoutingError::InvalidCoordinate { index });
        }
        Ok(Self {
            coordinates,
            mode,
            alternatives: preference.wants_alternatives(),
        })
    }

    /// Waypoint coordinates in order.
    #[must_use]
    pub fn coordinates(&self) -> &[Coord<f64>] {
        &self.coordinates
    }

    /// Travel mode.
    #[must_use]
    pub const fn mode(&self) -> TravelMode {
        self.mode
    }

    /// Whether alternatives are requested.
    #[must_use]
    pub const fn alternatives(&self) -> bool {
        self.alternatives
    }
}

fn is_valid(coord: Coord<f64>) -> bool {
    coord.x.is_finite() && coord.y.is_finite() && coord.x.abs() <= 180.0 && coord.y.abs() <= 90.0
}

/// Fetch routes for a directions request.
///
/// An `Ok` with an empty vector means the service answered but found no
/// route; callers decide whether that is an error.
///
/// # Examples
///
/// ```rust
/// use geo::LineString;
/// use waymark_core::{
///     DirectionsProvider, DirectionsRequest, RouteAlternative, RoutingError,
/// };
///
/// struct StraightLine;
///
/// impl DirectionsProvider for StraightLine {
///     fn route(&self, request: &DirectionsRequest) -> Result<Vec<RouteAlternative>, RoutingError> {
///         let geometry: LineString<f64> = request.coordinates().iter().copied().collect();
///         Ok(vec![RouteAlternative::new(geometry, 0.0, 0.0, Vec::new())])
///     }
/// }
/// ```
pub trait DirectionsProvider {
    /// Return the candidate routes for `request`, best first.
    fn route(&self, request: &DirectionsRequest) -> Result<Vec<RouteAlternative>, RoutingError>;
}
