//! Points of interest supplied by the backend catalogue.

use geo::Coord;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A named location that can be picked as a waypoint.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use waymark_core::PointOfInterest;
///
/// let poi = PointOfInterest::new(7, "Old Mill", "heritage", Coord { x: -3.2, y: 55.9 });
/// assert_eq!(poi.name, "Old Mill");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointOfInterest {
    /// Backend identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Free-form category, e.g. `"viewpoint"`.
    pub category: String,
    /// Position as `[lon, lat]`.
    pub location: Coord<f64>,
}

impl PointOfInterest {
    /// Construct a point of interest.
    #[must_use]
    pub fn new(
        id: u64,
        name: impl Into<String>,
        category: impl Into<String>,
        location: Coord<f64>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category: category.into(),
            location,
        }
    }
}
