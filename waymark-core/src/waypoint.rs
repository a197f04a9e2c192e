//! Stops in a route plan.

use geo::Coord;

use crate::PointOfInterest;

/// A single stop: either a catalogue POI or a free coordinate picked on the map.
#[derive(Debug, Clone, PartialEq)]
pub enum Waypoint {
    /// A point of interest chosen from the catalogue.
    Poi(PointOfInterest),
    /// A custom point, typically from a map click.
    Custom(Coord<f64>),
}

impl Waypoint {
    /// Build a custom waypoint from latitude and longitude.
    #[must_use]
    pub const fn at(latitude: f64, longitude: f64) -> Self {
        Self::Custom(Coord {
            x: longitude,
            y: latitude,
        })
    }

    /// Position of the stop as `[lon, lat]`.
    #[must_use]
    pub const fn coord(&self) -> Coord<f64> {
        match self {
            Self::Poi(poi) => poi.location,
            Self::Custom(coord) => *coord,
        }
    }

    /// Human-readable label for popups and sidebars.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Poi(poi) => poi.name.clone(),
            Self::Custom(coord) => format!("{:.5}, {:.5}", coord.y, coord.x),
        }
    }
}

impl From<PointOfInterest> for Waypoint {
    fn from(poi: PointOfInterest) -> Self {
        Self::Poi(poi)
    }
}

/// Role of a waypoint, derived purely from its position in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaypointRole {
    /// First stop.
    Origin,
    /// Any stop strictly between the first and last.
    Via,
    /// Last stop.
    Destination,
}

impl WaypointRole {
    /// Role of position `index` in a list of `len` stops.
    ///
    /// Returns `None` when `index` is out of range. A single-entry list is
    /// treated as an origin.
    ///
    /// # Examples
    ///
    /// ```
    /// use waymark_core::WaypointRole;
    ///
    /// assert_eq!(WaypointRole::at(0, 3), Some(WaypointRole::Origin));
    /// assert_eq!(WaypointRole::at(1, 3), Some(WaypointRole::Via));
    /// assert_eq!(WaypointRole::at(2, 3), Some(WaypointRole::Destination));
    /// assert_eq!(WaypointRole::at(3, 3), None);
    /// ```
    #[must_use]
    pub const fn at(index: usize, len: usize) -> Option<Self> {
        if index >= len {
            None
        } else if index == 0 {
            Some(Self::Origin)
        } else if index + 1 == len {
            Some(Self::Destination)
        } else {
            Some(Self::Via)
        }
    }
}
