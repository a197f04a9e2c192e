//! Parsed track geometry.
//!
//! A [`Track`] is the geometric content of a GPX file: one or more non-empty
//! segments of [`TrackPoint`]s. Segments are concatenated for metric purposes
//! and may be drawn either separately or as a single line.

mod error;
mod export;
mod parse;

use geo::{Coord, LineString};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use error::{GpxWriteError, TrackParseError};
pub use export::{line_to_gpx, track_to_gpx};
pub use parse::parse_track;

/// A single recorded position.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackPoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Elevation in metres; zero when the source omitted it.
    pub elevation: f64,
}

impl TrackPoint {
    /// Construct a point from latitude, longitude and elevation.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
        }
    }

    /// Position as a `[lon, lat]` coordinate.
    #[must_use]
    pub const fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.longitude,
            y: self.latitude,
        }
    }
}

/// A contiguous run of points. Never empty once part of a [`Track`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSegment {
    points: Vec<TrackPoint>,
}

impl TrackSegment {
    /// Points in recording order.
    #[must_use]
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    /// Segment geometry as a line string.
    #[must_use]
    pub fn line_string(&self) -> LineString<f64> {
        self.points.iter().map(TrackPoint::coord).collect()
    }
}

/// Parsed GPX content: at least one segment holding at least one point.
///
/// # Examples
///
/// ```
/// use waymark_core::{Track, TrackPoint};
///
/// let track = Track::from_segments(
///     Some("Loop".into()),
///     vec![vec![], vec![TrackPoint::new(1.0, 2.0, 3.0)]],
///     0,
/// )?;
/// assert_eq!(track.segments().len(), 1);
/// assert_eq!(track.point_count(), 1);
/// # Ok::<(), waymark_core::TrackParseError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    name: Option<String>,
    segments: Vec<TrackSegment>,
    missing_elevations: usize,
}

impl Track {
    /// Assemble a track, dropping empty segments.
    ///
    /// # Errors
    ///
    /// Returns [`TrackParseError::NoTrackSegments`] when no segment holds a
    /// point.
    pub fn from_segments(
        name: Option<String>,
        segments: Vec<Vec<TrackPoint>>,
        missing_elevations: usize,
    ) -> Result<Self, TrackParseError> {
        let segments: Vec<TrackSegment> = segments
            .into_iter()
            .filter(|points| !points.is_empty())
            .map(|points| TrackSegment { points })
            .collect();
        if segments.is_empty() {
            return Err(TrackParseError::NoTrackSegments);
        }
        Ok(Self {
            name,
            segments,
            missing_elevations,
        })
    }

    /// Name from the first `<trk>` element, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Non-empty segments in document order.
    #[must_use]
    pub fn segments(&self) -> &[TrackSegment] {
        &self.segments
    }

    /// All points across all segments, in order.
    pub fn points(&self) -> impl Iterator<Item = &TrackPoint> + '_ {
        self.segments.iter().flat_map(|segment| segment.points.iter())
    }

    /// Total number of points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.segments.iter().map(|segment| segment.points.len()).sum()
    }

    /// First recorded point.
    #[must_use]
    pub fn first(&self) -> Option<&TrackPoint> {
        self.points().next()
    }

    /// Last recorded point.
    #[must_use]
    pub fn last(&self) -> Option<&TrackPoint> {
        self.segments
            .last()
            .and_then(|segment| segment.points.last())
    }

    /// Number of points whose elevation was absent and defaulted to zero.
    #[must_use]
    pub const fn missing_elevations(&self) -> usize {
        self.missing_elevations
    }

    /// Whether any point lacked an elevation value.
    #[must_use]
    pub const fn elevation_missing(&self) -> bool {
        self.missing_elevations > 0
    }

    /// Every segment concatenated into one line string.
    #[must_use]
    pub fn line_string(&self) -> LineString<f64> {
        self.points().map(TrackPoint::coord).collect()
    }

    /// One line string per segment.
    #[must_use]
    pub fn segment_lines(&self) -> Vec<LineString<f64>> {
        self.segments.iter().map(TrackSegment::line_string).collect()
    }

    /// Flattened copy of the point sequence.
    #[must_use]
    pub fn to_points(&self) -> Vec<TrackPoint> {
        self.points().copied().collect()
    }
}
