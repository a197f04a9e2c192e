//! Core domain types for the Waymark engine.
//!
//! The crate owns everything that is pure computation: parsing GPX track
//! files, deriving distance and elevation metrics, describing waypoints and
//! route alternatives, and the traits through which the engine talks to its
//! external collaborators (a directions service and a read-only route
//! catalogue). Nothing here touches rendering state.
//!
//! # Examples
//!
//! ```
//! use waymark_core::{MetricsConfig, compute_metrics, parse_track};
//!
//! let gpx = r#"<gpx><trk><trkseg>
//!     <trkpt lat="0.0" lon="0.0"><ele>0</ele></trkpt>
//!     <trkpt lat="0.0" lon="0.01"><ele>10</ele></trkpt>
//! </trkseg></trk></gpx>"#;
//! let track = parse_track(gpx)?;
//! let metrics = compute_metrics(&track, &MetricsConfig::default())?;
//! assert_eq!(metrics.samples.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod catalog;
pub mod directions;
pub mod geodesy;
pub mod metrics;
mod poi;
mod record;
pub mod track;
pub mod units;
mod waypoint;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use catalog::{CatalogError, RouteCatalog};
pub use directions::{
    DirectionsProvider, DirectionsRequest, RouteAlternative, RouteLeg, RoutePreference,
    RouteStep, RouteSummary, RoutingError, TravelMode,
};
pub use geodesy::{EARTH_RADIUS_M, haversine_distance_m};
pub use metrics::{
    DEFAULT_SAMPLE_CAP, ElevationDomain, ElevationSample, MetricsConfig, MetricsError,
    TrackMetrics, compute_metrics, compute_point_metrics, downsample_indices, elevation_domain,
};
pub use poi::PointOfInterest;
pub use record::{Difficulty, RouteRecord, RouteStats, resolve_stats};
pub use track::{
    GpxWriteError, Track, TrackParseError, TrackPoint, TrackSegment, line_to_gpx, parse_track,
    track_to_gpx,
};
pub use waypoint::{Waypoint, WaypointRole};
