//! Facade crate for the Waymark route engine.
//!
//! This crate re-exports the track model, metrics, map layer registry and
//! route planner, and exposes the HTTP directions and catalogue clients
//! behind the `http` feature.
//!
//! ```
//! use waymark_engine::{MetricsConfig, compute_metrics, parse_track};
//!
//! let gpx = r#"<gpx><trk><trkseg>
//!   <trkpt lat="0.0" lon="0.0"><ele>100</ele></trkpt>
//!   <trkpt lat="0.0" lon="0.01"><ele>120</ele></trkpt>
//! </trkseg></trk></gpx>"#;
//! let track = parse_track(gpx)?;
//! let metrics = compute_metrics(&track, &MetricsConfig::default())?;
//! assert_eq!(metrics.elevation_gain_m, 20.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use waymark_core::{
    CatalogError, Difficulty, DirectionsProvider, DirectionsRequest, ElevationDomain,
    ElevationSample, GpxWriteError, MetricsConfig, MetricsError, PointOfInterest, RouteAlternative,
    RouteCatalog, RouteLeg, RoutePreference, RouteRecord, RouteStats, RouteStep, RouteSummary,
    RoutingError, Track, TrackMetrics, TrackParseError, TrackPoint, TrackSegment, TravelMode,
    Waypoint, WaypointRole, compute_metrics, line_to_gpx, parse_track, resolve_stats,
    track_to_gpx,
};

pub use waymark_map::{
    BatchReport, ElevationProfile, ElevationUnit, LayerKey, MapLayerRegistry, MapSurface,
    MapSurfaceError, RegistryError, RenderError, RenderOptions, SceneSurface, render_catalog,
    render_route_batch, render_track,
};

pub use waymark_planner::{
    PlannerError, PlannerState, RequestToken, ResponseOutcome, RoutePlanner, RouteRequest,
    Transition,
};

#[cfg(feature = "http")]
#[cfg_attr(docsrs, doc(cfg(feature = "http")))]
pub use waymark_data::{HttpDirectionsProvider, HttpRouteCatalog};

/// Test doubles shared across the workspace.
#[cfg(feature = "test-support")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub use waymark_core::test_support;
