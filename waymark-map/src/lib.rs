//! Map rendering for the Waymark engine.
//!
//! A [`MapLayerRegistry`] owns one [`MapSurface`] and tracks every line,
//! marker, popup and listener drawn on it, so a view can be torn down
//! without leaks. The shared renderer in [`render`] turns tracks into those
//! artifacts, and [`ElevationProfile`] keeps a chart cursor in step with the
//! map. [`SceneSurface`] is a headless surface that exports GeoJSON.

#![forbid(unsafe_code)]

pub mod profile;
pub mod registry;
pub mod render;
mod scene;
pub mod surface;

pub use profile::{ChartSeries, ElevationProfile, ElevationUnit};
pub use registry::{
    EndpointLabels, EndpointMarkers, LayerKey, MapArtifactHandle, MapEvent, MapLayerRegistry,
    RegistryError, StyleHint,
};
pub use render::{
    BatchReport, RenderError, RenderOptions, RenderedTrack, RouteSource, render_catalog,
    render_route_batch, render_route_source, render_track,
};
pub use scene::{SceneHandle, SceneSurface, SurfaceOp};
pub use surface::{
    LayerId, LinePaint, ListenerId, MapSurface, MapSurfaceError, MarkerId, MarkerKind,
    PointerEventKind, PopupContent, PopupId, SourceId,
};
