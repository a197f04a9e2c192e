//! The shared track renderer used by every view.
//!
//! Rendering a track means: compute its metrics, draw its line when it has
//! at least two points, place start and end markers whose popups summarise
//! the route, and register the details shown when the line is clicked.
//! Batch rendering isolates failures per track so one bad file never blanks
//! the whole map.

use thiserror::Error;
use waymark_core::units::meters_to_kilometers;
use waymark_core::{
    CatalogError, MetricsConfig, MetricsError, RouteCatalog, RouteRecord, RouteStats, Track,
    TrackMetrics, TrackParseError, compute_metrics, parse_track, resolve_stats,
};

use crate::registry::{
    EndpointLabels, EndpointMarkers, LayerKey, MapLayerRegistry, RegistryError, StyleHint,
};
use crate::surface::{MapSurface, PopupContent};

/// Why a single track could not be rendered.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// The track text did not parse.
    #[error("failed to parse track")]
    Parse(#[from] TrackParseError),
    /// Metrics could not be derived.
    #[error("failed to compute track metrics")]
    Metrics(#[from] MetricsError),
    /// The catalogue could not supply the route or its track file.
    #[error("failed to fetch route from the catalogue")]
    Catalog(#[from] CatalogError),
    /// The map rejected an operation.
    #[error("failed to draw track")]
    Map(#[from] RegistryError),
}

/// Settings shared by every render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    style: StyleHint,
    metrics: MetricsConfig,
}

impl RenderOptions {
    /// Draw lines with `style`.
    #[must_use]
    pub const fn with_style(mut self, style: StyleHint) -> Self {
        self.style = style;
        self
    }

    /// Use `metrics` when deriving chart samples.
    #[must_use]
    pub const fn with_metrics(mut self, metrics: MetricsConfig) -> Self {
        self.metrics = metrics;
        self
    }

    /// Line style.
    #[must_use]
    pub const fn style(&self) -> StyleHint {
        self.style
    }

    /// Metrics configuration.
    #[must_use]
    pub const fn metrics(&self) -> &MetricsConfig {
        &self.metrics
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            style: StyleHint::Route,
            metrics: MetricsConfig::default(),
        }
    }
}

/// Result of rendering one track.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTrack {
    /// Key the artifacts were registered under.
    pub key: LayerKey,
    /// Derived metrics, e.g. for an elevation profile.
    pub metrics: TrackMetrics,
    /// Statistics shown to the user.
    pub stats: RouteStats,
    /// Whether a line was drawn; single-point tracks get markers only.
    pub line_drawn: bool,
    /// Start and end markers.
    pub endpoints: EndpointMarkers,
}

/// Raw input for batch rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSource {
    /// Key to render under.
    pub key: LayerKey,
    /// Raw GPX text.
    pub raw: String,
    /// Catalogue record, when the track belongs to a published route.
    pub record: Option<RouteRecord>,
}

/// Outcome of a batch render.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchReport {
    /// Tracks drawn successfully, in input order.
    pub rendered: Vec<RenderedTrack>,
    /// Tracks skipped, with the reason.
    pub skipped: Vec<(LayerKey, RenderError)>,
}

impl BatchReport {
    /// Keys of the rendered tracks.
    pub fn rendered_keys(&self) -> impl Iterator<Item = &LayerKey> + '_ {
        self.rendered.iter().map(|track| &track.key)
    }

    /// Keys of the skipped tracks.
    pub fn skipped_keys(&self) -> impl Iterator<Item = &LayerKey> + '_ {
        self.skipped.iter().map(|(key, _)| key)
    }
}

/// Render an already parsed track under `key`.
///
/// Re-rendering the same key updates it in place.
///
/// # Errors
///
/// [`RenderError::Metrics`] if metrics cannot be derived, in which case
/// nothing is drawn; [`RenderError::Map`] if the surface rejects an
/// operation.
pub fn render_track<S: MapSurface>(
    registry: &mut MapLayerRegistry<S>,
    key: &LayerKey,
    track: &Track,
    record: Option<&RouteRecord>,
    options: &RenderOptions,
) -> Result<RenderedTrack, RenderError> {
    let metrics = compute_metrics(track, options.metrics())?;
    let stats = resolve_stats(record.and_then(|r| r.stats), &metrics);
    let (Some(first), Some(last)) = (track.first(), track.last()) else {
        return Err(MetricsError::EmptyTrack.into());
    };

    let line_drawn = track.point_count() >= 2;
    if line_drawn {
        registry.add_or_update_track(key, &track.line_string(), options.style())?;
    } else if registry.handle_count(key) > 0 {
        // A track shrunk to one point keeps no stale line.
        registry.remove(key)?;
    }

    let title = display_name(key, track, record);
    let labels = EndpointLabels {
        start: PopupContent::new(title.clone(), format!("Start. {}", summary_text(&stats))),
        end: PopupContent::new(title.clone(), format!("Finish. {}", summary_text(&stats))),
    };
    let endpoints = registry.add_endpoint_markers(key, first.coord(), last.coord(), &labels)?;

    let description = record.map(|r| r.description.clone()).unwrap_or_default();
    let thumbnail = record.and_then(RouteRecord::thumbnail).map(str::to_owned);
    registry.set_details(
        key,
        PopupContent::new(title, description).with_thumbnail(thumbnail),
    );

    Ok(RenderedTrack {
        key: key.clone(),
        metrics,
        stats,
        line_drawn,
        endpoints,
    })
}

/// Parse `raw` and render it under `key`.
///
/// # Errors
///
/// [`RenderError::Parse`] if the text is not a usable track, otherwise as
/// [`render_track`].
pub fn render_route_source<S: MapSurface>(
    registry: &mut MapLayerRegistry<S>,
    key: &LayerKey,
    raw: &str,
    record: Option<&RouteRecord>,
    options: &RenderOptions,
) -> Result<RenderedTrack, RenderError> {
    let track = parse_track(raw)?;
    render_track(registry, key, &track, record, options)
}

/// Render many tracks, skipping any that fail to parse or measure.
///
/// # Errors
///
/// Returns [`RegistryError`] as soon as the surface rejects an operation;
/// a failing surface is fatal for the whole view.
pub fn render_route_batch<S, I>(
    registry: &mut MapLayerRegistry<S>,
    sources: I,
    options: &RenderOptions,
) -> Result<BatchReport, RegistryError>
where
    S: MapSurface,
    I: IntoIterator<Item = RouteSource>,
{
    let mut report = BatchReport::default();
    for source in sources {
        match render_route_source(
            registry,
            &source.key,
            &source.raw,
            source.record.as_ref(),
            options,
        ) {
            Ok(rendered) => report.rendered.push(rendered),
            Err(RenderError::Map(err)) => return Err(err),
            Err(err) => {
                log::warn!("skipping track `{}`: {err}", source.key);
                report.skipped.push((source.key, err));
            }
        }
    }
    Ok(report)
}

/// Render every route published by `catalog` under [`LayerKey::route`].
///
/// Routes whose track file cannot be fetched are skipped like unparsable
/// ones.
///
/// # Errors
///
/// [`RenderError::Catalog`] if the route list itself cannot be fetched;
/// [`RenderError::Map`] if the surface rejects an operation.
pub fn render_catalog<S, C>(
    registry: &mut MapLayerRegistry<S>,
    catalog: &C,
    options: &RenderOptions,
) -> Result<BatchReport, RenderError>
where
    S: MapSurface,
    C: RouteCatalog + ?Sized,
{
    let routes = catalog.list_routes()?;
    let mut fetch_failures = Vec::new();
    let mut sources = Vec::with_capacity(routes.len());
    for record in routes {
        let key = LayerKey::route(record.id);
        match catalog.fetch_track_file(&record.track_file) {
            Ok(raw) => sources.push(RouteSource {
                key,
                raw,
                record: Some(record),
            }),
            Err(err) => {
                log::warn!("skipping route `{key}`: {err}");
                fetch_failures.push((key, RenderError::Catalog(err)));
            }
        }
    }
    let mut report = render_route_batch(registry, sources, options)?;
    report.skipped.extend(fetch_failures);
    Ok(report)
}

fn display_name(key: &LayerKey, track: &Track, record: Option<&RouteRecord>) -> String {
    record
        .map(|r| r.name.as_str())
        .filter(|name| !name.is_empty())
        .or_else(|| track.name())
        .unwrap_or_else(|| key.as_str())
        .to_owned()
}

fn summary_text(stats: &RouteStats) -> String {
    format!(
        "{:.1} km, {:.0} m ascent",
        meters_to_kilometers(stats.total_distance_m),
        stats.elevation_gain_m
    )
}
