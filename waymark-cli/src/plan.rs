//! Plan command: route through stops via an OSRM-compatible service.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use geojson::FeatureCollection;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;
use waymark_core::{
    DirectionsProvider, RouteAlternative, RoutePreference, RoutingError, TravelMode, Waypoint,
    line_to_gpx,
};
use waymark_data::{HttpDirectionsConfig, HttpDirectionsProvider};
use waymark_map::{MapLayerRegistry, SceneSurface};
use waymark_planner::{PlannerError, RoutePlanner};

use crate::{
    ARG_PLAN_GPX, ARG_PLAN_MODE, ARG_PLAN_OSRM_BASE_URL, ARG_PLAN_PREFERENCE,
    ARG_PLAN_WAYPOINTS, CliError, ENV_PLAN_WAYPOINTS, write_json,
};

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Plan a route through two or more stops given as \
                 \"lat,lon\" pairs. The first stop is the origin and the \
                 last the destination. Prints the route summary and the \
                 drawn scene as GeoJSON, optionally exporting the route \
                 as GPX.",
    about = "Plan a route between stops"
)]
#[ortho_config(prefix = "WAYMARK")]
pub(crate) struct PlanArgs {
    /// Stops as `lat,lon`, origin first and destination last.
    #[arg(value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) waypoints: Vec<String>,
    /// Travel mode: `walking` or `cycling`.
    #[arg(long = ARG_PLAN_MODE, value_name = "mode")]
    #[serde(default)]
    pub(crate) mode: Option<String>,
    /// Route preference: `shortest` or `fastest`.
    #[arg(long = ARG_PLAN_PREFERENCE, value_name = "preference")]
    #[serde(default)]
    pub(crate) preference: Option<String>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_PLAN_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Write the planned route to this GPX file.
    #[arg(long = ARG_PLAN_GPX, value_name = "path")]
    #[serde(default)]
    pub(crate) gpx: Option<Utf8PathBuf>,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// Resolved `plan` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlanConfig {
    pub(crate) waypoints: Vec<Waypoint>,
    pub(crate) mode: TravelMode,
    pub(crate) preference: RoutePreference,
    pub(crate) osrm_base_url: String,
    pub(crate) gpx: Option<Utf8PathBuf>,
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        if args.waypoints.is_empty() {
            return Err(CliError::MissingArgument {
                field: ARG_PLAN_WAYPOINTS,
                env: ENV_PLAN_WAYPOINTS,
            });
        }
        let waypoints = args
            .waypoints
            .iter()
            .map(|value| parse_waypoint(value))
            .collect::<Result<Vec<_>, _>>()?;
        let mode = args
            .mode
            .as_deref()
            .map_or(Ok(TravelMode::default()), parse_mode)?;
        let preference = args
            .preference
            .as_deref()
            .map_or(Ok(RoutePreference::default()), parse_preference)?;
        let osrm_base_url = args
            .osrm_base_url
            .unwrap_or_else(|| HttpDirectionsConfig::default().base_url);
        Ok(Self {
            waypoints,
            mode,
            preference,
            osrm_base_url,
            gpx: args.gpx,
        })
    }
}

/// Parse a `lat,lon` pair. Range checks happen when the route is requested.
pub(crate) fn parse_waypoint(value: &str) -> Result<Waypoint, CliError> {
    let invalid = || CliError::InvalidWaypoint {
        value: value.to_owned(),
    };
    let (lat, lon) = value.split_once(',').ok_or_else(invalid)?;
    let latitude: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let longitude: f64 = lon.trim().parse().map_err(|_| invalid())?;
    Ok(Waypoint::at(latitude, longitude))
}

pub(crate) fn parse_mode(value: &str) -> Result<TravelMode, CliError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "walking" | "foot" => Ok(TravelMode::Walking),
        "cycling" | "bike" => Ok(TravelMode::Cycling),
        _ => Err(CliError::InvalidChoice {
            field: ARG_PLAN_MODE,
            value: value.to_owned(),
            expected: "walking, cycling",
        }),
    }
}

pub(crate) fn parse_preference(value: &str) -> Result<RoutePreference, CliError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "shortest" => Ok(RoutePreference::Shortest),
        "fastest" => Ok(RoutePreference::Fastest),
        _ => Err(CliError::InvalidChoice {
            field: ARG_PLAN_PREFERENCE,
            value: value.to_owned(),
            expected: "shortest, fastest",
        }),
    }
}

/// Builds a directions provider for the current plan invocation.
pub(super) trait DirectionsBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Box<dyn DirectionsProvider>, CliError>;
}

pub(super) struct DefaultDirectionsBuilder;

impl DirectionsBuilder for DefaultDirectionsBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Box<dyn DirectionsProvider>, CliError> {
        let provider = HttpDirectionsProvider::new(config.osrm_base_url.clone()).map_err(
            |source| CliError::BuildDirectionsProvider {
                base_url: config.osrm_base_url.clone(),
                source,
            },
        )?;
        Ok(Box::new(provider))
    }
}

/// JSON document printed by `plan`.
#[derive(Debug, Serialize)]
struct PlanOutput<'a> {
    distance_m: f64,
    duration_s: f64,
    distance: String,
    duration: String,
    alternatives: usize,
    gpx: Option<&'a Utf8Path>,
    scene: FeatureCollection,
}

pub(super) fn run_plan_with(
    args: PlanArgs,
    builder: &dyn DirectionsBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let provider = builder.build(&config)?;
    plan_route(&config, provider.as_ref(), writer)
}

pub(crate) fn plan_route(
    config: &PlanConfig,
    provider: &dyn DirectionsProvider,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let surface = SceneSurface::new();
    let scene = surface.handle();
    let mut registry = MapLayerRegistry::new(surface);
    let mut planner = RoutePlanner::new();
    planner.set_travel_mode(config.mode)?;
    planner.set_preference(config.preference)?;

    let request = planner.load_waypoints(config.waypoints.clone())?;
    planner.resolve(provider, &request, &mut registry)?;
    let Some(route) = planner.displayed_route() else {
        return Err(PlannerError::from(RoutingError::NoRoute).into());
    };

    if let Some(path) = &config.gpx {
        export_gpx(path, &config.waypoints, route)?;
    }
    let summary = route.summary();
    let output = PlanOutput {
        distance_m: summary.distance_m,
        duration_s: summary.duration_s,
        distance: summary.distance_label(),
        duration: summary.duration_label(),
        alternatives: planner.alternatives().len(),
        gpx: config.gpx.as_deref(),
        scene: scene.to_feature_collection(),
    };
    write_json(writer, &output)
}

fn export_gpx(
    path: &Utf8Path,
    stops: &[Waypoint],
    route: &RouteAlternative,
) -> Result<(), CliError> {
    let name = match (stops.first(), stops.last()) {
        (Some(origin), Some(destination)) => {
            format!("{} to {}", origin.label(), destination.label())
        }
        _ => "Planned route".to_owned(),
    };
    let gpx = line_to_gpx(&name, &route.geometry)?;
    waymark_fs::write_utf8(path, gpx.as_bytes()).map_err(|source| CliError::WriteGpx {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PlanConfig, CliError> {
    let merged = PlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PlanConfig::try_from(merged)
}
