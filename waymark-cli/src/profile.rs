//! Profile command: metrics and elevation chart series for one GPX track.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;
use waymark_core::{ElevationDomain, MetricsConfig, MetricsError, parse_track};
use waymark_map::{ElevationProfile, ElevationUnit};

use crate::{
    ARG_PROFILE_SAMPLE_CAP, ARG_PROFILE_TRACK, ARG_PROFILE_UNIT, CliError, ENV_PROFILE_TRACK,
    require_existing, write_json,
};

/// CLI arguments for the `profile` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Parse a GPX track and print its length, elevation gain, \
                 loss and extremes together with the downsampled elevation \
                 chart series as JSON.",
    about = "Summarise a GPX track"
)]
#[ortho_config(prefix = "WAYMARK")]
pub(crate) struct ProfileArgs {
    /// Path to the GPX file.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) track: Option<Utf8PathBuf>,
    /// Maximum number of chart samples.
    #[arg(long = ARG_PROFILE_SAMPLE_CAP, value_name = "count")]
    #[serde(default)]
    pub(crate) sample_cap: Option<usize>,
    /// Elevation unit for the chart: `meters` or `feet`.
    #[arg(long = ARG_PROFILE_UNIT, value_name = "unit")]
    #[serde(default)]
    pub(crate) unit: Option<String>,
}

impl ProfileArgs {
    pub(crate) fn into_config(self) -> Result<ProfileConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ProfileConfig::try_from(merged)
    }
}

/// Resolved `profile` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProfileConfig {
    pub(crate) track: Utf8PathBuf,
    pub(crate) metrics: MetricsConfig,
    pub(crate) unit: ElevationUnit,
}

impl TryFrom<ProfileArgs> for ProfileConfig {
    type Error = CliError;

    fn try_from(args: ProfileArgs) -> Result<Self, Self::Error> {
        let track = args.track.ok_or(CliError::MissingArgument {
            field: ARG_PROFILE_TRACK,
            env: ENV_PROFILE_TRACK,
        })?;
        let metrics = args
            .sample_cap
            .map_or_else(MetricsConfig::default, |cap| {
                MetricsConfig::default().with_sample_cap(cap)
            });
        let unit = args
            .unit
            .as_deref()
            .map_or(Ok(ElevationUnit::Meters), parse_unit)?;
        Ok(Self {
            track,
            metrics,
            unit,
        })
    }
}

pub(crate) fn parse_unit(value: &str) -> Result<ElevationUnit, CliError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "m" | "meters" | "metres" => Ok(ElevationUnit::Meters),
        "ft" | "feet" => Ok(ElevationUnit::Feet),
        _ => Err(CliError::InvalidChoice {
            field: ARG_PROFILE_UNIT,
            value: value.to_owned(),
            expected: "meters, feet",
        }),
    }
}

/// JSON document printed by `profile`.
#[derive(Debug, Serialize)]
struct ProfileOutput<'a> {
    name: Option<&'a str>,
    total_distance_m: f64,
    total_distance_km: f64,
    elevation_gain_m: f64,
    elevation_loss_m: f64,
    elevation_min_m: f64,
    elevation_max_m: f64,
    unit: &'static str,
    domain: ElevationDomain,
    /// `[distance_km, elevation]` pairs.
    points: Vec<(f64, f64)>,
}

pub(super) fn run_profile_with(args: ProfileArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.track, ARG_PROFILE_TRACK)?;
    profile_track(&config, writer)
}

pub(crate) fn profile_track(config: &ProfileConfig, writer: &mut dyn Write) -> Result<(), CliError> {
    let raw = waymark_fs::read_utf8_to_string(&config.track).map_err(|source| {
        CliError::ReadTrack {
            path: config.track.clone(),
            source,
        }
    })?;
    let track = parse_track(&raw).map_err(|source| CliError::ParseTrack {
        path: config.track.clone(),
        source,
    })?;
    let metrics = waymark_core::compute_metrics(&track, &config.metrics)
        .map_err(|source| metrics_error(&config.track, source))?;

    let mut profile = ElevationProfile::new();
    profile.load(&metrics);
    let series = profile
        .chart_series(config.unit)
        .ok_or_else(|| metrics_error(&config.track, MetricsError::EmptyTrack))?;

    let output = ProfileOutput {
        name: track.name(),
        total_distance_m: metrics.total_distance_m,
        total_distance_km: metrics.total_distance_km(),
        elevation_gain_m: metrics.elevation_gain_m,
        elevation_loss_m: metrics.elevation_loss_m,
        elevation_min_m: metrics.elevation_min_m,
        elevation_max_m: metrics.elevation_max_m,
        unit: unit_label(series.unit),
        domain: series.domain,
        points: series.points,
    };
    write_json(writer, &output)
}

const fn unit_label(unit: ElevationUnit) -> &'static str {
    match unit {
        ElevationUnit::Meters => "meters",
        ElevationUnit::Feet => "feet",
    }
}

fn metrics_error(path: &Utf8Path, source: MetricsError) -> CliError {
    CliError::Metrics {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ProfileConfig, CliError> {
    let merged = ProfileArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ProfileConfig::try_from(merged)
}
