//! Error types emitted by the Waymark CLI.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use waymark_core::{GpxWriteError, MetricsError, TrackParseError};
use waymark_data::ClientBuildError;
use waymark_planner::PlannerError;

/// Errors emitted by the Waymark CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// An option holds a value outside its accepted set.
    #[error("invalid {field} {value:?}; expected one of {expected}")]
    InvalidChoice {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
    /// A waypoint is not a `lat,lon` pair.
    #[error("invalid waypoint {value:?}; expected \"lat,lon\" in decimal degrees")]
    InvalidWaypoint { value: String },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Reading the track file failed.
    #[error("failed to read track at {path:?}: {source}")]
    ReadTrack {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The track file is not a usable GPX track.
    #[error("failed to parse track at {path:?}: {source}")]
    ParseTrack {
        path: Utf8PathBuf,
        #[source]
        source: TrackParseError,
    },
    /// Metrics could not be computed for the track.
    #[error("failed to compute metrics for {path:?}: {source}")]
    Metrics {
        path: Utf8PathBuf,
        #[source]
        source: MetricsError,
    },
    /// Constructing the directions provider failed.
    #[error("failed to build directions provider for {base_url:?}: {source}")]
    BuildDirectionsProvider {
        base_url: String,
        #[source]
        source: ClientBuildError,
    },
    /// Planning the route failed.
    #[error("route planning failed: {0}")]
    Plan(#[from] PlannerError),
    /// Encoding the planned route as GPX failed.
    #[error("failed to encode GPX: {0}")]
    EncodeGpx(#[from] GpxWriteError),
    /// Writing the GPX export failed.
    #[error("failed to write GPX to {path:?}: {source}")]
    WriteGpx {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Serialising the command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing the command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
