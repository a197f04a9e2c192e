//! Command-line interface for Waymark's track and route tooling.
#![forbid(unsafe_code)]

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;

mod error;
mod plan;
mod profile;

pub use error::CliError;
use plan::{DefaultDirectionsBuilder, PlanArgs, run_plan_with};
use profile::{ProfileArgs, run_profile_with};

pub(crate) const ARG_PROFILE_TRACK: &str = "track";
pub(crate) const ARG_PROFILE_SAMPLE_CAP: &str = "sample-cap";
pub(crate) const ARG_PROFILE_UNIT: &str = "unit";
pub(crate) const ENV_PROFILE_TRACK: &str = "WAYMARK_CMDS_PROFILE_TRACK";
pub(crate) const ARG_PLAN_WAYPOINTS: &str = "waypoints";
pub(crate) const ARG_PLAN_MODE: &str = "mode";
pub(crate) const ARG_PLAN_PREFERENCE: &str = "preference";
pub(crate) const ARG_PLAN_OSRM_BASE_URL: &str = "osrm-base-url";
pub(crate) const ARG_PLAN_GPX: &str = "gpx";
pub(crate) const ENV_PLAN_WAYPOINTS: &str = "WAYMARK_CMDS_PLAN_WAYPOINTS";

/// Run the Waymark CLI with the current process arguments and environment.
///
/// # Errors
///
/// Any [`CliError`]; help and version requests surface as
/// [`CliError::ArgumentParsing`].
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse()?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &mut stdout)
}

fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Profile(args) => run_profile_with(args, writer),
        Command::Plan(args) => run_plan_with(args, &DefaultDirectionsBuilder, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "waymark",
    about = "Elevation profiles and route planning for GPX tracks",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print distance, elevation metrics and the chart series of a GPX track.
    Profile(ProfileArgs),
    /// Plan a route through stops with an OSRM-compatible directions service.
    Plan(PlanArgs),
}

/// Check that `path` names an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match waymark_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
