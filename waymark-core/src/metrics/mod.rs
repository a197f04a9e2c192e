//! Distance and elevation metrics derived from a parsed track.
//!
//! Distances accumulate point by point with [`haversine_distance_m`] across
//! segment boundaries, so the last sample always carries the full track
//! length. The chart series is thinned by [`downsample_indices`]; totals and
//! extremes are always computed over every point.

mod downsample;

use geo::Coord;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::units::meters_to_kilometers;
use crate::{Track, TrackPoint, haversine_distance_m};

pub use downsample::downsample_indices;

/// Default maximum number of chart samples.
pub const DEFAULT_SAMPLE_CAP: usize = 200;

/// Granularity of the chart axis domain in metres.
const DOMAIN_STEP_M: f64 = 10.0;

/// Errors from [`compute_metrics`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    /// The point sequence was empty.
    #[error("cannot compute metrics for a track without points")]
    EmptyTrack,
    /// The configured sample cap was zero.
    #[error("sample cap must be at least one")]
    ZeroSampleCap,
}

/// Tuning for metric computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsConfig {
    sample_cap: usize,
}

impl MetricsConfig {
    /// Override the maximum number of chart samples.
    #[must_use]
    pub const fn with_sample_cap(mut self, sample_cap: usize) -> Self {
        self.sample_cap = sample_cap;
        self
    }

    /// Maximum number of chart samples before downsampling kicks in.
    #[must_use]
    pub const fn sample_cap(&self) -> usize {
        self.sample_cap
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            sample_cap: DEFAULT_SAMPLE_CAP,
        }
    }
}

/// One point of the elevation chart.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElevationSample {
    /// Cumulative distance from the first point in kilometres.
    pub distance_from_start_km: f64,
    /// Elevation in metres.
    pub elevation_m: f64,
    /// Map position as `[lon, lat]`.
    pub coordinate: Coord<f64>,
}

/// Outward-rounded elevation axis bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElevationDomain {
    /// Lower bound, a multiple of ten metres.
    pub lower: f64,
    /// Upper bound, a multiple of ten metres.
    pub upper: f64,
}

/// Everything derived from a track's points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackMetrics {
    /// Downsampled chart series; first and last points always present.
    pub samples: Vec<ElevationSample>,
    /// Total length in metres.
    pub total_distance_m: f64,
    /// Lowest elevation over every point.
    pub elevation_min_m: f64,
    /// Highest elevation over every point.
    pub elevation_max_m: f64,
    /// Sum of positive elevation deltas.
    pub elevation_gain_m: f64,
    /// Sum of negative elevation deltas, as a positive number.
    pub elevation_loss_m: f64,
}

impl TrackMetrics {
    /// Total length in kilometres.
    #[must_use]
    pub fn total_distance_km(&self) -> f64 {
        meters_to_kilometers(self.total_distance_m)
    }

    /// Chart domain for the elevation axis.
    #[must_use]
    pub fn elevation_domain(&self) -> ElevationDomain {
        elevation_domain(self.elevation_min_m, self.elevation_max_m)
    }
}

/// Round `min` down and `max` up to the nearest ten metres.
///
/// # Examples
///
/// ```
/// use waymark_core::elevation_domain;
///
/// let domain = elevation_domain(3.0, 27.0);
/// assert_eq!((domain.lower, domain.upper), (0.0, 30.0));
/// ```
#[must_use]
pub fn elevation_domain(min: f64, max: f64) -> ElevationDomain {
    ElevationDomain {
        lower: (min / DOMAIN_STEP_M).floor() * DOMAIN_STEP_M,
        upper: (max / DOMAIN_STEP_M).ceil() * DOMAIN_STEP_M,
    }
}

/// Compute metrics for every point of `track`, segments concatenated.
///
/// # Errors
///
/// Returns [`MetricsError::ZeroSampleCap`] for a zero cap.
pub fn compute_metrics(track: &Track, config: &MetricsConfig) -> Result<TrackMetrics, MetricsError> {
    compute_point_metrics(&track.to_points(), config)
}

/// Compute metrics for an ordered point sequence.
///
/// A single point yields one sample at distance zero.
///
/// # Errors
///
/// Returns [`MetricsError::EmptyTrack`] for an empty slice and
/// [`MetricsError::ZeroSampleCap`] for a zero cap.
pub fn compute_point_metrics(
    points: &[TrackPoint],
    config: &MetricsConfig,
) -> Result<TrackMetrics, MetricsError> {
    let Some(first) = points.first() else {
        return Err(MetricsError::EmptyTrack);
    };
    let indices = downsample_indices(points.len(), config.sample_cap)?;

    let mut cumulative_m = Vec::with_capacity(points.len());
    let mut total = 0.0;
    let mut gain = 0.0;
    let mut loss = 0.0;
    let mut min = first.elevation;
    let mut max = first.elevation;
    let mut previous: Option<&TrackPoint> = None;

    for point in points {
        if let Some(prev) = previous {
            total += haversine_distance_m(prev.coord(), point.coord());
            let delta = point.elevation - prev.elevation;
            if delta > 0.0 {
                gain += delta;
            } else {
                loss -= delta;
            }
        }
        min = min.min(point.elevation);
        max = max.max(point.elevation);
        cumulative_m.push(total);
        previous = Some(point);
    }

    let samples = indices
        .into_iter()
        .filter_map(|index| {
            let point = points.get(index)?;
            let distance = cumulative_m.get(index)?;
            Some(ElevationSample {
                distance_from_start_km: meters_to_kilometers(*distance),
                elevation_m: point.elevation,
                coordinate: point.coord(),
            })
        })
        .collect();

    Ok(TrackMetrics {
        samples,
        total_distance_m: total,
        elevation_min_m: min,
        elevation_max_m: max,
        elevation_gain_m: gain,
        elevation_loss_m: loss,
    })
}
