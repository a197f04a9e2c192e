//! Route records published by the backend catalogue.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::TrackMetrics;

/// Difficulty tier assigned by the route author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Difficulty {
    /// Suitable for everyone.
    #[default]
    Easy,
    /// Some climbing or rough ground.
    Moderate,
    /// Sustained effort required.
    Hard,
    /// Technical terrain.
    Expert,
}

/// Summary statistics attached to a route.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteStats {
    /// Total length in metres.
    pub total_distance_m: f64,
    /// Cumulative ascent in metres.
    pub elevation_gain_m: f64,
    /// Lowest elevation in metres.
    pub elevation_min_m: f64,
    /// Highest elevation in metres.
    pub elevation_max_m: f64,
}

impl RouteStats {
    /// Statistics recomputed from a parsed track.
    #[must_use]
    pub const fn from_metrics(metrics: &TrackMetrics) -> Self {
        Self {
            total_distance_m: metrics.total_distance_m,
            elevation_gain_m: metrics.elevation_gain_m,
            elevation_min_m: metrics.elevation_min_m,
            elevation_max_m: metrics.elevation_max_m,
        }
    }

    fn is_usable(&self) -> bool {
        [
            self.total_distance_m,
            self.elevation_gain_m,
            self.elevation_min_m,
            self.elevation_max_m,
        ]
        .iter()
        .all(|value| value.is_finite())
            && self.total_distance_m > 0.0
    }
}

/// A route as listed by the backend. Read-only for the engine.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteRecord {
    /// Backend identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Longer description shown in popups.
    pub description: String,
    /// Geographic region label.
    pub region: String,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// Location of the raw GPX file, absolute or relative to the API base.
    pub track_file: String,
    /// Statistics published by the backend, when present.
    pub stats: Option<RouteStats>,
    /// Image references; the first one doubles as the popup thumbnail.
    pub images: Vec<String>,
}

impl RouteRecord {
    /// Thumbnail reference for popups, if the route has images.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Pick the statistics to display for a route.
///
/// Backend figures win when they are present, finite and describe a
/// non-zero distance; otherwise the values recomputed from the track are
/// used.
///
/// # Examples
///
/// ```
/// use waymark_core::{MetricsConfig, TrackPoint, compute_point_metrics, resolve_stats};
///
/// let points = [TrackPoint::new(0.0, 0.0, 5.0), TrackPoint::new(0.0, 0.01, 15.0)];
/// let metrics = compute_point_metrics(&points, &MetricsConfig::default())?;
/// let stats = resolve_stats(None, &metrics);
/// assert_eq!(stats.total_distance_m, metrics.total_distance_m);
/// assert_eq!(stats.elevation_gain_m, 10.0);
/// # Ok::<(), waymark_core::MetricsError>(())
/// ```
#[must_use]
pub fn resolve_stats(published: Option<RouteStats>, metrics: &TrackMetrics) -> RouteStats {
    match published {
        Some(stats) if stats.is_usable() => stats,
        Some(_) => {
            log::debug!("published route statistics unusable; using recomputed values");
            RouteStats::from_metrics(metrics)
        }
        None => RouteStats::from_metrics(metrics),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::metrics_with_distance;
    use rstest::rstest;

    #[rstest]
    fn published_stats_take_precedence() {
        let published = RouteStats {
            total_distance_m: 12_000.0,
            elevation_gain_m: 420.0,
            elevation_min_m: 10.0,
            elevation_max_m: 380.0,
        };
        let stats = resolve_stats(Some(published), &metrics_with_distance(11_850.0));
        assert_eq!(stats, published);
    }

    #[rstest]
    #[case(0.0)]
    #[case(f64::NAN)]
    fn unusable_published_stats_fall_back(#[case] distance: f64) {
        let published = RouteStats {
            total_distance_m: distance,
            ..RouteStats::default()
        };
        let stats = resolve_stats(Some(published), &metrics_with_distance(900.0));
        assert_eq!(stats.total_distance_m, 900.0);
    }

    #[rstest]
    fn thumbnail_is_first_image() {
        let record = RouteRecord {
            images: vec!["a.jpg".into(), "b.jpg".into()],
            ..RouteRecord::default()
        };
        assert_eq!(record.thumbnail(), Some("a.jpg"));
        assert_eq!(RouteRecord::default().thumbnail(), None);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn difficulty_uses_lowercase_names() {
        let json = serde_json::to_string(&Difficulty::Moderate).expect("serialise difficulty");
        assert_eq!(json, "\"moderate\"");
    }
}
