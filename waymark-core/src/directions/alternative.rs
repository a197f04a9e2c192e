//! Route alternatives returned by a directions provider.

use geo::{Coord, LineString};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::units::meters_to_kilometers;

/// One turn instruction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteStep {
    /// Step length in metres.
    pub distance_m: f64,
    /// Step duration in seconds.
    pub duration_s: f64,
    /// Street or path name; may be empty.
    pub name: String,
    /// Manoeuvre type, e.g. `turn` or `depart`.
    pub maneuver: String,
    /// Where the manoeuvre happens.
    pub location: Coord<f64>,
}

/// The part of a route between two consecutive waypoints.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteLeg {
    /// Leg length in metres.
    pub distance_m: f64,
    /// Leg duration in seconds.
    pub duration_s: f64,
    /// Service-provided summary, usually the main road names.
    pub summary: String,
    /// Turn instructions for this leg.
    pub steps: Vec<RouteStep>,
}

/// One candidate route through every waypoint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteAlternative {
    /// Route geometry as `[lon, lat]`.
    pub geometry: LineString<f64>,
    /// Total length in metres.
    pub distance_m: f64,
    /// Total duration in seconds.
    pub duration_s: f64,
    /// Per-leg breakdown.
    pub legs: Vec<RouteLeg>,
    /// Steps of every leg, flattened in order.
    pub steps: Vec<RouteStep>,
}

impl RouteAlternative {
    /// Build an alternative, flattening the legs' steps.
    #[must_use]
    pub fn new(
        geometry: LineString<f64>,
        distance_m: f64,
        duration_s: f64,
        legs: Vec<RouteLeg>,
    ) -> Self {
        let steps = legs.iter().flat_map(|leg| leg.steps.iter().cloned()).collect();
        Self {
            geometry,
            distance_m,
            duration_s,
            legs,
            steps,
        }
    }

    /// Distance and duration of this alternative.
    #[must_use]
    pub const fn summary(&self) -> RouteSummary {
        RouteSummary {
            distance_m: self.distance_m,
            duration_s: self.duration_s,
        }
    }
}

/// Distance and duration of the displayed route, with display labels.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteSummary {
    /// Total length in metres.
    pub distance_m: f64,
    /// Total duration in seconds.
    pub duration_s: f64,
}

impl RouteSummary {
    /// Distance in kilometres with one decimal, e.g. `5.0 km`.
    ///
    /// # Examples
    ///
    /// ```
    /// use waymark_core::RouteSummary;
    ///
    /// let summary = RouteSummary { distance_m: 5_000.0, duration_s: 900.0 };
    /// assert_eq!(summary.distance_label(), "5.0 km");
    /// assert_eq!(summary.duration_label(), "15 min");
    /// ```
    #[must_use]
    pub fn distance_label(&self) -> String {
        format!("{:.1} km", meters_to_kilometers(self.distance_m))
    }

    /// Duration rounded to whole minutes: `15 min`, or `1 h 05 min` from an
    /// hour upwards.
    #[must_use]
    pub fn duration_label(&self) -> String {
        let minutes = whole_minutes(self.duration_s);
        if minutes < 60 {
            format!("{minutes} min")
        } else {
            format!("{} h {:02} min", minutes / 60, minutes % 60)
        }
    }
}

// Negative and NaN durations saturate to zero.
fn whole_minutes(seconds: f64) -> u64 {
    (seconds.max(0.0) / 60.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn step(name: &str) -> RouteStep {
        RouteStep {
            distance_m: 10.0,
            duration_s: 5.0,
            name: name.into(),
            maneuver: "turn".into(),
            location: Coord { x: 0.0, y: 0.0 },
        }
    }

    #[rstest]
    fn steps_are_flattened_across_legs() {
        let legs = vec![
            RouteLeg {
                steps: vec![step("a"), step("b")],
                ..RouteLeg::default()
            },
            RouteLeg {
                steps: vec![step("c")],
                ..RouteLeg::default()
            },
        ];
        let alternative = RouteAlternative::new(LineString::new(Vec::new()), 30.0, 15.0, legs);
        let names: Vec<&str> = alternative.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[rstest]
    #[case(5_000.0, 900.0, "5.0 km", "15 min")]
    #[case(12_345.0, 3_900.0, "12.3 km", "1 h 05 min")]
    #[case(0.0, 29.0, "0.0 km", "0 min")]
    #[case(42_195.0, 7_200.0, "42.2 km", "2 h 00 min")]
    fn labels(
        #[case] distance_m: f64,
        #[case] duration_s: f64,
        #[case] distance: &str,
        #[case] duration: &str,
    ) {
        let summary = RouteSummary {
            distance_m,
            duration_s,
        };
        assert_eq!(summary.distance_label(), distance);
        assert_eq!(summary.duration_label(), duration);
    }
}
