//! OSRM API response types for the Route service.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use geo::{Coord, LineString};
use serde::Deserialize;
use waymark_core::{RouteAlternative, RouteLeg, RouteStep, RoutingError};

/// OSRM Route API response.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"NoRoute"` - No route between the coordinates
    /// - `"InvalidQuery"` - Invalid query parameters
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Candidate routes, best first.
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

/// One route in a [`RouteResponse`].
#[derive(Debug, Deserialize)]
pub struct OsrmRoute {
    /// Length in metres.
    pub distance: f64,
    /// Duration in seconds.
    pub duration: f64,
    /// Full-overview GeoJSON geometry.
    pub geometry: OsrmGeometry,
    /// One leg per consecutive waypoint pair.
    #[serde(default)]
    pub legs: Vec<OsrmLeg>,
}

/// GeoJSON `LineString` geometry.
#[derive(Debug, Deserialize)]
pub struct OsrmGeometry {
    /// `[lon, lat]` pairs.
    pub coordinates: Vec<[f64; 2]>,
}

/// A route leg.
#[derive(Debug, Deserialize)]
pub struct OsrmLeg {
    /// Length in metres.
    pub distance: f64,
    /// Duration in seconds.
    pub duration: f64,
    /// Names of the most significant roads.
    #[serde(default)]
    pub summary: String,
    /// Turn-by-turn steps, present when `steps=true`.
    #[serde(default)]
    pub steps: Vec<OsrmStep>,
}

/// A single step of a leg.
#[derive(Debug, Deserialize)]
pub struct OsrmStep {
    /// Length in metres.
    pub distance: f64,
    /// Duration in seconds.
    pub duration: f64,
    /// Way name; empty when unnamed.
    #[serde(default)]
    pub name: String,
    /// Manoeuvre at the start of the step.
    pub maneuver: OsrmManeuver,
}

/// Manoeuvre details.
#[derive(Debug, Deserialize)]
pub struct OsrmManeuver {
    /// Manoeuvre type, e.g. `"turn"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Direction modifier, e.g. `"left"`.
    pub modifier: Option<String>,
    /// `[lon, lat]` of the manoeuvre.
    pub location: [f64; 2],
}

impl RouteResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }

    /// Convert into route alternatives.
    ///
    /// `NoRoute` and an `Ok` with no routes both yield an empty vector; any
    /// other code is a service error.
    pub fn into_alternatives(self) -> Result<Vec<RouteAlternative>, RoutingError> {
        if self.code == "NoRoute" {
            return Ok(Vec::new());
        }
        if !self.is_ok() {
            return Err(RoutingError::ServiceError {
                code: self.code,
                message: self.message.unwrap_or_default(),
            });
        }
        Ok(self.routes.into_iter().map(OsrmRoute::into_alternative).collect())
    }
}

impl OsrmRoute {
    fn into_alternative(self) -> RouteAlternative {
        let geometry: LineString<f64> = self
            .geometry
            .coordinates
            .into_iter()
            .map(|[x, y]| Coord { x, y })
            .collect();
        let legs = self.legs.into_iter().map(OsrmLeg::into_leg).collect();
        RouteAlternative::new(geometry, self.distance, self.duration, legs)
    }
}

impl OsrmLeg {
    fn into_leg(self) -> RouteLeg {
        RouteLeg {
            distance_m: self.distance,
            duration_s: self.duration,
            summary: self.summary,
            steps: self.steps.into_iter().map(OsrmStep::into_step).collect(),
        }
    }
}

impl OsrmStep {
    fn into_step(self) -> RouteStep {
        let [x, y] = self.maneuver.location;
        let maneuver = match self.maneuver.modifier {
            Some(modifier) => format!("{} {modifier}", self.maneuver.kind),
            None => self.maneuver.kind,
        };
        RouteStep {
            distance_m: self.distance,
            duration_s: self.duration,
            name: self.name,
            maneuver,
            location: Coord { x, y },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_ROUTES: &str = r#"{
        "code": "Ok",
        "routes": [
            {
                "distance": 5000.0,
                "duration": 900.0,
                "geometry": {"type": "LineString", "coordinates": [[7.0, 46.0], [7.1, 46.1]]},
                "legs": [{
                    "distance": 5000.0,
                    "duration": 900.0,
                    "summary": "Bahnhofstrasse",
                    "steps": [
                        {"distance": 4000.0, "duration": 700.0, "name": "Bahnhofstrasse",
                         "maneuver": {"type": "depart", "location": [7.0, 46.0]}},
                        {"distance": 1000.0, "duration": 200.0, "name": "",
                         "maneuver": {"type": "turn", "modifier": "left", "location": [7.05, 46.05]}}
                    ]
                }]
            },
            {
                "distance": 6200.0,
                "duration": 850.0,
                "geometry": {"type": "LineString", "coordinates": [[7.0, 46.0], [7.08, 46.02], [7.1, 46.1]]}
            }
        ]
    }"#;

    #[test]
    fn deserialise_two_routes() {
        let response: RouteResponse = serde_json::from_str(TWO_ROUTES).expect("should deserialise");
        let routes = response.into_alternatives().expect("should convert");

        assert_eq!(routes.len(), 2);
        let first = &routes[0];
        assert_eq!(first.geometry.0.len(), 2);
        assert_eq!(first.steps.len(), 2);
        assert_eq!(first.steps[1].maneuver, "turn left");
        assert_eq!(first.steps[1].location, Coord { x: 7.05, y: 46.05 });
        assert_eq!(first.legs[0].summary, "Bahnhofstrasse");
        assert!(routes[1].legs.is_empty());
    }

    #[test]
    fn no_route_is_not_an_error() {
        let json = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;
        let response: RouteResponse = serde_json::from_str(json).expect("should deserialise");
        assert_eq!(response.into_alternatives(), Ok(Vec::new()));
    }

    #[test]
    fn other_codes_are_service_errors() {
        let json = r#"{"code": "InvalidQuery", "message": "Query string malformed"}"#;
        let response: RouteResponse = serde_json::from_str(json).expect("should deserialise");

        let err = response.into_alternatives().expect_err("should fail");
        assert_eq!(
            err,
            RoutingError::ServiceError {
                code: "InvalidQuery".to_string(),
                message: "Query string malformed".to_string(),
            }
        );
    }
}
