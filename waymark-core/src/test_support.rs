//! Deterministic test doubles and fixtures shared by unit and behaviour
//! tests across the workspace.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use geo::{Coord, LineString};

use crate::{
    CatalogError, DirectionsProvider, DirectionsRequest, ElevationSample, PointOfInterest,
    RouteAlternative, RouteCatalog, RouteLeg, RouteRecord, RoutingError, TrackMetrics,
};

/// Three points on the equator and the prime meridian, roughly 1.1 km then
/// 2.2 km apart, climbing 10 m per point.
pub const THREE_POINT_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="waymark-tests" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Equator Stroll</name>
    <trkseg>
      <trkpt lat="0.0" lon="0.0"><ele>0</ele></trkpt>
      <trkpt lat="0.0" lon="0.01"><ele>10</ele></trkpt>
      <trkpt lat="0.02" lon="0.01"><ele>20</ele></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

/// A track with a single point.
pub const SINGLE_POINT_GPX: &str = r#"<gpx><trk><trkseg>
  <trkpt lat="46.5" lon="7.5"><ele>1500</ele></trkpt>
</trkseg></trk></gpx>"#;

/// A document holding only waypoints.
pub const NO_TRACK_GPX: &str = r#"<gpx><wpt lat="1.0" lon="2.0"/></gpx>"#;

/// Text that is not XML at all.
pub const MALFORMED_GPX: &str = "this is not a track";

/// Build metrics describing a flat, straight track of `distance_m`.
#[must_use]
pub fn metrics_with_distance(distance_m: f64) -> TrackMetrics {
    let start = ElevationSample {
        distance_from_start_km: 0.0,
        elevation_m: 100.0,
        coordinate: Coord { x: 0.0, y: 0.0 },
    };
    let end = ElevationSample {
        distance_from_start_km: distance_m / 1_000.0,
        coordinate: Coord { x: 0.01, y: 0.0 },
        ..start
    };
    TrackMetrics {
        samples: vec![start, end],
        total_distance_m: distance_m,
        elevation_min_m: 100.0,
        elevation_max_m: 100.0,
        elevation_gain_m: 0.0,
        elevation_loss_m: 0.0,
    }
}

/// A route alternative that runs straight through `coordinates`, with one
/// leg per consecutive pair.
#[must_use]
pub fn straight_route(coordinates: &[Coord<f64>], distance_m: f64, duration_s: f64) -> RouteAlternative {
    let leg_count = coordinates.len().saturating_sub(1).max(1);
    let share = leg_count as f64;
    let legs = (0..leg_count)
        .map(|_| RouteLeg {
            distance_m: distance_m / share,
            duration_s: duration_s / share,
            ..RouteLeg::default()
        })
        .collect();
    let geometry: LineString<f64> = coordinates.iter().copied().collect();
    RouteAlternative::new(geometry, distance_m, duration_s, legs)
}

#[derive(Debug, Clone)]
enum Fallback {
    StraightLine { distance_m: f64, duration_s: f64 },
    Error(RoutingError),
}

/// Scripted [`DirectionsProvider`].
///
/// Queued responses are returned first, in order; afterwards the provider
/// falls back to a straight-line route or a fixed error. Every request is
/// recorded for later inspection.
#[derive(Debug)]
pub struct StubDirectionsProvider {
    fallback: Fallback,
    scripted: RefCell<VecDeque<Result<Vec<RouteAlternative>, RoutingError>>>,
    requests: RefCell<Vec<DirectionsRequest>>,
}

impl StubDirectionsProvider {
    /// Answer every request with a straight route of the given length and
    /// duration.
    #[must_use]
    pub fn straight_line(distance_m: f64, duration_s: f64) -> Self {
        Self::with_fallback(Fallback::StraightLine {
            distance_m,
            duration_s,
        })
    }

    /// Answer every request with `error`.
    #[must_use]
    pub fn with_error(error: RoutingError) -> Self {
        Self::with_fallback(Fallback::Error(error))
    }

    fn with_fallback(fallback: Fallback) -> Self {
        Self {
            fallback,
            scripted: RefCell::new(VecDeque::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Queue a response to be returned before the fallback.
    #[must_use]
    pub fn then_respond(self, response: Result<Vec<RouteAlternative>, RoutingError>) -> Self {
        self.scripted.borrow_mut().push_back(response);
        self
    }

    /// Requests received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<DirectionsRequest> {
        self.requests.borrow().clone()
    }
}

impl DirectionsProvider for StubDirectionsProvider {
    fn route(&self, request: &DirectionsRequest) -> Result<Vec<RouteAlternative>, RoutingError> {
        self.requests.borrow_mut().push(request.clone());
        if let Some(response) = self.scripted.borrow_mut().pop_front() {
            return response;
        }
        match &self.fallback {
            Fallback::StraightLine {
                distance_m,
                duration_s,
            } => Ok(vec![straight_route(
                request.coordinates(),
                *distance_m,
                *duration_s,
            )]),
            Fallback::Error(error) => Err(error.clone()),
        }
    }
}

/// In-memory [`RouteCatalog`].
#[derive(Debug, Default, Clone)]
pub struct MemoryCatalog {
    routes: Vec<RouteRecord>,
    pois: Vec<PointOfInterest>,
    files: HashMap<String, String>,
}

impl MemoryCatalog {
    /// Add a route whose `track_file` resolves to `gpx`.
    #[must_use]
    pub fn with_route(mut self, record: RouteRecord, gpx: impl Into<String>) -> Self {
        self.files.insert(record.track_file.clone(), gpx.into());
        self.routes.push(record);
        self
    }

    /// Add a route whose track file is missing.
    #[must_use]
    pub fn with_dangling_route(mut self, record: RouteRecord) -> Self {
        self.routes.push(record);
        self
    }

    /// Add a point of interest.
    #[must_use]
    pub fn with_poi(mut self, poi: PointOfInterest) -> Self {
        self.pois.push(poi);
        self
    }
}

impl RouteCatalog for MemoryCatalog {
    fn list_routes(&self) -> Result<Vec<RouteRecord>, CatalogError> {
        Ok(self.routes.clone())
    }

    fn fetch_route(&self, id: u64) -> Result<RouteRecord, CatalogError> {
        self.routes
            .iter()
            .find(|route| route.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                resource: format!("route {id}"),
            })
    }

    fn list_pois(&self) -> Result<Vec<PointOfInterest>, CatalogError> {
        Ok(self.pois.clone())
    }

    fn fetch_track_file(&self, reference: &str) -> Result<String, CatalogError> {
        self.files
            .get(reference)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                resource: reference.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RoutePreference, TravelMode};
    use rstest::rstest;

    fn request() -> DirectionsRequest {
        DirectionsRequest::new(
            vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 }],
            TravelMode::Walking,
            RoutePreference::Shortest,
        )
        .expect("valid request")
    }

    #[rstest]
    fn scripted_responses_precede_fallback() {
        let stub = StubDirectionsProvider::straight_line(100.0, 60.0)
            .then_respond(Err(RoutingError::NoRoute));
        assert_eq!(stub.route(&request()), Err(RoutingError::NoRoute));
        let routes = stub.route(&request()).expect("fallback route");
        assert_eq!(routes.len(), 1);
        assert_eq!(stub.requests().len(), 2);
    }

    #[rstest]
    fn memory_catalog_reports_missing_files() {
        let catalog = MemoryCatalog::default().with_dangling_route(RouteRecord {
            id: 7,
            track_file: "missing.gpx".into(),
            ..RouteRecord::default()
        });
        assert!(catalog.fetch_route(7).is_ok());
        assert!(matches!(
            catalog.fetch_track_file("missing.gpx"),
            Err(CatalogError::NotFound { .. })
        ));
        assert!(matches!(
            catalog.fetch_route(8),
            Err(CatalogError::NotFound { .. })
        ));
    }
}
